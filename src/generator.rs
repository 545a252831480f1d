//! State-space generation for networks.
//!
//! The generator repeatedly takes a state from the frontier, computes its
//! outgoing transitions with [`explore`](crate::explore::explore), numbers the
//! targets in order of discovery and writes every transition to the output.
//!
//! ```
//! use compose_rs::action::{Label, MultiAction};
//! use compose_rs::data::{DataExpr, DataSpec};
//! use compose_rs::generator::{GeneratorConfig, StateSpaceGenerator};
//! use compose_rs::lps::{Lps, Summand};
//! use compose_rs::lts::Output;
//! use compose_rs::network::Network;
//! use compose_rs::next_state::MemoryLoader;
//!
//! let mut lps = Lps::new(DataSpec::new(), vec![]).unwrap();
//! let tick = MultiAction::single(Label::simple("tick").apply(vec![]));
//! lps.add_summand(Summand::new(vec![], DataExpr::true_(), tick, vec![])).unwrap();
//! let loader = MemoryLoader::new().with("clock", lps);
//!
//! let network: Network = "length\n1\nlps_filenames\nclock\n\
//!     synchronization_vector\n1\n1\ntick -> tick\n".parse().unwrap();
//! let config = GeneratorConfig::default().with_output(Output::Memory);
//! let mut generator = StateSpaceGenerator::initialise(&network, &loader, config).unwrap();
//! generator.generate().unwrap();
//! let summary = generator.finalize().unwrap();
//! assert_eq!(summary.states, 1);
//! assert_eq!(summary.transitions, 1);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::explore::explore;
use crate::lts::{Lts, Output, Sink};
use crate::network::Network;
use crate::next_state::{print_state, ComponentLoader, LocalGenerator, LpsGenerator, State};
use crate::table::{StateTable, MAX_TABLE_BITS};
use crate::vector::SyncVector;

/// Exploration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    BreadthFirst,
    DepthFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub strategy: Strategy,
    pub output: Output,
    pub detect_deadlock: bool,
    /// Never number more than this many states; transitions to further
    /// states are dropped.
    pub max_states: Option<usize>,
    /// Log progress every this many expanded states; `0` disables it.
    pub progress_interval: usize,
    /// Initial size of the state table, as a power of two; at most
    /// [`MAX_TABLE_BITS`].
    pub table_bits: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::BreadthFirst,
            output: Output::None,
            detect_deadlock: false,
            max_states: None,
            progress_interval: 1000,
            table_bits: 10,
        }
    }
}

impl GeneratorConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn with_detect_deadlock(mut self, detect_deadlock: bool) -> Self {
        self.detect_deadlock = detect_deadlock;
        self
    }

    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = Some(max_states);
        self
    }

    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    pub fn with_table_bits(mut self, table_bits: usize) -> Self {
        self.table_bits = table_bits;
        self
    }
}

/// Requests a running generation to stop. Cloneable and shareable between
/// threads; the generator polls it once per expanded state.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Totals of a generation run. Only complete runs get an AUT header; aborted
/// or bounded runs leave the blank placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub states: usize,
    pub transitions: usize,
    /// Number of breadth-first levels; `0` for depth-first runs.
    pub levels: usize,
    /// Indices of states without outgoing transitions, when detection is on.
    pub deadlocks: Vec<usize>,
    pub aborted: bool,
    /// Set when the state bound cut off part of the state space.
    pub bounded: bool,
    /// The transition system, for in-memory and DOT output.
    pub lts: Option<Lts>,
}

pub struct StateSpaceGenerator {
    vector: SyncVector,
    generators: Vec<Box<dyn LocalGenerator>>,
    config: GeneratorConfig,
    table: StateTable,
    /// Pairs of state index and breadth-first level.
    frontier: VecDeque<(usize, usize)>,
    sink: Sink,
    expanded: usize,
    levels: usize,
    deadlocks: Vec<usize>,
    abort: AbortHandle,
    aborted: bool,
    bounded: bool,
}

impl StateSpaceGenerator {
    /// Loads every component of `network` and prepares generation from the
    /// initial state.
    pub fn initialise(network: &Network, loader: &dyn ComponentLoader, config: GeneratorConfig) -> Result<Self> {
        let mut vector = network.vector().clone();
        let mut generators: Vec<Box<dyn LocalGenerator>> = Vec::with_capacity(network.len());
        for (k, reference) in network.components().iter().enumerate() {
            let lps = loader
                .load(reference)
                .map_err(|e| e.fatal(format!("loading component {} '{}'", k, reference)))?;
            vector.normalize(lps.data());
            generators.push(Box::new(LpsGenerator::new(lps)));
        }
        Self::from_generators(vector, generators, config)
    }

    /// Prepares generation for already constructed local generators.
    pub fn from_generators(
        vector: SyncVector,
        generators: Vec<Box<dyn LocalGenerator>>,
        config: GeneratorConfig,
    ) -> Result<Self> {
        if vector.length() != generators.len() {
            return Err(Error::mismatch(
                "network",
                format!(
                    "incompatible network size: {} components, vector of length {}",
                    generators.len(),
                    vector.length()
                ),
            ));
        }

        if config.table_bits > MAX_TABLE_BITS {
            return Err(Error::unsupported(format!(
                "table bits {} out of range 0..={}",
                config.table_bits, MAX_TABLE_BITS
            )));
        }

        let mut initial: State = Vec::new();
        for (k, g) in generators.iter().enumerate() {
            let states = g
                .initial_states()
                .map_err(|e| e.fatal(format!("initial state of component {}", k)))?;
            match states.into_iter().next() {
                Some(s) => initial.extend(s),
                None => {
                    return Err(Error::unsupported("empty list of initial states")
                        .fatal(format!("initial state of component {}", k)))
                }
            }
        }
        info!(
            "generating state space of {} components from {}",
            generators.len(),
            print_state(&initial)
        );

        let mut table = StateTable::new(config.table_bits);
        let (index, _) = table.put(initial);
        let sink = Sink::open(&config.output, index)?;
        let mut frontier = VecDeque::new();
        frontier.push_back((index, 0));

        Ok(StateSpaceGenerator {
            vector,
            generators,
            config,
            table,
            frontier,
            sink,
            expanded: 0,
            levels: 1,
            deadlocks: Vec::new(),
            abort: AbortHandle::default(),
            aborted: false,
            bounded: false,
        })
    }

    /// A handle that stops [`generate`](Self::generate) from another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn num_states(&self) -> usize {
        self.table.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.sink.num_transitions()
    }

    pub fn state(&self, index: usize) -> &[crate::data::DataExpr] {
        &self.table[index]
    }

    /// Explores until the frontier is empty or the run is aborted. Once the
    /// state bound is reached, only transitions between known states are
    /// generated.
    pub fn generate(&mut self) -> Result<()> {
        loop {
            if self.abort.is_aborted() {
                warn!("generation aborted after {} states", self.table.len());
                self.aborted = true;
                break;
            }
            let next = match self.config.strategy {
                Strategy::BreadthFirst => self.frontier.pop_front(),
                Strategy::DepthFirst => self.frontier.pop_back(),
            };
            let Some((index, level)) = next else {
                break;
            };
            self.expand(index, level)?;
        }
        Ok(())
    }

    fn expand(&mut self, index: usize, level: usize) -> Result<()> {
        let state = self.table[index].to_vec();
        let transitions = explore(&self.vector, &self.generators, &state)
            .map_err(|e| e.fatal(format!("exploring state {}", index)))?;

        if transitions.is_empty() && self.config.detect_deadlock {
            info!("deadlock in state {} {}", index, print_state(&state));
            self.deadlocks.push(index);
        }

        for t in transitions {
            let target = if self.bound_reached() {
                match self.table.find(&t.target) {
                    Some(target) => target,
                    None => {
                        if !self.bounded {
                            warn!("state bound of {} states reached, state space is incomplete", self.table.len());
                            self.bounded = true;
                        }
                        continue;
                    }
                }
            } else {
                let (target, inserted) = self.table.put(t.target);
                if inserted {
                    debug!("new state {}", target);
                    self.frontier.push_back((target, level + 1));
                    if self.config.strategy == Strategy::BreadthFirst {
                        self.levels = self.levels.max(level + 2);
                    }
                }
                target
            };
            self.sink.transition(index, &t.action.to_string(), target)?;
        }

        self.expanded += 1;
        if self.config.progress_interval > 0 && self.expanded % self.config.progress_interval == 0 {
            info!(
                "explored {} states, found {} states and {} transitions",
                self.expanded,
                self.table.len(),
                self.sink.num_transitions()
            );
        }
        Ok(())
    }

    fn bound_reached(&self) -> bool {
        self.config.max_states.is_some_and(|max| self.table.len() >= max)
    }

    /// Completes the output and reports the totals.
    pub fn finalize(self) -> Result<GenerationSummary> {
        let states = self.table.len();
        let transitions = self.sink.num_transitions();
        let complete = !self.aborted && !self.bounded;
        let lts = if complete {
            self.sink.close(0, states)?
        } else {
            warn!("incomplete state space, output header left blank");
            self.sink.abandon(states)?
        };
        let levels = match self.config.strategy {
            Strategy::BreadthFirst => self.levels,
            Strategy::DepthFirst => 0,
        };
        info!(
            "generated {} states and {} transitions{}",
            states,
            transitions,
            if self.aborted {
                " (aborted)"
            } else if self.bounded {
                " (bounded)"
            } else {
                ""
            }
        );
        Ok(GenerationSummary {
            states,
            transitions,
            levels,
            deadlocks: self.deadlocks,
            aborted: self.aborted,
            bounded: self.bounded,
            lts,
        })
    }
}
