//! Per-component next-state generation.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::action::MultiAction;
use crate::data::{print_list, DataExpr, Substitution, Variable};
use crate::error::{Error, Result};
use crate::lps::{Lps, Summand};

/// A state: an ordered tuple of data values. Local states have the length of
/// the component's parameter list; global states are their concatenation.
pub type State = Vec<DataExpr>;

/// Prints a state as `[v1, v2, ...]`.
pub fn print_state(state: &[DataExpr]) -> String {
    format!("[{}]", print_list(state))
}

/// One step of a single component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalTransition {
    pub action: MultiAction,
    pub target: State,
}

impl fmt::Display for LocalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}--> {}", self.action, print_state(&self.target))
    }
}

/// Enumerates the outgoing transitions of one component.
pub trait LocalGenerator {
    /// Length of the local states of this component.
    fn parameter_count(&self) -> usize;

    fn initial_states(&self) -> Result<Vec<State>>;

    /// Enumerates all transitions leaving `state`.
    fn begin<'a>(
        &'a self,
        state: &'a [DataExpr],
    ) -> Box<dyn Iterator<Item = Result<LocalTransition>> + 'a>;
}

/// Enumerative generator for a linear process. Summation variables range over
/// finite sorts (`Bool` and struct sorts).
#[derive(Debug, Clone)]
pub struct LpsGenerator {
    lps: Lps,
}

impl LpsGenerator {
    pub fn new(lps: Lps) -> Self {
        LpsGenerator { lps }
    }

    pub fn lps(&self) -> &Lps {
        &self.lps
    }

    fn environment(&self, state: &[DataExpr]) -> Substitution {
        self.lps
            .parameters()
            .iter()
            .cloned()
            .zip(state.iter().cloned())
            .collect()
    }

    /// Fires `summand` for every valuation of its summation variables that
    /// satisfies the condition.
    fn fire(&self, summand: &Summand, env: &Substitution) -> Result<Vec<LocalTransition>> {
        let mut domains = Vec::with_capacity(summand.variables().len());
        for e in summand.variables() {
            domains.push(self.lps.data().enumerate(e.sort())?);
        }
        let updates = summand.next_state(self.lps.parameters());

        let mut result = Vec::new();
        for valuation in Valuations::new(summand.variables(), &domains) {
            let mut env = env.clone();
            env.extend(valuation);
            if !summand.condition().eval_bool(&env)? {
                continue;
            }
            let action = summand.action().eval(&env)?;
            let target = updates
                .iter()
                .map(|g| g.eval(&env))
                .collect::<Result<State>>()?;
            result.push(LocalTransition { action, target });
        }
        Ok(result)
    }
}

impl LocalGenerator for LpsGenerator {
    fn parameter_count(&self) -> usize {
        self.lps.parameters().len()
    }

    fn initial_states(&self) -> Result<Vec<State>> {
        let state = self
            .lps
            .initial_values()
            .iter()
            .map(|e| e.eval(&Substitution::new()))
            .collect::<Result<State>>()?;
        Ok(vec![state])
    }

    fn begin<'a>(
        &'a self,
        state: &'a [DataExpr],
    ) -> Box<dyn Iterator<Item = Result<LocalTransition>> + 'a> {
        if state.len() != self.parameter_count() {
            return Box::new(std::iter::once(Err(Error::mismatch(
                format!("local state {}", print_state(state)),
                format!("expected {} values", self.parameter_count()),
            ))));
        }
        let env = self.environment(state);
        Box::new(
            self.lps
                .summands()
                .iter()
                .flat_map(move |s| match self.fire(s, &env) {
                    Ok(ts) => ts.into_iter().map(Ok).collect::<Vec<_>>(),
                    Err(e) => vec![Err(e)],
                }),
        )
    }
}

/// Iterates over all assignments of values to `variables`, one value per
/// domain. A summand without summation variables has exactly one (empty)
/// valuation.
struct Valuations<'a> {
    variables: &'a [Variable],
    domains: &'a [Vec<DataExpr>],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Valuations<'a> {
    fn new(variables: &'a [Variable], domains: &'a [Vec<DataExpr>]) -> Self {
        let done = domains.iter().any(|d| d.is_empty());
        Valuations {
            variables,
            domains,
            indices: vec![0; variables.len()],
            done,
        }
    }
}

impl Iterator for Valuations<'_> {
    type Item = Vec<(Variable, DataExpr)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self
            .variables
            .iter()
            .zip(&self.indices)
            .zip(self.domains)
            .map(|((v, &i), d)| (v.clone(), d[i].clone()))
            .collect();

        // Advance the odometer.
        self.done = true;
        for k in (0..self.indices.len()).rev() {
            self.indices[k] += 1;
            if self.indices[k] < self.domains[k].len() {
                self.done = false;
                break;
            }
            self.indices[k] = 0;
        }
        Some(item)
    }
}

/// Resolves component references into linear processes.
pub trait ComponentLoader {
    fn load(&self, reference: &str) -> Result<Lps>;
}

/// Loader over a fixed map of named processes.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    processes: HashMap<String, Lps>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, lps: Lps) {
        let reference = reference.into();
        debug!("registering component '{}'", reference);
        self.processes.insert(reference, lps);
    }

    pub fn with(mut self, reference: impl Into<String>, lps: Lps) -> Self {
        self.insert(reference, lps);
        self
    }
}

impl ComponentLoader for MemoryLoader {
    fn load(&self, reference: &str) -> Result<Lps> {
        self.processes.get(reference).cloned().ok_or_else(|| {
            Error::mismatch(
                "component loader",
                format!("unknown component reference '{}'", reference),
            )
        })
    }
}
