//! Synchronized product of component transitions.

use std::collections::BTreeSet;
use std::fmt;

use log::debug;

use crate::action::Action;
use crate::data::DataExpr;
use crate::error::{Error, Result};
use crate::next_state::{print_state, LocalGenerator, State};
use crate::vector::{SyncVector, Tag};

/// A transition of the product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transition {
    pub target: State,
    pub action: Action,
    /// Position of the vector entry that produced this transition.
    pub provenance: usize,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--{}--> {} (entry {})",
            self.action,
            print_state(&self.target),
            self.provenance
        )
    }
}

/// Splits a global state into local slices of the given lengths.
pub fn split_state<'s>(lengths: &[usize], state: &'s [DataExpr]) -> Result<Vec<&'s [DataExpr]>> {
    let expected: usize = lengths.iter().sum();
    if expected != state.len() {
        return Err(Error::mismatch(
            format!("global state {}", print_state(state)),
            format!(
                "local state lengths add up to {}, state has {} values",
                expected,
                state.len()
            ),
        ));
    }
    let mut slices = Vec::with_capacity(lengths.len());
    let mut offset = 0;
    for &n in lengths {
        slices.push(&state[offset..offset + n]);
        offset += n;
    }
    Ok(slices)
}

/// Computes all transitions of the product leaving `state`.
///
/// The generators are the components in network order. Local transitions
/// labelled `tau` never match a tag; multi-actions with more than one action
/// are rejected.
pub fn explore<G>(vector: &SyncVector, generators: &[G], state: &[DataExpr]) -> Result<BTreeSet<Transition>>
where
    G: AsRef<dyn LocalGenerator>,
{
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
    let generators: Vec<&dyn LocalGenerator> = generators.iter().map(|g| g.as_ref()).collect();
    let lengths: Vec<usize> = generators.iter().map(|g| g.parameter_count()).collect();
    let slices = split_state(&lengths, state)?;

    // Local transitions per component: (action, target).
    let mut locals: Vec<Vec<(Action, State)>> = Vec::with_capacity(generators.len());
    for (k, (g, slice)) in generators.iter().zip(&slices).enumerate() {
        let mut ts = Vec::new();
        for t in g.begin(slice) {
            let t = t.map_err(|e| e.fatal(format!("component {}", k)))?;
            if let Some(a) = t.action.as_single()? {
                ts.push((a.clone(), t.target));
            }
        }
        locals.push(ts);
    }

    let mut result = BTreeSet::new();
    for (index, entry) in vector.entries().iter().enumerate() {
        // Candidate argument tuples offered by some participating component.
        let mut candidates: BTreeSet<&[DataExpr]> = BTreeSet::new();
        for (j, tag) in entry.tags().iter().enumerate() {
            if let Tag::Action(name) = tag {
                candidates.extend(
                    locals[j]
                        .iter()
                        .filter(|(a, _)| a.name() == name)
                        .map(|(a, _)| a.args()),
                );
            }
        }

        for args in candidates {
            if args.len() != entry.label().arity() {
                return Err(Error::mismatch(
                    format!("vector entry {} '{}'", index, entry),
                    format!("local action offers {} arguments", args.len()),
                ));
            }
            // Per slot: the unchanged source for inactive slots, the matching
            // targets otherwise.
            let mut options: Vec<Vec<&[DataExpr]>> = Vec::with_capacity(entry.tags().len());
            for (j, tag) in entry.tags().iter().enumerate() {
                match tag {
                    Tag::Inactive => options.push(vec![slices[j]]),
                    Tag::Action(name) => options.push(
                        locals[j]
                            .iter()
                            .filter(|(a, _)| a.name() == name && a.args() == args)
                            .map(|(_, target)| target.as_slice())
                            .collect(),
                    ),
                }
            }
            if options.iter().any(|o| o.is_empty()) {
                continue;
            }
            let action = entry.label().apply(args.to_vec());
            for target in product(&options) {
                let t = Transition {
                    target,
                    action: action.clone(),
                    provenance: index,
                };
                debug!("{} {}", print_state(state), t);
                result.insert(t);
            }
        }
    }
    Ok(result)
}

/// All concatenations picking one slice per slot.
fn product(options: &[Vec<&[DataExpr]>]) -> Vec<State> {
    let mut states: Vec<State> = vec![Vec::new()];
    for slot in options {
        let mut next = Vec::with_capacity(states.len() * slot.len());
        for prefix in &states {
            for local in slot {
                let mut s = prefix.clone();
                s.extend_from_slice(local);
                next.push(s);
            }
        }
        states = next;
    }
    states
}
