//! Fresh identifier generation.

use std::collections::{BTreeSet, HashMap};

/// Generates identifiers that do not collide with any identifier added
/// before, nor with any identifier it generated itself.
///
/// A hint that is still free is returned unchanged; otherwise a number
/// postfix is appended (`x`, `x1`, `x2`, ...).
#[derive(Debug, Clone, Default)]
pub struct IdentifierGenerator {
    used: BTreeSet<String>,
    counters: HashMap<String, usize>,
}

impl IdentifierGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_identifier(&mut self, id: impl Into<String>) {
        self.used.insert(id.into());
    }

    pub fn add_identifiers<S: Into<String>>(&mut self, ids: impl IntoIterator<Item = S>) {
        for id in ids {
            self.add_identifier(id);
        }
    }

    pub fn has_identifier(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    /// Returns a fresh identifier based on `hint` and marks it as used.
    pub fn fresh(&mut self, hint: &str) -> String {
        if self.used.insert(hint.to_string()) {
            return hint.to_string();
        }
        let counter = self.counters.entry(hint.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}{}", hint, counter);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
