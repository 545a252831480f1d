//! Memoization of formula rewrites.
//!
//! Quotienting substitutes the same updates into the same subformulas over
//! and over, once per summand and entry. [`RewriteCache`] remembers the
//! result of `replace_variables(formula, substitution)` for one quotient run.

use std::collections::HashMap;

use log::debug;

use crate::data::Substitution;
use crate::formula::{replace_variables, StateFormula};

/// A cache backed by [HashMap], keyed by `(formula, substitution)`.
///
/// `true` and `false` are returned directly and never stored.
#[derive(Debug, Default)]
pub struct RewriteCache {
    map: HashMap<(StateFormula, Substitution), StateFormula>,
    enabled: bool,
    hits: usize,
    attempts: usize,
}

impl RewriteCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            map: HashMap::new(),
            enabled,
            hits: 0,
            attempts: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Returns the number of lookups.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.hits = 0;
        self.attempts = 0;
    }

    /// Applies `sigma` to `x`, consulting the cache first.
    pub fn replace(&mut self, x: &StateFormula, sigma: &Substitution) -> StateFormula {
        if x.is_true() || x.is_false() {
            return x.clone();
        }
        if !self.enabled {
            return replace_variables(x, sigma);
        }

        self.attempts += 1;
        let key = (x.clone(), sigma.clone());
        if let Some(result) = self.map.get(&key) {
            self.hits += 1;
            return result.clone();
        }
        let result = replace_variables(x, sigma);
        self.map.insert(key, result.clone());
        result
    }

    /// One-line summary of the counters.
    pub fn report(&self) -> String {
        let ratio = if self.attempts == 0 {
            0.0
        } else {
            100.0 * self.hits as f64 / self.attempts as f64
        };
        format!(
            "rewrite cache: {} hits of {} attempts ({:.1}%), {} entries",
            self.hits,
            self.attempts,
            ratio,
            self.map.len()
        )
    }

    pub fn log_report(&self) {
        if self.enabled {
            debug!("{}", self.report());
        }
    }
}
