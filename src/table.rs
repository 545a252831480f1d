//! Indexed set of global states.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Index;

use log::debug;

use crate::data::DataExpr;
use crate::next_state::State;

const NIL: usize = usize::MAX;

/// Largest accepted initial size of a [`StateTable`], as a power of two.
pub const MAX_TABLE_BITS: usize = 31;

#[derive(Debug, Clone)]
struct Entry {
    state: State,
    hash: u64,
    next: usize,
}

/// Insert-if-absent table assigning every distinct state a stable index, in
/// order of first insertion.
///
/// States live in one vector; buckets chain through `next` links.
#[derive(Debug, Clone)]
pub struct StateTable {
    data: Vec<Entry>,
    buckets: Vec<usize>,
    bitmask: u64,
}

impl StateTable {
    /// Creates a table with `2^bits` buckets. The table grows as needed.
    ///
    /// # Panics
    ///
    /// Panics if `bits` exceeds [`MAX_TABLE_BITS`].
    pub fn new(bits: usize) -> Self {
        assert!(bits <= MAX_TABLE_BITS, "Table bits should be in the range 0..={}", MAX_TABLE_BITS);
        let size = 1 << bits;
        Self {
            data: Vec::new(),
            buckets: vec![NIL; size],
            bitmask: (size - 1) as u64,
        }
    }

    /// Number of distinct states.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn state(&self, index: usize) -> &[DataExpr] {
        &self.data[index].state
    }

    fn hash(state: &[DataExpr]) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }

    fn bucket_index(&self, hash: u64) -> usize {
        (hash & self.bitmask) as usize
    }

    fn lookup(&self, state: &[DataExpr], hash: u64) -> Option<usize> {
        let mut index = self.buckets[self.bucket_index(hash)];
        while index != NIL {
            let entry = &self.data[index];
            if entry.hash == hash && entry.state == state {
                return Some(index);
            }
            index = entry.next;
        }
        None
    }

    /// Returns the index of `state`, if present.
    pub fn find(&self, state: &[DataExpr]) -> Option<usize> {
        self.lookup(state, Self::hash(state))
    }

    /// Puts `state` into the table. Returns its index and whether it was
    /// newly inserted.
    pub fn put(&mut self, state: State) -> (usize, bool) {
        let hash = Self::hash(&state);
        if let Some(index) = self.lookup(&state, hash) {
            return (index, false);
        }
        if self.data.len() >= 2 * self.buckets.len() {
            self.grow();
        }
        // Prepend the new entry to its bucket.
        let bucket_index = self.bucket_index(hash);
        let index = self.data.len();
        self.data.push(Entry {
            state,
            hash,
            next: self.buckets[bucket_index],
        });
        self.buckets[bucket_index] = index;
        (index, true)
    }

    /// Doubles the number of buckets and relinks all entries.
    fn grow(&mut self) {
        let size = self.buckets.len() * 2;
        debug!("growing state table to {} buckets ({} states)", size, self.data.len());
        self.buckets = vec![NIL; size];
        self.bitmask = (size - 1) as u64;
        for i in 0..self.data.len() {
            let b = self.bucket_index(self.data[i].hash);
            self.data[i].next = self.buckets[b];
            self.buckets[b] = i;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &[DataExpr]> {
        self.data.iter().map(|e| e.state.as_slice())
    }
}

impl Default for StateTable {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Index<usize> for StateTable {
    type Output = [DataExpr];

    fn index(&self, index: usize) -> &Self::Output {
        self.state(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(n: i64) -> State {
        vec![DataExpr::int(n), DataExpr::bool(n % 2 == 0)]
    }

    #[test]
    fn test_put() {
        let mut table = StateTable::new(2);
        assert_eq!(table.put(state(5)), (0, true));
        assert_eq!(table.put(state(7)), (1, true));
        assert_eq!(table.put(state(5)), (0, false));
        assert_eq!(table.len(), 2);
        assert_eq!(&table[1], state(7).as_slice());
    }

    #[test]
    fn test_find() {
        let mut table = StateTable::new(2);
        table.put(state(1));
        assert_eq!(table.find(&state(1)), Some(0));
        assert_eq!(table.find(&state(2)), None);
    }

    #[test]
    fn test_grow_keeps_indices() {
        let mut table = StateTable::new(0);
        for n in 0..100 {
            assert_eq!(table.put(state(n)), (n as usize, true));
        }
        assert!(table.capacity() > 1);
        for n in 0..100 {
            assert_eq!(table.put(state(n)), (n as usize, false));
        }
        assert_eq!(table.iter().count(), 100);
    }

    #[test]
    fn test_empty_state() {
        let mut table = StateTable::default();
        assert_eq!(table.put(vec![]), (0, true));
        assert_eq!(table.put(vec![]), (0, false));
    }
}
