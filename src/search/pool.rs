//! Reusable match records.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::search::document_match::DocumentMatch;

/// Allocation counters of a [`DocumentMatchPool`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Matches allocated up front.
    pub preallocated: usize,
    /// Matches allocated because the free list ran dry.
    pub allocated_on_demand: usize,
    /// Matches handed out and not yet returned.
    pub outstanding: usize,
}

/// Free list of [`DocumentMatch`] records sized for one collection.
///
/// `get` pops a record or allocates a fresh one when the list is empty;
/// `put` resets a record and pushes it back. Each record has one owner at a
/// time, so a record can never be in two places at once.
#[derive(Debug)]
pub struct DocumentMatchPool {
    avail: Vec<DocumentMatch>,
    sort_size: usize,
    stats: PoolStats,
}

impl DocumentMatchPool {
    /// Preallocate `size` records whose sort keys hold `sort_size` values.
    pub fn new(size: usize, sort_size: usize) -> Self {
        let avail = (0..size)
            .map(|_| DocumentMatch::with_sort_capacity(sort_size))
            .collect();
        DocumentMatchPool {
            avail,
            sort_size,
            stats: PoolStats {
                preallocated: size,
                ..Default::default()
            },
        }
    }

    pub fn get(&mut self) -> DocumentMatch {
        self.stats.outstanding += 1;
        match self.avail.pop() {
            Some(dm) => dm,
            None => {
                self.stats.allocated_on_demand += 1;
                trace!(
                    "document match pool exhausted, allocated {} on demand",
                    self.stats.allocated_on_demand
                );
                DocumentMatch::with_sort_capacity(self.sort_size)
            }
        }
    }

    pub fn put(&mut self, mut dm: DocumentMatch) {
        dm.reset();
        self.stats.outstanding = self.stats.outstanding.saturating_sub(1);
        self.avail.push(dm);
    }

    /// Records currently on the free list.
    pub fn available(&self) -> usize {
        self.avail.len()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_put() {
        let mut pool = DocumentMatchPool::new(2, 1);
        assert_eq!(pool.available(), 2);

        let a = pool.get();
        let b = pool.get();
        let mut c = pool.get();
        assert_eq!(pool.available(), 0);
        assert_eq!(
            pool.stats(),
            PoolStats {
                preallocated: 2,
                allocated_on_demand: 1,
                outstanding: 3,
            }
        );

        c.score = 9.0;
        c.internal_id = 12;
        pool.put(c);
        pool.put(a);
        assert_eq!(pool.stats().outstanding, 1);

        let reused = pool.get();
        assert_eq!(reused.internal_id, 0);
        assert_eq!(reused.score, 0.0);

        pool.put(reused);
        pool.put(b);
        assert_eq!(pool.stats().outstanding, 0);
        assert_eq!(pool.available(), 3);
    }
}
