//! Bounded heap backing the top-N collector.

use std::cmp::Ordering;
use std::fmt;

use crate::error::Result;
use crate::search::document_match::DocumentMatch;
use crate::search::pool::DocumentMatchPool;

/// Three-way comparison; `Less` means the left match ranks better.
pub type CompareFn = Box<dyn Fn(&DocumentMatch, &DocumentMatch) -> Ordering + Send + Sync>;

/// Binary heap whose root is the worst-ranked match.
///
/// Keeping the worst match on top makes eviction O(log n): once the heap
/// holds one match too many, `remove_last` drops the match that can no
/// longer make the window.
pub struct CollectStoreHeap {
    heap: Vec<DocumentMatch>,
    compare: CompareFn,
}

impl CollectStoreHeap {
    pub fn new(capacity: usize, compare: CompareFn) -> Self {
        CollectStoreHeap {
            heap: Vec::with_capacity(capacity),
            compare,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Compare two matches with the heap's ordering.
    pub fn compare(&self, i: &DocumentMatch, j: &DocumentMatch) -> Ordering {
        (self.compare)(i, j)
    }

    pub fn add(&mut self, dm: DocumentMatch) {
        self.heap.push(dm);
        self.sift_up(self.heap.len() - 1);
    }

    /// The worst-ranked match.
    pub fn peek_worst(&self) -> Option<&DocumentMatch> {
        self.heap.first()
    }

    /// Remove and return the worst-ranked match.
    pub fn remove_last(&mut self) -> Option<DocumentMatch> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let worst = self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        worst
    }

    /// Drain the heap into a best-first result list, leaving out the `skip`
    /// best matches. `fixup` runs on every retained match; every match not
    /// returned goes back to `pool`, also on error.
    pub fn final_results(
        &mut self,
        skip: usize,
        pool: &mut DocumentMatchPool,
        mut fixup: impl FnMut(&mut DocumentMatch) -> Result<()>,
    ) -> Result<Vec<DocumentMatch>> {
        let count = self.heap.len().saturating_sub(skip);
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(mut dm) = self.remove_last() else {
                break;
            };
            if let Err(e) = fixup(&mut dm) {
                pool.put(dm);
                for dm in results {
                    pool.put(dm);
                }
                self.drain_into(pool);
                return Err(e);
            }
            results.push(dm);
        }
        results.reverse();
        // what is left are the skipped best matches
        self.drain_into(pool);
        Ok(results)
    }

    /// Return every held match to `pool`.
    pub fn drain_into(&mut self, pool: &mut DocumentMatchPool) {
        for dm in self.heap.drain(..) {
            pool.put(dm);
        }
    }

    /// Whether no parent ranks better than either of its children.
    pub fn check_invariant(&self) -> bool {
        (1..self.heap.len()).all(|i| {
            let parent = (i - 1) / 2;
            self.compare(&self.heap[parent], &self.heap[i]) != Ordering::Less
        })
    }

    /// `a` ranks worse than `b`.
    fn worse(&self, a: usize, b: usize) -> bool {
        self.compare(&self.heap[a], &self.heap[b]) == Ordering::Greater
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.worse(i, parent) {
                break;
            }
            self.heap.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut worst = i;
            if left < len && self.worse(left, worst) {
                worst = left;
            }
            if right < len && self.worse(right, worst) {
                worst = right;
            }
            if worst == i {
                break;
            }
            self.heap.swap(i, worst);
            i = worst;
        }
    }
}

impl fmt::Debug for CollectStoreHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectStoreHeap")
            .field("len", &self.heap.len())
            .finish_non_exhaustive()
    }
}
