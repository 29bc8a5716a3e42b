//! Approximate min-priority queue over a fixed ring of buckets.
//!
//! Items land in bucket `priority & (bucket_count - 1)`. `pop` scans the
//! ring forward from the last bucket it popped from and never rewinds, so
//! the queue only yields items in priority order while every pushed
//! priority stays within `[last_popped, last_popped + bucket_count - 1]`.
//! Dijkstra over edge costs that are small relative to `bucket_count`
//! satisfies this. Pushing outside the window is not detected: such items
//! simply come out of order. A push exactly `bucket_count` above the cursor
//! lands in the current bucket and is popped as if it were due now.
//!
//! Within a bucket the most recently pushed item is popped first.

/// Largest supported `num_bits`.
pub const MAX_BITS: u32 = 24;

/// A bucketed priority queue. See the [module docs](self) for the ordering
/// contract.
///
/// Priorities are supplied by the caller on [`push`](Self::push) and
/// [`remove`](Self::remove); the queue does not store them, so an item must
/// be removed with the same priority it was pushed with.
#[derive(Debug, Clone)]
pub struct BucketQueue<T> {
    buckets: Vec<Vec<T>>,
    mask: usize,
    current: usize,
    len: usize,
}

impl<T> BucketQueue<T> {
    /// Create a queue with `2^num_bits` buckets. `num_bits` is clamped to
    /// `1..=MAX_BITS`.
    pub fn new(num_bits: u32) -> Self {
        let count = 1usize << num_bits.clamp(1, MAX_BITS);
        Self {
            buckets: (0..count).map(|_| Vec::new()).collect(),
            mask: count - 1,
            current: 0,
            len: 0,
        }
    }

    /// Number of buckets in the ring.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of queued items.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn bucket_of(&self, priority: u32) -> usize {
        priority as usize & self.mask
    }

    /// Queue `item` with the given priority. O(1).
    pub fn push(&mut self, item: T, priority: u32) {
        let b = self.bucket_of(priority);
        self.buckets[b].push(item);
        self.len += 1;
    }

    /// Take an item from the first non-empty bucket at or after the scan
    /// cursor. Returns `None` when the queue is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        while self.buckets[self.current].is_empty() {
            self.current = (self.current + 1) & self.mask;
        }
        self.len -= 1;
        self.buckets[self.current].pop()
    }

    /// Remove the first item in `priority`'s bucket for which `pred` holds,
    /// scanning from the most recently pushed. Returns whether an item was
    /// removed.
    pub fn remove_by(&mut self, priority: u32, mut pred: impl FnMut(&T) -> bool) -> bool {
        let b = self.bucket_of(priority);
        let bucket = &mut self.buckets[b];
        match bucket.iter().rposition(|it| pred(it)) {
            Some(pos) => {
                bucket.remove(pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Remove `item`, which must have been pushed with `priority`.
    /// Decrease-key is `remove` followed by `push`.
    pub fn remove(&mut self, item: &T, priority: u32) -> bool
    where
        T: PartialEq,
    {
        self.remove_by(priority, |it| it == item)
    }

    /// Drop every item and rewind the scan cursor, keeping bucket storage.
    pub fn clear(&mut self) {
        for b in self.buckets.iter_mut() {
            b.clear();
        }
        self.current = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn bucket_count_is_power_of_two() {
        assert_eq!(BucketQueue::<u8>::new(8).bucket_count(), 256);
        assert_eq!(BucketQueue::<u8>::new(0).bucket_count(), 2);
        assert_eq!(BucketQueue::<u8>::new(99).bucket_count(), 1 << MAX_BITS);
    }

    #[test]
    fn pops_non_decreasing_priorities_in_order() {
        let mut q = BucketQueue::new(4);
        for (item, prio) in [(10u32, 0u32), (11, 3), (12, 3), (13, 7), (14, 15)] {
            q.push((item, prio), prio);
        }
        let mut last = 0;
        let mut n = 0;
        while let Some((_, prio)) = q.pop() {
            assert!(prio >= last);
            last = prio;
            n += 1;
        }
        assert_eq!(n, 5);
        assert!(q.is_empty());
    }

    #[test]
    fn same_bucket_is_lifo() {
        let mut q = BucketQueue::new(8);
        q.push('a', 5);
        q.push('b', 5);
        assert_eq!(q.pop(), Some('b'));
        assert_eq!(q.pop(), Some('a'));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn remove_then_pop_returns_the_other_item() {
        let mut q = BucketQueue::new(8);
        q.push("A", 4);
        q.push("B", 9);
        assert!(q.remove(&"A", 4));
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some("B"));
        assert!(q.is_empty());
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn remove_misses_with_wrong_priority() {
        let mut q = BucketQueue::new(8);
        q.push(1, 4);
        assert!(!q.remove(&1, 5));
        assert!(!q.remove(&2, 4));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn priorities_wrap_around_the_ring() {
        // 16 buckets: after popping priority 14, priorities up to 29 are
        // still within the window and come out in order.
        let mut q = BucketQueue::new(4);
        q.push(14, 14);
        assert_eq!(q.pop(), Some(14));
        for p in [29u32, 17, 15, 20] {
            q.push(p, p);
        }
        let order: Vec<u32> = std::iter::from_fn(|| q.pop()).collect();
        assert_eq!(order, vec![15, 17, 20, 29]);
    }

    #[test]
    fn dijkstra_like_workload_stays_ordered() {
        // Each pop pushes a few successors within the window, the way a
        // shortest-path search with bounded edge weights does.
        let mut rng = StdRng::seed_from_u64(7);
        let mut q = BucketQueue::new(8);
        q.push(0u32, 0);
        let mut last = 0u32;
        let mut popped = 0;
        while let Some(p) = q.pop() {
            assert!(p >= last, "popped {p} after {last}");
            last = p;
            popped += 1;
            if popped < 2_000 {
                for _ in 0..rng.random_range(1..4) {
                    let next = p + rng.random_range(0..255u32);
                    q.push(next, next);
                }
            }
        }
        assert!(popped >= 2_000);
        assert!(q.is_empty());
    }

    #[test]
    fn clear_rewinds() {
        let mut q = BucketQueue::new(3);
        q.push(1, 6);
        q.push(2, 7);
        q.pop();
        q.clear();
        assert!(q.is_empty());
        q.push(3, 0);
        q.push(4, 5);
        assert_eq!(q.pop(), Some(3));
    }
}
