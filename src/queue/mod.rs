use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Bounded FIFO hand-off between the producer and consumer scheduling
/// domains.
///
/// `offer` never blocks and never fails: at capacity it evicts exactly one
/// oldest item before inserting, because recency is worth more than
/// completeness to a live viewer. Evictions are counted, not reported.
/// Exactly one producer and one consumer share a queue; the lock is held only
/// for the evict-then-insert pair or the drain swap.
pub struct IngestQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: AtomicUsize,
    dropped: AtomicU64,
}

impl<T> IngestQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity: AtomicUsize::new(capacity.max(1)),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn offer(&self, item: T) {
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if items.len() >= self.capacity.load(Ordering::Relaxed) {
            items.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        items.push_back(item);
    }

    /// Atomically remove and return everything queued, insertion order
    /// preserved. Called at consumer cadence, not per item.
    pub fn drain_all(&self) -> Vec<T> {
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    /// Items evicted under saturation since construction.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Hot-swap the capacity. Shrinking evicts oldest items to fit.
    pub fn set_capacity(&self, capacity: usize) {
        let capacity = capacity.max(1);
        let mut items = self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.capacity.store(capacity, Ordering::Relaxed);
        while items.len() > capacity {
            items.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_evicts_exactly_one_oldest() {
        let q = IngestQueue::new(3);
        for i in 0..5 {
            q.offer(i);
        }
        assert_eq!(q.dropped(), 2);
        assert_eq!(q.drain_all(), vec![2, 3, 4]);
    }

    #[test]
    fn shrink_evicts_oldest() {
        let q = IngestQueue::new(4);
        for i in 0..4 {
            q.offer(i);
        }
        q.set_capacity(2);
        assert_eq!(q.drain_all(), vec![2, 3]);
        assert_eq!(q.dropped(), 2);
    }
}
