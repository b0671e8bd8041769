/// Fixed-capacity, time-ordered store for one channel.
///
/// `append` is O(1) and overwrites the oldest entry once at capacity; that is
/// the contract, not an error. `window` is called at rendering cadence, so it
/// bisects the logical ordering instead of scanning the whole backing store.
/// Capacity is fixed at construction (sized for the maximum supported source
/// rate times the maximum supported time window, plus margin).
#[derive(Debug, Clone)]
pub struct RingBuffer {
    times: Vec<f64>,
    values: Vec<f64>,
    capacity: usize,
    /// Physical index of the oldest entry.
    head: usize,
    len: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            times: vec![0.0; capacity],
            values: vec![0.0; capacity],
            capacity,
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn append(&mut self, timestamp: f64, value: f64) {
        let slot = (self.head + self.len) % self.capacity;
        self.times[slot] = timestamp;
        self.values[slot] = value;
        if self.len == self.capacity {
            self.head = (self.head + 1) % self.capacity;
        } else {
            self.len += 1;
        }
    }

    pub fn latest_timestamp(&self) -> Option<f64> {
        if self.len == 0 {
            None
        } else {
            Some(self.time_at(self.len - 1))
        }
    }

    /// All stored entries with `t_start <= timestamp <= t_end`, oldest first.
    pub fn window(&self, t_start: f64, t_end: f64) -> Vec<(f64, f64)> {
        if self.len == 0 || t_start > t_end {
            return Vec::new();
        }
        let lo = self.partition_point(|t| t < t_start);
        let hi = self.partition_point(|t| t <= t_end);
        (lo..hi).map(|i| self.entry_at(i)).collect()
    }

    /// Timestamp at logical index `i` (0 = oldest).
    fn time_at(&self, i: usize) -> f64 {
        self.times[(self.head + i) % self.capacity]
    }

    fn entry_at(&self, i: usize) -> (f64, f64) {
        let slot = (self.head + i) % self.capacity;
        (self.times[slot], self.values[slot])
    }

    /// First logical index where `pred(timestamp)` is false. Timestamps are
    /// non-decreasing within a channel, so the stored order is sorted.
    fn partition_point<F: Fn(f64) -> bool>(&self, pred: F) -> usize {
        let mut lo = 0;
        let mut hi = self.len;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(self.time_at(mid)) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }
}
