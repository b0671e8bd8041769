use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One consumer-side frame measurement. Ephemeral; only a bounded recent
/// window is retained.
#[derive(Debug, Clone, Copy)]
pub struct PerfSample {
    pub frame_start: Instant,
    pub frame_duration: Duration,
    /// Upper bound on the staleness of what the frame rendered, not a
    /// measurement: queue residency is at most one refresh interval, plus the
    /// frame itself.
    pub worst_case_latency: Duration,
}

/// Bounded recent history plus an exponentially smoothed processing cost for
/// the adaptive controller.
#[derive(Debug)]
pub struct PerfHistory {
    samples: VecDeque<PerfSample>,
    /// Raw samples ingested during each retained frame, parallel to `samples`.
    counts: VecDeque<usize>,
    max_samples: usize,
    smoothed_ms: Option<f64>,
    alpha: f64,
}

impl PerfHistory {
    pub fn new(max_samples: usize, alpha: f64) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            counts: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            smoothed_ms: None,
            alpha: alpha.clamp(0.01, 1.0),
        }
    }

    pub fn record(&mut self, sample: PerfSample, samples_in_frame: usize) {
        if self.samples.len() == self.max_samples {
            self.samples.pop_front();
            self.counts.pop_front();
        }
        let ms = sample.frame_duration.as_secs_f64() * 1e3;
        self.smoothed_ms = Some(match self.smoothed_ms {
            Some(state) => self.alpha * ms + (1.0 - self.alpha) * state,
            None => ms,
        });
        self.samples.push_back(sample);
        self.counts.push_back(samples_in_frame);
    }

    /// EMA of the frame processing cost, in milliseconds. `None` until the
    /// first frame.
    pub fn smoothed_processing_ms(&self) -> Option<f64> {
        self.smoothed_ms
    }

    /// Ingest rate over the retained window.
    pub fn recent_rate_hz(&self) -> f64 {
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };
        let span = last
            .frame_start
            .saturating_duration_since(first.frame_start)
            + last.frame_duration;
        let total: usize = self.counts.iter().sum();
        if span.is_zero() {
            return 0.0;
        }
        total as f64 / span.as_secs_f64()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(start: Instant, cost_ms: u64) -> PerfSample {
        let frame_duration = Duration::from_millis(cost_ms);
        PerfSample {
            frame_start: start,
            frame_duration,
            worst_case_latency: Duration::from_millis(100) + frame_duration,
        }
    }

    #[test]
    fn smoothed_cost_follows_the_recurrence() {
        let mut history = PerfHistory::new(8, 0.5);
        assert_eq!(history.smoothed_processing_ms(), None);

        let start = Instant::now();
        history.record(frame(start, 10), 0);
        assert_eq!(history.smoothed_processing_ms(), Some(10.0));

        history.record(frame(start, 20), 0);
        assert_eq!(history.smoothed_processing_ms(), Some(15.0));
    }

    #[test]
    fn rate_spans_the_retained_window() {
        let mut history = PerfHistory::new(8, 0.5);
        assert_eq!(history.recent_rate_hz(), 0.0);

        let start = Instant::now();
        history.record(frame(start, 100), 50);
        history.record(frame(start + Duration::from_millis(900), 100), 50);
        // 100 samples over exactly one second of wall clock.
        assert!((history.recent_rate_hz() - 100.0).abs() < 1e-9);
    }
}

/// Point-in-time diagnostics for a UI or remote status surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfSnapshot {
    pub recent_rate_hz: f64,
    pub avg_processing_ms: f64,
    pub current_decimation_factor: usize,
    pub current_refresh_interval_ms: u64,
    /// Items evicted from the ingest queue under saturation.
    pub queue_dropped: u64,
}
