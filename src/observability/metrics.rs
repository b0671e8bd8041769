use std::sync::atomic::{AtomicU64, Ordering};

/// Producer-side counters for the fan-out. Cheap to bump from the hot path;
/// read by the diagnostics snapshot.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    batches: AtomicU64,
    samples_ingested: AtomicU64,
    sink_errors: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_batch(&self, samples: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.samples_ingested
            .fetch_add(samples as u64, Ordering::Relaxed);
    }

    pub fn record_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    pub fn samples_ingested(&self) -> u64 {
        self.samples_ingested.load(Ordering::Relaxed)
    }

    pub fn sink_errors(&self) -> u64 {
        self.sink_errors.load(Ordering::Relaxed)
    }
}
