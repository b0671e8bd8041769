use anyhow::Result;
use std::collections::HashMap;

use crate::core::{ChannelKey, SampleBatch};
use crate::pipeline::SampleSink;

/// Durable-storage collaborator. Accepts whole batches; a failure comes back
/// to the caller instead of being retried here.
pub trait StorageBackend: Send {
    fn store_batch(&mut self, channel: &ChannelKey, times: &[f64], values: &[f64]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Lossless sink: every accepted sample reaches the storage backend or the
/// failure surfaces to the caller. Never decimates.
///
/// Writes are batched per channel and flushed once the pending count crosses
/// `flush_threshold`. On a backend failure the unwritten batches stay pending
/// so the next flush attempt still carries them.
pub struct Recorder {
    backend: Box<dyn StorageBackend>,
    pending: HashMap<ChannelKey, SampleBatch>,
    pending_samples: usize,
    flush_threshold: usize,
}

impl Recorder {
    pub fn new(backend: Box<dyn StorageBackend>, flush_threshold: usize) -> Self {
        Self {
            backend,
            pending: HashMap::new(),
            pending_samples: 0,
            flush_threshold: flush_threshold.max(1),
        }
    }

    pub fn pending_samples(&self) -> usize {
        self.pending_samples
    }

    fn flush_pending(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        self.pending_samples = 0;

        let mut iter = pending.into_iter();
        while let Some((channel, batch)) = iter.next() {
            if let Err(e) = self.backend.store_batch(&channel, &batch.times, &batch.values) {
                // Re-queue the failed batch and everything not yet attempted;
                // accepted samples must not silently disappear.
                self.pending_samples += batch.len();
                self.pending.insert(channel, batch);
                for (ch, b) in iter {
                    self.pending_samples += b.len();
                    self.pending.insert(ch, b);
                }
                return Err(e);
            }
        }
        self.backend.flush()
    }
}

impl SampleSink for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn handle_samples(&mut self, channel: &ChannelKey, times: &[f64], values: &[f64]) -> Result<()> {
        let entry = self
            .pending
            .entry(channel.clone())
            .or_insert_with(|| SampleBatch::new(channel.clone()));
        let mut accepted = 0;
        for (&t, &v) in times.iter().zip(values) {
            if t.is_finite() && v.is_finite() {
                entry.push(t, v);
                accepted += 1;
            } else {
                log::warn!("recorder: skipping malformed sample ({t}, {v}) on {channel}");
            }
        }
        self.pending_samples += accepted;

        if self.pending_samples >= self.flush_threshold {
            self.flush_pending()
        } else {
            Ok(())
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_pending()
    }
}
