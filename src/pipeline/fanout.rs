use std::sync::Arc;

use crate::core::{ChannelKey, PipelineError};
use crate::observability::PipelineMetrics;
use crate::pipeline::SampleSink;

/// Callback invoked with the typed failure when a sink's collaborator
/// fails; the pipeline keeps running either way.
pub type SinkErrorHandler = Box<dyn FnMut(&PipelineError) + Send>;

/// Fan-out coordinator: one block of raw samples in, an identical copy to
/// every configured sink. Owns no persistent sample state.
///
/// Sink order is fixed (recorder, then streamer, then plotter) so recording
/// failures are observed before streaming ones. A failing sink degrades that
/// one capability; the remaining sinks still receive every batch.
pub struct Pipeline {
    sinks: Vec<Box<dyn SampleSink>>,
    metrics: Arc<PipelineMetrics>,
    on_sink_error: Option<SinkErrorHandler>,
}

impl Pipeline {
    pub fn new(
        recorder: Box<dyn SampleSink>,
        streamer: Box<dyn SampleSink>,
        plotter: Box<dyn SampleSink>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            sinks: vec![recorder, streamer, plotter],
            metrics,
            on_sink_error: None,
        }
    }

    pub fn with_error_handler(mut self, handler: SinkErrorHandler) -> Self {
        self.on_sink_error = Some(handler);
        self
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    /// Single ingestion entry point. Rejects mismatched parallel arrays
    /// before any sink runs; that is a caller contract violation, not
    /// something to absorb.
    pub fn handle_samples(
        &mut self,
        channel: &ChannelKey,
        times: &[f64],
        values: &[f64],
    ) -> Result<(), PipelineError> {
        if times.len() != values.len() {
            return Err(PipelineError::InputShape {
                times: times.len(),
                values: values.len(),
            });
        }
        self.metrics.record_batch(times.len());

        for sink in &mut self.sinks {
            if let Err(e) = sink.handle_samples(channel, times, values) {
                self.metrics.record_sink_error();
                log::warn!("sink '{}' failed on {}: {:#}", sink.name(), channel, e);
                let err = PipelineError::SinkDelivery {
                    sink: sink.name(),
                    source: e,
                };
                if let Some(handler) = &mut self.on_sink_error {
                    handler(&err);
                }
            }
        }
        Ok(())
    }

    /// Flush every sink. Failures are surfaced through the error handler and
    /// counters; later sinks still get flushed.
    pub fn flush(&mut self) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.flush() {
                self.metrics.record_sink_error();
                log::error!("sink '{}' flush failed: {:#}", sink.name(), e);
                let err = PipelineError::SinkDelivery {
                    sink: sink.name(),
                    source: e,
                };
                if let Some(handler) = &mut self.on_sink_error {
                    handler(&err);
                }
            }
        }
    }
}
