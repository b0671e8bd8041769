use anyhow::Result;

use crate::core::ChannelKey;

/// One consumer of raw sample blocks.
///
/// Implementations apply their own reduction policy (none, coarse
/// decimation, fine decimation plus smoothing); the fan-out hands every sink
/// the identical input, and sinks must not depend on side effects of earlier
/// sinks.
pub trait SampleSink: Send {
    fn name(&self) -> &'static str;

    /// Consume one batch for one channel. `times` and `values` are the same
    /// length; the fan-out validates before calling.
    fn handle_samples(
        &mut self,
        channel: &ChannelKey,
        times: &[f64],
        values: &[f64],
    ) -> Result<()>;

    /// Push out anything buffered. Default: nothing to flush.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
