use anyhow::Result;

use crate::core::ChannelKey;
use crate::pipeline::SampleSink;

/// Stand-in for a disabled capability. Satisfies the sink interface so call
/// sites stay free of conditionals.
#[derive(Debug, Default)]
pub struct NullSink;

impl SampleSink for NullSink {
    fn name(&self) -> &'static str {
        "null"
    }

    fn handle_samples(&mut self, _: &ChannelKey, _: &[f64], _: &[f64]) -> Result<()> {
        Ok(())
    }
}
