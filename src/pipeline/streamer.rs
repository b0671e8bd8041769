use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::core::{ChannelKey, DecimatedBlock, DecimationConfig};
use crate::pipeline::{Decimator, SampleSink};
use crate::queue::IngestQueue;

/// Network-delivery collaborator. Delivery failure is reported back, not
/// retried by the pipeline.
pub trait Transport: Send {
    fn send_block(&mut self, channel: &ChannelKey, block: &DecimatedBlock) -> Result<()>;
}

/// Outbound hand-off item for transports that poll rather than accept calls.
pub type OutboundBlock = (ChannelKey, DecimatedBlock);

/// Coarse-reduction sink feeding the remote viewer. Mean-only decimation by
/// default.
///
/// Each channel gets its own decimator seeded from the shared config, so hot
/// tuning applies to every channel without touching per-channel carry state.
pub struct Streamer {
    config: Arc<Mutex<DecimationConfig>>,
    decimators: HashMap<ChannelKey, Decimator>,
    transport: Option<Box<dyn Transport>>,
    outbound: Option<Arc<IngestQueue<OutboundBlock>>>,
}

impl Streamer {
    pub fn new(config: Arc<Mutex<DecimationConfig>>) -> Self {
        Self {
            config,
            decimators: HashMap::new(),
            transport: None,
            outbound: None,
        }
    }

    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Attach a drop-oldest outbound queue; a slow transport loses the oldest
    /// blocks, never blocks the producer.
    pub fn with_outbound(mut self, queue: Arc<IngestQueue<OutboundBlock>>) -> Self {
        self.outbound = Some(queue);
        self
    }

    fn decimator_for(&mut self, channel: &ChannelKey) -> &mut Decimator {
        let config = self
            .config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        let dec = self
            .decimators
            .entry(channel.clone())
            .or_insert_with(|| Decimator::new(config.clone()));
        if dec.config() != &config {
            dec.set_config(config);
        }
        dec
    }
}

impl SampleSink for Streamer {
    fn name(&self) -> &'static str {
        "streamer"
    }

    fn handle_samples(&mut self, channel: &ChannelKey, times: &[f64], values: &[f64]) -> Result<()> {
        let block = self.decimator_for(channel).process_block(times, values);
        if block.is_empty() {
            // Underflow: not enough raw samples for one group yet.
            return Ok(());
        }
        if let Some(queue) = &self.outbound {
            queue.offer((channel.clone(), block.clone()));
        }
        if let Some(transport) = &mut self.transport {
            transport.send_block(channel, &block)?;
        }
        Ok(())
    }
}
