use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::buffers::ChannelStore;
use crate::core::{ChannelKey, DecimationConfig};
use crate::pipeline::{Decimator, SampleSink};

/// Fine-reduction sink feeding the rendering ring buffers. Envelope and
/// smoothing are typically enabled so the on-screen trace keeps amplitude
/// range while staying calm.
pub struct Plotter {
    config: Arc<Mutex<DecimationConfig>>,
    decimators: HashMap<ChannelKey, Decimator>,
    store: Arc<ChannelStore>,
}

impl Plotter {
    pub fn new(config: Arc<Mutex<DecimationConfig>>, store: Arc<ChannelStore>) -> Self {
        Self {
            config,
            decimators: HashMap::new(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<ChannelStore> {
        &self.store
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

impl SampleSink for Plotter {
    fn name(&self) -> &'static str {
        "plotter"
    }

    fn handle_samples(&mut self, channel: &ChannelKey, times: &[f64], values: &[f64]) -> Result<()> {
        let block = self.decimator_for(channel).process_block(times, values);
        if block.is_empty() {
            return Ok(());
        }
        let buffer = self.store.buffer_or_create(channel);
        // Held only for the appends; renderers take it per window copy.
        let mut buffer = buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (&t, &mean) in block.timestamps.iter().zip(&block.means) {
            buffer.append(t, mean);
        }
        Ok(())
    }
}
