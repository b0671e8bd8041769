use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::buffers::RingBuffer;
use crate::core::ChannelKey;

/// Registry of per-channel rendering buffers.
///
/// Single-writer model: the plotter creates buffers on first observation and
/// is the only appender. Renderers look up a channel and copy a window out;
/// the per-buffer mutex is held only for the append or the window copy, never
/// across a render call.
pub struct ChannelStore {
    buffers: RwLock<HashMap<ChannelKey, Arc<Mutex<RingBuffer>>>>,
    capacity_per_channel: usize,
}

impl ChannelStore {
    pub fn new(capacity_per_channel: usize) -> Self {
        Self {
            buffers: RwLock::new(HashMap::new()),
            capacity_per_channel: capacity_per_channel.max(1),
        }
    }

    pub fn capacity_per_channel(&self) -> usize {
        self.capacity_per_channel
    }

    /// Channels observed so far, in no particular order.
    pub fn channels(&self) -> Vec<ChannelKey> {
        self.read_buffers().keys().cloned().collect()
    }

    pub fn buffer(&self, channel: &ChannelKey) -> Option<Arc<Mutex<RingBuffer>>> {
        self.read_buffers().get(channel).cloned()
    }

    /// Writer-side lookup; creates the buffer on first observation.
    pub(crate) fn buffer_or_create(&self, channel: &ChannelKey) -> Arc<Mutex<RingBuffer>> {
        if let Some(buf) = self.read_buffers().get(channel) {
            return buf.clone();
        }
        let mut buffers = self
            .buffers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        buffers
            .entry(channel.clone())
            .or_insert_with(|| Arc::new(Mutex::new(RingBuffer::new(self.capacity_per_channel))))
            .clone()
    }

    /// Stable snapshot of `[t_start, t_end]` for one channel; empty if the
    /// channel has not been observed yet.
    pub fn window(&self, channel: &ChannelKey, t_start: f64, t_end: f64) -> Vec<(f64, f64)> {
        match self.buffer(channel) {
            Some(buf) => buf
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .window(t_start, t_end),
            None => Vec::new(),
        }
    }

    pub fn latest_timestamp(&self, channel: &ChannelKey) -> Option<f64> {
        self.buffer(channel)?
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .latest_timestamp()
    }

    fn read_buffers(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<ChannelKey, Arc<Mutex<RingBuffer>>>> {
        self.buffers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
