use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::{DecimationConfig, SampleBatch};
use crate::engine::ControllerBounds;
use crate::queue::IngestQueue;

/// Cloneable hot-tuning surface shared by callers, the engine, and the
/// adaptive controller. Every knob applies in place; nothing gets rebuilt.
#[derive(Clone)]
pub struct TuningHandle {
    streamer_config: Arc<Mutex<DecimationConfig>>,
    plotter_config: Arc<Mutex<DecimationConfig>>,
    queue: Arc<IngestQueue<SampleBatch>>,
    bounds: Arc<Mutex<ControllerBounds>>,
    refresh_interval_ms: Arc<AtomicU64>,
}

impl TuningHandle {
    pub fn new(
        streamer: DecimationConfig,
        plotter: DecimationConfig,
        queue: Arc<IngestQueue<SampleBatch>>,
        bounds: ControllerBounds,
        refresh_interval_ms: u64,
    ) -> Self {
        Self {
            streamer_config: Arc::new(Mutex::new(streamer)),
            plotter_config: Arc::new(Mutex::new(plotter)),
            queue,
            bounds: Arc::new(Mutex::new(bounds)),
            refresh_interval_ms: Arc::new(AtomicU64::new(refresh_interval_ms.max(1))),
        }
    }

    /// Shared config the streamer sink reads on every batch.
    pub fn shared_streamer_config(&self) -> Arc<Mutex<DecimationConfig>> {
        self.streamer_config.clone()
    }

    pub fn shared_plotter_config(&self) -> Arc<Mutex<DecimationConfig>> {
        self.plotter_config.clone()
    }

    pub fn streamer_config(&self) -> DecimationConfig {
        self.lock_streamer().clone()
    }

    pub fn plotter_config(&self) -> DecimationConfig {
        self.lock_plotter().clone()
    }

    pub fn queue(&self) -> &Arc<IngestQueue<SampleBatch>> {
        &self.queue
    }

    pub fn set_source_rate_hz(&self, hz: f64) {
        self.lock_streamer().source_rate_hz = hz;
        self.lock_plotter().source_rate_hz = hz;
    }

    pub fn set_streamer_target_hz(&self, hz: f64) {
        self.lock_streamer().target_rate_hz = hz;
    }

    pub fn set_plotter_target_hz(&self, hz: f64) {
        self.lock_plotter().target_rate_hz = hz;
    }

    pub fn set_smoothing_alpha(&self, alpha: Option<f64>) {
        self.lock_plotter().smoothing_alpha = alpha;
    }

    pub fn set_spike_threshold(&self, threshold: Option<f64>) {
        self.lock_plotter().spike_threshold = threshold;
    }

    pub fn set_queue_capacity(&self, capacity: usize) {
        self.queue.set_capacity(capacity);
    }

    pub fn controller_bounds(&self) -> ControllerBounds {
        self.bounds
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_controller_bounds(&self, bounds: ControllerBounds) {
        *self
            .bounds
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = bounds;
    }

    pub fn refresh_interval_ms(&self) -> u64 {
        self.refresh_interval_ms.load(Ordering::Relaxed)
    }

    pub fn set_refresh_interval_ms(&self, ms: u64) {
        self.refresh_interval_ms.store(ms.max(1), Ordering::Relaxed);
    }

    /// Current plotter decimation factor; the controller's fidelity knob.
    pub fn plotter_factor(&self) -> usize {
        self.lock_plotter().factor()
    }

    /// Re-derive the plotter target rate so the factor comes out as `factor`.
    pub fn set_plotter_factor(&self, factor: usize) {
        let mut cfg = self.lock_plotter();
        let factor = factor.max(1);
        cfg.target_rate_hz = cfg.source_rate_hz / factor as f64;
    }

    pub fn streamer_factor(&self) -> usize {
        self.lock_streamer().factor()
    }

    fn lock_streamer(&self) -> std::sync::MutexGuard<'_, DecimationConfig> {
        self.streamer_config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_plotter(&self) -> std::sync::MutexGuard<'_, DecimationConfig> {
        self.plotter_config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
