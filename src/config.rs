use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{DecimationConfig, PipelineError};
use crate::engine::ControllerBounds;

/// Whole-pipeline configuration. Everything here is the construction-time
/// shape; the per-knob setters on `TuningHandle` change a live pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default = "defaults::source_rate_hz")]
    pub source_rate_hz: f64,

    /// Coarse target for the remote viewer path.
    #[serde(default = "defaults::streamer_target_hz")]
    pub streamer_target_hz: f64,

    /// Fine target for the rendering path.
    #[serde(default = "defaults::plotter_target_hz")]
    pub plotter_target_hz: f64,

    /// EMA weight applied to the plotter's means.
    #[serde(default = "defaults::smoothing_alpha")]
    pub smoothing_alpha: Option<f64>,

    #[serde(default)]
    pub spike_threshold: Option<f64>,

    #[serde(default = "defaults::queue_capacity")]
    pub queue_capacity: usize,

    /// Rendering ring capacity per channel, sized for the maximum plot rate
    /// times the longest supported view window, plus margin.
    #[serde(default = "defaults::ring_capacity")]
    pub ring_capacity: usize,

    #[serde(default = "defaults::recorder_flush_threshold")]
    pub recorder_flush_threshold: usize,

    #[serde(default = "defaults::refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default = "defaults::control_period_ms")]
    pub control_period_ms: u64,

    #[serde(default)]
    pub controller: ControllerBounds,
}

mod defaults {
    pub fn source_rate_hz() -> f64 {
        500.0
    }
    pub fn streamer_target_hz() -> f64 {
        25.0
    }
    pub fn plotter_target_hz() -> f64 {
        60.0
    }
    pub fn smoothing_alpha() -> Option<f64> {
        Some(0.3)
    }
    pub fn queue_capacity() -> usize {
        4096
    }
    pub fn ring_capacity() -> usize {
        8192
    }
    pub fn recorder_flush_threshold() -> usize {
        1024
    }
    pub fn refresh_interval_ms() -> u64 {
        100
    }
    pub fn control_period_ms() -> u64 {
        1500
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_rate_hz: defaults::source_rate_hz(),
            streamer_target_hz: defaults::streamer_target_hz(),
            plotter_target_hz: defaults::plotter_target_hz(),
            smoothing_alpha: defaults::smoothing_alpha(),
            spike_threshold: None,
            queue_capacity: defaults::queue_capacity(),
            ring_capacity: defaults::ring_capacity(),
            recorder_flush_threshold: defaults::recorder_flush_threshold(),
            refresh_interval_ms: defaults::refresh_interval_ms(),
            control_period_ms: defaults::control_period_ms(),
            controller: ControllerBounds::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let config: Self =
            serde_json::from_value(value).context("failed to parse pipeline config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.streamer_decimation().validate()?;
        self.plotter_decimation().validate()?;
        if !(self.controller.safety_margin > 0.0 && self.controller.safety_margin < 1.0) {
            return Err(PipelineError::Config(format!(
                "safety margin must be in (0, 1), got {}",
                self.controller.safety_margin
            )));
        }
        if self.controller.min_refresh_ms > self.controller.max_refresh_ms {
            return Err(PipelineError::Config(
                "min refresh interval exceeds max".into(),
            ));
        }
        if self.controller.min_decimation_factor > self.controller.max_decimation_factor {
            return Err(PipelineError::Config(
                "min decimation factor exceeds max".into(),
            ));
        }
        Ok(())
    }

    /// Mean-only reduction for the transmission path.
    pub fn streamer_decimation(&self) -> DecimationConfig {
        DecimationConfig::mean_only(self.source_rate_hz, self.streamer_target_hz)
    }

    /// Envelope plus smoothing for the rendering path.
    pub fn plotter_decimation(&self) -> DecimationConfig {
        DecimationConfig {
            source_rate_hz: self.source_rate_hz,
            target_rate_hz: self.plotter_target_hz,
            use_envelope: true,
            smoothing_alpha: self.smoothing_alpha,
            spike_threshold: self.spike_threshold,
        }
    }
}
