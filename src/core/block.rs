use serde::{Deserialize, Serialize};

use crate::core::PipelineError;

/// Per-use-site decimation parameters. Every sink owns its own copy; tuning
/// one sink never affects another's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecimationConfig {
    pub source_rate_hz: f64,
    /// A target above the source rate means "emit unchanged".
    pub target_rate_hz: f64,
    #[serde(default)]
    pub use_envelope: bool,
    /// Exponential moving average weight in (0, 1]. `None` disables smoothing.
    #[serde(default)]
    pub smoothing_alpha: Option<f64>,
    /// Flag a group as a spike when its amplitude range (or deviation from
    /// the previous smoothed value without envelope) exceeds this.
    #[serde(default)]
    pub spike_threshold: Option<f64>,
}

impl DecimationConfig {
    pub fn mean_only(source_rate_hz: f64, target_rate_hz: f64) -> Self {
        Self {
            source_rate_hz,
            target_rate_hz,
            use_envelope: false,
            smoothing_alpha: None,
            spike_threshold: None,
        }
    }

    /// Raw samples per decimated point, clamped to at least 1.
    pub fn factor(&self) -> usize {
        if !self.source_rate_hz.is_finite()
            || !self.target_rate_hz.is_finite()
            || self.source_rate_hz <= 0.0
            || self.target_rate_hz <= 0.0
        {
            return 1;
        }
        let ratio = (self.source_rate_hz / self.target_rate_hz).round();
        if ratio < 1.0 {
            1
        } else {
            ratio as usize
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.source_rate_hz.is_finite() || self.source_rate_hz <= 0.0 {
            return Err(PipelineError::Config(format!(
                "source rate must be a positive finite value, got {}",
                self.source_rate_hz
            )));
        }
        if !self.target_rate_hz.is_finite() || self.target_rate_hz <= 0.0 {
            return Err(PipelineError::Config(format!(
                "target rate must be a positive finite value, got {}",
                self.target_rate_hz
            )));
        }
        if let Some(alpha) = self.smoothing_alpha {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(PipelineError::Config(format!(
                    "smoothing alpha must be in (0, 1], got {alpha}"
                )));
            }
        }
        Ok(())
    }
}

/// Output of one decimation pass: parallel sequences, all the same length.
/// Zero length means "not enough input yet", never a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecimatedBlock {
    /// Timestamp of each group's first raw sample.
    pub timestamps: Vec<f64>,
    pub means: Vec<f64>,
    pub mins: Option<Vec<f64>>,
    pub maxs: Option<Vec<f64>>,
    pub spikes: Option<Vec<bool>>,
}

impl DecimatedBlock {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
