use crate::core::{DecimatedBlock, DecimationConfig};

/// Streaming block decimator.
///
/// Input is partitioned into consecutive groups of `factor` raw samples; a
/// partial group at the end of a call is carried into the next call so no
/// sample is lost at block boundaries. Each complete group emits its mean
/// (optionally run through an exponential moving average), optionally the
/// min/max envelope, and optionally a spike flag. The group timestamp is the
/// first raw sample's timestamp, carried samples included.
#[derive(Debug, Clone)]
pub struct Decimator {
    config: DecimationConfig,
    carry_times: Vec<f64>,
    carry_values: Vec<f64>,
    /// EMA state when smoothing is on; otherwise the previous group mean,
    /// which the no-envelope spike test deviates against.
    smoothed: Option<f64>,
}

impl Decimator {
    pub fn new(config: DecimationConfig) -> Self {
        Self {
            config,
            carry_times: Vec::new(),
            carry_values: Vec::new(),
            smoothed: None,
        }
    }

    pub fn config(&self) -> &DecimationConfig {
        &self.config
    }

    /// Swap parameters in place. Carried samples and smoothing state survive
    /// so a reconfiguration never drops data.
    pub fn set_config(&mut self, config: DecimationConfig) {
        self.config = config;
    }

    pub fn factor(&self) -> usize {
        self.config.factor()
    }

    /// Samples held over from previous calls, waiting for a complete group.
    pub fn pending(&self) -> usize {
        self.carry_times.len()
    }

    pub fn process_block(&mut self, times: &[f64], values: &[f64]) -> DecimatedBlock {
        debug_assert_eq!(times.len(), values.len());

        for (&t, &v) in times.iter().zip(values) {
            // A malformed record is skipped on its own; the batch continues.
            if t.is_finite() && v.is_finite() {
                self.carry_times.push(t);
                self.carry_values.push(v);
            } else {
                log::debug!("decimator: skipping non-finite sample ({t}, {v})");
            }
        }

        let n = self.factor();
        let complete = self.carry_times.len() / n;

        let mut block = DecimatedBlock {
            timestamps: Vec::with_capacity(complete),
            means: Vec::with_capacity(complete),
            mins: self.config.use_envelope.then(|| Vec::with_capacity(complete)),
            maxs: self.config.use_envelope.then(|| Vec::with_capacity(complete)),
            spikes: self
                .config
                .spike_threshold
                .map(|_| Vec::with_capacity(complete)),
        };

        for g in 0..complete {
            let start = g * n;
            let group = &self.carry_values[start..start + n];

            let mut sum = 0.0;
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &v in group {
                sum += v;
                min = min.min(v);
                max = max.max(v);
            }
            let mean = sum / n as f64;

            let previous = self.smoothed;
            let out_mean = match self.config.smoothing_alpha {
                Some(alpha) => match previous {
                    Some(state) => alpha * mean + (1.0 - alpha) * state,
                    None => mean,
                },
                None => mean,
            };
            self.smoothed = Some(out_mean);

            block.timestamps.push(self.carry_times[start]);
            block.means.push(out_mean);
            if let Some(mins) = block.mins.as_mut() {
                mins.push(min);
            }
            if let Some(maxs) = block.maxs.as_mut() {
                maxs.push(max);
            }
            if let Some(spikes) = block.spikes.as_mut() {
                let threshold = self.config.spike_threshold.unwrap_or(f64::INFINITY);
                let spike = if self.config.use_envelope {
                    max - min > threshold
                } else {
                    // Deviation from where the signal was; the first group
                    // has no baseline and is never a spike.
                    previous.map_or(false, |p| (mean - p).abs() > threshold)
                };
                spikes.push(spike);
            }
        }

        let consumed = complete * n;
        self.carry_times.drain(..consumed);
        self.carry_values.drain(..consumed);
        block
    }
}
