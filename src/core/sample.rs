use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement axis reported by a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
    /// Single-valued sensors (temperature, pressure, ...).
    Scalar,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
            Axis::Scalar => "scalar",
        };
        f.write_str(s)
    }
}

/// Identity of one logical signal: a physical sensor plus the axis it
/// reports. Keys are immutable; the set of live keys only grows within a
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelKey {
    pub sensor: String,
    pub axis: Axis,
}

impl ChannelKey {
    pub fn new(sensor: impl Into<String>, axis: Axis) -> Self {
        Self {
            sensor: sensor.into(),
            axis,
        }
    }

    pub fn scalar(sensor: impl Into<String>) -> Self {
        Self::new(sensor, Axis::Scalar)
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sensor, self.axis)
    }
}

/// One timestamped scalar reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub channel: ChannelKey,
    /// Seconds on the acquisition clock; non-decreasing within a channel.
    pub timestamp_s: f64,
    pub value: f64,
}

/// A run of samples from one channel. `times` and `values` are parallel
/// arrays; this is the unit handed across scheduling-domain boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBatch {
    pub channel: ChannelKey,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl SampleBatch {
    pub fn new(channel: ChannelKey) -> Self {
        Self {
            channel,
            times: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_data(channel: ChannelKey, times: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            channel,
            times,
            values,
        }
    }

    /// Group individually delivered records into per-channel batches. Arrival
    /// order is preserved within each channel; sources interleave channels
    /// freely.
    pub fn from_samples(samples: impl IntoIterator<Item = Sample>) -> Vec<SampleBatch> {
        let mut batches: Vec<SampleBatch> = Vec::new();
        for sample in samples {
            match batches.iter_mut().find(|b| b.channel == sample.channel) {
                Some(batch) => batch.push(sample.timestamp_s, sample.value),
                None => {
                    let mut batch = SampleBatch::new(sample.channel);
                    batch.push(sample.timestamp_s, sample.value);
                    batches.push(batch);
                }
            }
        }
        batches
    }

    pub fn push(&mut self, timestamp_s: f64, value: f64) {
        self.times.push(timestamp_s);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
