pub mod block;
pub mod error;
pub mod sample;

pub use block::{DecimatedBlock, DecimationConfig};
pub use error::PipelineError;
pub use sample::{Axis, ChannelKey, Sample, SampleBatch};
