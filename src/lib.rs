pub mod buffers;
pub mod config;
pub mod core;
pub mod engine;
pub mod observability;
pub mod pipeline;
pub mod queue;

pub use config::PipelineConfig;
pub use engine::{AdaptiveController, Engine, TuningHandle};
pub use pipeline::Pipeline;
