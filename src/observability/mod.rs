pub mod metrics;
pub mod perf;

pub use metrics::PipelineMetrics;
pub use perf::{PerfHistory, PerfSample, PerfSnapshot};
