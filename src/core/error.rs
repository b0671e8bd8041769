use thiserror::Error;

/// Failures the pipeline itself can produce. Collaborator failures travel as
/// `anyhow::Error` inside `SinkDelivery`; queue saturation and decimation
/// underflow are deliberately not errors (a counter and an empty block).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Parallel input arrays disagree. The call is rejected before any sink
    /// runs; the caller must fix its input.
    #[error("input shape mismatch: {times} timestamps vs {values} values")]
    InputShape { times: usize, values: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// A storage or transport collaborator failed. The pipeline keeps
    /// processing subsequent batches.
    #[error("sink '{sink}' failed to deliver")]
    SinkDelivery {
        sink: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
