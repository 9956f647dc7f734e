use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised while assembling or validating a dataflow graph.
///
/// Every variant is fatal for the build that raised it: the builder returns
/// the error and no partial graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("builder does not contain an endpoint of the edge: {src} -> {dst}")]
    IllegalVertexOperation { src: String, dst: String },

    #[error("DAG contains a cycle")]
    CycleDetected,

    #[error("vertices without incoming edges must be sources: {0:?}")]
    SourceViolation(Vec<String>),

    #[error("vertices without outgoing edges must be loops or terminal operators: {0:?}")]
    SinkViolation(Vec<String>),

    #[error("one-to-one endpoints disagree on parallelism: {edge}")]
    ParallelismMismatch { edge: String },
}
