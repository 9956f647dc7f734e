use thiserror::Error;

/// Canonical result for the runtime optimizer.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by runtime passes. Every variant is fatal for the
/// invocation that raised it; the physical plan is left unchanged because
/// plan writes happen only after all computation succeeded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("no stage edges matched the reported blocks")]
    EmptyOptimizationEdges,

    #[error("dynamic optimization failed: {0}")]
    DynamicOptimization(String),

    #[error("requested {requested} skewed keys but only {observed} keys were observed")]
    InsufficientKeys { requested: usize, observed: usize },

    #[error(transparent)]
    Graph(#[from] weir_core::Error),
}
