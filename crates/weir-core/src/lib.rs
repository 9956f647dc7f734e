#![forbid(unsafe_code)]
//! weir-core: the attributed DAG intermediate representation of the engine's
//! optimizer, plus the validating builder that freezes it.
//!
//! Design:
//! - Vertices are a shared header (id + attributes) with a kind payload;
//!   the structural checks discriminate on [`dag::VertexKind`].
//! - Edges are held once in an arena inside the frozen [`dag::Dag`];
//!   adjacency lists carry arena indices, keeping iteration reproducible.
//! - Runtime-level graphs (stages) reuse the same container through the
//!   [`dag::DagVertex`]/[`dag::DagEdge`] traits with an opaque kind, so the
//!   dataflow well-formedness rules skip them.

pub mod attribute;
pub mod builder;
pub mod dag;
pub mod edge;
pub mod error;
pub mod prelude;
pub mod vertex;

pub use error::{Error, Result};

/// User-facing IR graph: [`vertex::IrVertex`] nodes joined by
/// [`edge::IrEdge`]s.
pub type IrDag = dag::Dag<vertex::IrVertex, edge::IrEdge>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
