//! Convenient re-exports for downstream crates.

pub use crate::attribute::{
    AttributeKey, CommunicationPattern, DecoderDescriptor, EdgeAttributes, Placement,
    VertexAttributes,
};
pub use crate::builder::DagBuilder;
pub use crate::dag::{Dag, DagEdge, DagVertex, LoopNesting, VertexKind};
pub use crate::edge::IrEdge;
pub use crate::error::{Error, Result};
pub use crate::vertex::{IrVertex, Transform, VertexPayload};
pub use crate::IrDag;
