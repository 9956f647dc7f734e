//! IR vertices: a shared header (id + attributes) with a kind-specific
//! payload, flattened from the source/operator/loop class family.

use serde::{Deserialize, Serialize};

use crate::attribute::{Placement, VertexAttributes};
use crate::dag::{DagVertex, VertexKind};
use crate::IrDag;

/// The user transform wrapped by an operator vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    /// Per-element user function. The only transform legal at a graph sink.
    Do { name: String },
    /// Forwards raw payloads without decoding them.
    Relay,
    /// Any other named transform.
    Named { name: String },
}

/// Kind-specific payload of an [`IrVertex`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VertexPayload {
    /// Reads a bounded input. The only legal shape for an IR vertex with no
    /// incoming edges.
    Source {
        /// Opaque description of the input (path, dataset name, ...).
        input: String,
    },
    /// Applies a user transform to its inputs.
    Operator { transform: Transform },
    /// Composite container holding a nested graph. Bodies are assembled with
    /// [`DagBuilder::build_without_source_sink_check`](crate::builder::DagBuilder::build_without_source_sink_check)
    /// since their boundary vertices are fed from outside the body.
    Loop { body: IrDag },
}

/// A vertex of the user-level dataflow IR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrVertex {
    id: String,
    pub attributes: VertexAttributes,
    payload: VertexPayload,
}

impl IrVertex {
    pub fn source(id: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: VertexAttributes::default(),
            payload: VertexPayload::Source {
                input: input.into(),
            },
        }
    }

    pub fn operator(id: impl Into<String>, transform: Transform) -> Self {
        Self {
            id: id.into(),
            attributes: VertexAttributes::default(),
            payload: VertexPayload::Operator { transform },
        }
    }

    pub fn loop_container(id: impl Into<String>, body: IrDag) -> Self {
        Self {
            id: id.into(),
            attributes: VertexAttributes::default(),
            payload: VertexPayload::Loop { body },
        }
    }

    pub fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.attributes.parallelism = Some(parallelism);
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.attributes.placement = Some(placement);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn payload(&self) -> &VertexPayload {
        &self.payload
    }

    /// Body graph, when this vertex is a loop container.
    pub fn loop_body(&self) -> Option<&IrDag> {
        match &self.payload {
            VertexPayload::Loop { body } => Some(body),
            _ => None,
        }
    }
}

impl DagVertex for IrVertex {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> VertexKind {
        match &self.payload {
            VertexPayload::Source { .. } => VertexKind::Source,
            VertexPayload::Operator { transform } => VertexKind::Operator {
                sink_capable: matches!(transform, Transform::Do { .. }),
            },
            VertexPayload::Loop { .. } => VertexKind::Loop,
        }
    }

    fn parallelism(&self) -> Option<u32> {
        self.attributes.parallelism
    }
}
