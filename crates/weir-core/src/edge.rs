//! IR edges: directed, typed by communication pattern, attribute-carrying.

use serde::{Deserialize, Serialize};

use crate::attribute::{CommunicationPattern, DecoderDescriptor, EdgeAttributes};
use crate::dag::DagEdge;
use crate::vertex::IrVertex;

/// An edge of the user-level dataflow IR. Endpoints are held by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrEdge {
    id: String,
    src: String,
    dst: String,
    pattern: CommunicationPattern,
    pub attributes: EdgeAttributes,
}

impl IrEdge {
    pub fn new(
        id: impl Into<String>,
        pattern: CommunicationPattern,
        src: &IrVertex,
        dst: &IrVertex,
    ) -> Self {
        Self {
            id: id.into(),
            src: src.id().to_string(),
            dst: dst.id().to_string(),
            pattern,
            attributes: EdgeAttributes::default(),
        }
    }

    pub fn with_side_input(mut self) -> Self {
        self.attributes.side_input = true;
        self
    }

    pub fn with_decoder(mut self, decoder: DecoderDescriptor) -> Self {
        self.attributes.decoder = Some(decoder);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pattern(&self) -> CommunicationPattern {
        self.pattern
    }
}

impl DagEdge for IrEdge {
    fn id(&self) -> &str {
        &self.id
    }

    fn src(&self) -> &str {
        &self.src
    }

    fn dst(&self) -> &str {
        &self.dst
    }

    fn pattern(&self) -> Option<CommunicationPattern> {
        Some(self.pattern)
    }

    fn side_input(&self) -> bool {
        self.attributes.side_input
    }
}
