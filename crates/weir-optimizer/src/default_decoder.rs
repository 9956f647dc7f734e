//! Default decoder assignment.

use weir_core::attribute::{AttributeKey, DecoderDescriptor};
use weir_core::IrDag;

use crate::annotating::AnnotatingPass;

/// Name of the coder used when nothing more specific was assigned.
pub const DEFAULT_CODER: &str = "default";

/// Assigns the engine's default decoder to every edge that does not yet
/// carry one. Runs early so later decoder rewrites always overwrite a
/// defined attribute.
#[derive(Debug, Default)]
pub struct DefaultEdgeDecoderPass;

impl DefaultEdgeDecoderPass {
    pub fn new() -> Self {
        Self
    }
}

impl AnnotatingPass for DefaultEdgeDecoderPass {
    fn write_attribute(&self) -> AttributeKey {
        AttributeKey::Decoder
    }

    fn read_attributes(&self) -> &'static [AttributeKey] {
        &[]
    }

    fn apply(&self, mut dag: IrDag) -> IrDag {
        for edge in dag.edges_mut() {
            if edge.attributes.decoder.is_none() {
                edge.attributes.decoder =
                    Some(DecoderDescriptor::Coder(DEFAULT_CODER.to_string()));
            }
        }
        dag
    }
}

#[cfg(test)]
mod tests {
    use weir_core::attribute::CommunicationPattern as Cp;
    use weir_core::builder::DagBuilder;
    use weir_core::edge::IrEdge;
    use weir_core::vertex::{IrVertex, Transform};

    use super::*;

    #[test]
    fn fills_missing_decoders_and_keeps_assigned_ones() {
        let s = IrVertex::source("s", "memory://input");
        let t = IrVertex::operator(
            "t",
            Transform::Do {
                name: "collect".to_string(),
            },
        );
        let mut builder = DagBuilder::new();
        builder.add_vertex(s.clone()).add_vertex(t.clone());
        builder.connect(IrEdge::new("e1", Cp::OneToOne, &s, &t)).unwrap();
        builder
            .connect(
                IrEdge::new("e2", Cp::Shuffle, &s, &t).with_decoder(DecoderDescriptor::Bytes),
            )
            .unwrap();
        let dag = DefaultEdgeDecoderPass::new().apply(builder.build().unwrap());

        let decoder = |id: &str| {
            dag.edges()
                .find(|e| e.id() == id)
                .and_then(|e| e.attributes.decoder.clone())
        };
        assert_eq!(
            decoder("e1"),
            Some(DecoderDescriptor::Coder(DEFAULT_CODER.to_string()))
        );
        assert_eq!(decoder("e2"), Some(DecoderDescriptor::Bytes));
    }
}
