//! Large-shuffle decoder tagging.

use weir_core::attribute::{AttributeKey, CommunicationPattern, DecoderDescriptor};
use weir_core::IrDag;

use crate::annotating::AnnotatingPass;

/// Rewrites the decoder of every shuffle edge to the bytes decoder, so the
/// receiving side reads payloads without deserializing and relay operators
/// can forward them as-is. Non-shuffle edges are untouched.
#[derive(Debug, Default)]
pub struct LargeShuffleDecoderPass;

impl LargeShuffleDecoderPass {
    pub fn new() -> Self {
        Self
    }
}

impl AnnotatingPass for LargeShuffleDecoderPass {
    fn write_attribute(&self) -> AttributeKey {
        AttributeKey::Decoder
    }

    fn read_attributes(&self) -> &'static [AttributeKey] {
        &[AttributeKey::CommunicationPattern]
    }

    fn apply(&self, mut dag: IrDag) -> IrDag {
        let mut rewritten = 0usize;
        for edge in dag.edges_mut() {
            if edge.pattern() == CommunicationPattern::Shuffle {
                edge.attributes.decoder = Some(DecoderDescriptor::Bytes);
                rewritten += 1;
            }
        }
        tracing::trace!(rewritten, "tagged shuffle edges with the bytes decoder");
        dag
    }
}
