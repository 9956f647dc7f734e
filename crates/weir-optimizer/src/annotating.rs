//! The annotating-pass contract.

use weir_core::attribute::AttributeKey;
use weir_core::IrDag;

/// A compile-time pass over the IR.
///
/// Invariants:
/// - `apply` must not add or remove vertices or edges; the returned graph
///   has the vertex set, edge set, and adjacency of the input.
/// - Only the attribute named by `write_attribute` may be rewritten, and
///   decisions may only read the attributes in `read_attributes`. The driver
///   orders passes so that writers of those attributes run first.
pub trait AnnotatingPass {
    /// The single attribute this pass overwrites.
    fn write_attribute(&self) -> AttributeKey;

    /// Attributes consulted when deciding what to write.
    fn read_attributes(&self) -> &'static [AttributeKey];

    fn apply(&self, dag: IrDag) -> IrDag;
}
