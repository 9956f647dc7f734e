//! Execution attributes carried by vertices and edges.
//!
//! Attributes are fixed structs of optionals rather than open maps: the set
//! of keys is closed, and the pass framework declares which keys it touches
//! via [`AttributeKey`].

use serde::{Deserialize, Serialize};

/// How data moves across an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommunicationPattern {
    /// Task i of the source feeds task i of the destination.
    OneToOne,
    /// Every source task feeds every destination task with the full output.
    Broadcast,
    /// All-to-all, partitioned by key.
    Shuffle,
}

/// Marker for the decoder factory the executor instantiates for an edge.
///
/// The coder implementations themselves live with the executor; the
/// optimizer only ever rewrites this marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecoderDescriptor {
    /// Hand the payload over as raw bytes, skipping deserialization.
    /// Downstream relay operators forward these untouched.
    Bytes,
    /// Decode with the named registered coder.
    Coder(String),
}

/// Where a vertex's tasks should be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Evictable capacity; work may be preempted.
    Transient,
    /// Reserved capacity.
    Reserved,
}

/// Typed attribute keys, used by passes to declare their read-set and the
/// single attribute they write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKey {
    CommunicationPattern,
    Decoder,
    SideInput,
    Parallelism,
    Placement,
    TaskKeyRanges,
}

/// Attributes of an IR vertex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexAttributes {
    /// Number of parallel tasks evaluating this vertex.
    pub parallelism: Option<u32>,
    pub placement: Option<Placement>,
}

/// Attributes of an IR edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeAttributes {
    pub decoder: Option<DecoderDescriptor>,
    /// Present when the edge feeds a side input rather than the main stream.
    /// Side inputs are exempt from the one-to-one parallelism rule.
    pub side_input: bool,
}
