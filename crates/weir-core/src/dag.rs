//! Frozen attributed DAG container and the traits its algorithms need.
//!
//! Edges live in a single owning arena ordered by insertion; adjacency lists
//! hold arena indices. Queries are O(1) on the index maps and O(degree) when
//! an edge list is walked, and every traversal is reproducible: vertex
//! insertion order first, edge insertion order second.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::attribute::CommunicationPattern;

/// Well-formedness classification of a vertex, consumed by the builder's
/// structural checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    /// Produces data; the only kind allowed to have no incoming edges.
    Source,
    /// Wraps a user transform. `sink_capable` operators may terminate the
    /// graph; all others need at least one outgoing edge.
    Operator { sink_capable: bool },
    /// Composite loop container.
    Loop,
    /// Outside the dataflow well-formedness rules (runtime stages and the
    /// like); the source/sink/parallelism checks skip these.
    Opaque,
}

/// Vertex interface the generic graph machinery works against.
pub trait DagVertex {
    /// Stable, unique id.
    fn id(&self) -> &str;
    fn kind(&self) -> VertexKind;
    /// Parallelism attribute, when the vertex defines one.
    fn parallelism(&self) -> Option<u32> {
        None
    }
}

/// Edge interface the generic graph machinery works against.
pub trait DagEdge {
    /// Stable id, unique within a graph.
    fn id(&self) -> &str;
    fn src(&self) -> &str;
    fn dst(&self) -> &str;
    /// Communication pattern, when the edge carries one.
    fn pattern(&self) -> Option<CommunicationPattern> {
        None
    }
    /// Side-input edges are exempt from the one-to-one parallelism rule.
    fn side_input(&self) -> bool {
        false
    }
}

/// Loop container assignment for a vertex: which loop holds it and how many
/// loops enclose it. Both pieces always travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopNesting {
    pub loop_id: String,
    pub depth: u32,
}

/// Graph frozen by [`DagBuilder::build`](crate::builder::DagBuilder::build).
///
/// Structure never changes after build. Optimization passes may rewrite
/// attributes in place through the `_mut` accessors; nothing else mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dag<V, E> {
    vertices: Vec<V>,
    edges: Vec<E>,
    slots: HashMap<String, usize>,
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
    loops: HashMap<String, LoopNesting>,
}

impl<V: DagVertex, E: DagEdge> Dag<V, E> {
    pub(crate) fn from_parts(
        vertices: Vec<V>,
        edges: Vec<E>,
        slots: HashMap<String, usize>,
        incoming: Vec<Vec<usize>>,
        outgoing: Vec<Vec<usize>>,
        loops: HashMap<String, LoopNesting>,
    ) -> Self {
        Self {
            vertices,
            edges,
            slots,
            incoming,
            outgoing,
            loops,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &V> {
        self.vertices.iter()
    }

    pub fn vertex(&self, id: &str) -> Option<&V> {
        self.slots.get(id).map(|&s| &self.vertices[s])
    }

    /// Every edge once, in arena order.
    pub fn edges(&self) -> impl Iterator<Item = &E> {
        self.edges.iter()
    }

    /// Mutable walk over all edges, for attribute rewrites by passes.
    /// Adjacency is untouched by design: it is keyed by arena index.
    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.edges.iter_mut()
    }

    /// Mutable walk over all vertices, for attribute rewrites by passes.
    pub fn vertices_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.vertices.iter_mut()
    }

    pub fn incoming_edges_of(&self, id: &str) -> impl Iterator<Item = &E> {
        self.adjacent(&self.incoming, id)
    }

    pub fn outgoing_edges_of(&self, id: &str) -> impl Iterator<Item = &E> {
        self.adjacent(&self.outgoing, id)
    }

    fn adjacent<'a>(&'a self, lists: &'a [Vec<usize>], id: &str) -> impl Iterator<Item = &'a E> {
        self.slots
            .get(id)
            .map(|&s| lists[s].as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&e| &self.edges[e])
    }

    /// Id of the loop container this vertex is assigned to, if any.
    pub fn assigned_loop_of(&self, id: &str) -> Option<&str> {
        self.loops.get(id).map(|n| n.loop_id.as_str())
    }

    /// Number of loops enclosing this vertex; `None` when not inside a loop.
    pub fn loop_depth_of(&self, id: &str) -> Option<u32> {
        self.loops.get(id).map(|n| n.depth)
    }

    pub fn is_composite(&self, id: &str) -> bool {
        self.loops.contains_key(id)
    }

    pub(crate) fn loop_nesting_of(&self, id: &str) -> Option<&LoopNesting> {
        self.loops.get(id)
    }

    /// Vertices in a deterministic topological order: ready vertices are
    /// taken in insertion order, and a vertex becomes ready in the order its
    /// last incoming edge was inserted.
    pub fn topological(&self) -> Vec<&V> {
        let mut indegree: Vec<usize> = self.incoming.iter().map(Vec::len).collect();
        let mut ready: VecDeque<usize> = (0..self.vertices.len())
            .filter(|&s| indegree[s] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.vertices.len());
        while let Some(s) = ready.pop_front() {
            order.push(&self.vertices[s]);
            for &e in &self.outgoing[s] {
                if let Some(&d) = self.slots.get(self.edges[e].dst()) {
                    indegree[d] -= 1;
                    if indegree[d] == 0 {
                        ready.push_back(d);
                    }
                }
            }
        }
        order
    }

    pub fn reverse_topological(&self) -> Vec<&V> {
        let mut order = self.topological();
        order.reverse();
        order
    }
}
