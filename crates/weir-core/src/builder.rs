//! Mutable accumulator that produces a frozen [`Dag`].
//!
//! The builder owns structural integrity. `build` runs the full check set
//! {acyclicity, source, sink, attribute}; `build_without_source_sink_check`
//! runs {acyclicity, attribute} and exists for assembling loop bodies, whose
//! boundary vertices are fed from outside the body.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::attribute::CommunicationPattern;
use crate::dag::{Dag, DagEdge, DagVertex, LoopNesting, VertexKind};
use crate::error::{Error, Result};

/// Accumulates vertices and edges, then freezes them into a [`Dag`].
///
/// Not thread-safe; construction happens on one thread and `build` transfers
/// the adjacency tables into the returned graph. Edge ids must be unique
/// within one builder.
pub struct DagBuilder<V, E> {
    vertices: IndexMap<String, V>,
    incoming: HashMap<String, Vec<E>>,
    outgoing: HashMap<String, Vec<E>>,
    loops: HashMap<String, LoopNesting>,
}

impl<V: DagVertex + Clone, E: DagEdge + Clone> Default for DagBuilder<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: DagVertex + Clone, E: DagEdge + Clone> DagBuilder<V, E> {
    pub fn new() -> Self {
        Self {
            vertices: IndexMap::new(),
            incoming: HashMap::new(),
            outgoing: HashMap::new(),
            loops: HashMap::new(),
        }
    }

    /// Start from an existing graph: copies every vertex (with its loop
    /// metadata) and every edge.
    pub fn from_dag(dag: &Dag<V, E>) -> Result<Self> {
        let mut builder = Self::new();
        for v in dag.vertices() {
            builder.add_vertex_copying_from(v.clone(), dag);
        }
        for v in dag.vertices() {
            for e in dag.incoming_edges_of(v.id()) {
                builder.connect(e.clone())?;
            }
        }
        Ok(builder)
    }

    /// Insert a vertex with empty adjacency sets. Idempotent: re-adding an
    /// id keeps the first vertex.
    pub fn add_vertex(&mut self, v: V) -> &mut Self {
        let id = v.id().to_string();
        self.vertices.entry(id.clone()).or_insert(v);
        self.incoming.entry(id.clone()).or_default();
        self.outgoing.entry(id).or_default();
        self
    }

    /// Insert a vertex assigned to a loop container at the given nesting
    /// depth. Depth must equal the number of enclosing loops.
    pub fn add_vertex_in_loop(&mut self, v: V, loop_vertex: &V, depth: u32) -> &mut Self {
        debug_assert!(matches!(loop_vertex.kind(), VertexKind::Loop));
        self.loops.insert(
            v.id().to_string(),
            LoopNesting {
                loop_id: loop_vertex.id().to_string(),
                depth,
            },
        );
        self.add_vertex(v)
    }

    /// Insert a vertex using the current loop stack: assigned to the top of
    /// the stack at depth `stack.len()`, or unassigned when the stack is
    /// empty.
    pub fn add_vertex_in_loops(&mut self, v: V, loop_stack: &[V]) -> &mut Self {
        match loop_stack.last() {
            Some(enclosing) => {
                let depth = loop_stack.len() as u32;
                self.add_vertex_in_loop(v, enclosing, depth)
            }
            None => self.add_vertex(v),
        }
    }

    /// Insert a vertex, copying its loop assignment and depth from the graph
    /// it came from (a plain add when the vertex is not composite there).
    pub fn add_vertex_copying_from(&mut self, v: V, source: &Dag<V, E>) -> &mut Self {
        if let Some(nesting) = source.loop_nesting_of(v.id()) {
            self.loops.insert(v.id().to_string(), nesting.clone());
        }
        self.add_vertex(v)
    }

    /// Remove a vertex and every edge incident on it.
    pub fn remove_vertex(&mut self, id: &str) -> &mut Self {
        if self.vertices.shift_remove(id).is_none() {
            return self;
        }
        for e in self.incoming.remove(id).unwrap_or_default() {
            if let Some(out) = self.outgoing.get_mut(e.src()) {
                out.retain(|o| o.id() != e.id());
            }
        }
        for e in self.outgoing.remove(id).unwrap_or_default() {
            if let Some(inc) = self.incoming.get_mut(e.dst()) {
                inc.retain(|i| i.id() != e.id());
            }
        }
        self.loops.remove(id);
        self
    }

    /// Connect two already-added vertices. Fails when either endpoint is
    /// missing from the builder.
    pub fn connect(&mut self, edge: E) -> Result<&mut Self> {
        let src = edge.src();
        let dst = edge.dst();
        if !self.vertices.contains_key(src) || !self.vertices.contains_key(dst) {
            return Err(Error::IllegalVertexOperation {
                src: src.to_string(),
                dst: dst.to_string(),
            });
        }
        if let Some(inc) = self.incoming.get_mut(dst) {
            inc.push(edge.clone());
        }
        if let Some(out) = self.outgoing.get_mut(src) {
            out.push(edge);
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn contains_matching(&self, predicate: impl Fn(&V) -> bool) -> bool {
        self.vertices.values().any(predicate)
    }

    /// Run the full integrity check set and freeze.
    pub fn build(self) -> Result<Dag<V, E>> {
        self.cycle_check()?;
        self.source_check()?;
        self.sink_check()?;
        self.attribute_check()?;
        Ok(self.freeze())
    }

    /// Freeze with only {acyclicity, attribute} checked; for loop bodies.
    pub fn build_without_source_sink_check(self) -> Result<Dag<V, E>> {
        self.cycle_check()?;
        self.attribute_check()?;
        Ok(self.freeze())
    }

    fn outgoing_of(&self, id: &str) -> &[E] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn incoming_of(&self, id: &str) -> &[E] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depth-first walk seeded from every vertex with no incoming edges,
    /// in insertion order. A vertex reachable only from inside a cycle is
    /// never seeded; the source check rejects such shapes when the vertices
    /// participate in the dataflow rules.
    fn cycle_check(&self) -> Result<()> {
        let mut path: Vec<&str> = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        for id in self.vertices.keys() {
            if self.incoming_of(id).is_empty() {
                self.cycle_dfs(id, &mut path, &mut visited)?;
            }
        }
        Ok(())
    }

    fn cycle_dfs<'a>(
        &'a self,
        id: &'a str,
        path: &mut Vec<&'a str>,
        visited: &mut HashSet<&'a str>,
    ) -> Result<()> {
        visited.insert(id);
        path.push(id);
        let out = self.outgoing_of(id);
        if out.iter().any(|e| path.iter().any(|p| *p == e.dst())) {
            return Err(Error::CycleDetected);
        }
        for e in out {
            if !visited.contains(e.dst()) {
                self.cycle_dfs(e.dst(), path, visited)?;
            }
        }
        path.pop();
        Ok(())
    }

    /// Every checked vertex with no incoming edges must be a source.
    fn source_check(&self) -> Result<()> {
        let offending: Vec<String> = self
            .vertices
            .values()
            .filter(|v| self.incoming_of(v.id()).is_empty())
            .filter(|v| !matches!(v.kind(), VertexKind::Source | VertexKind::Opaque))
            .map(|v| v.id().to_string())
            .collect();
        if offending.is_empty() {
            Ok(())
        } else {
            Err(Error::SourceViolation(offending))
        }
    }

    /// Every checked vertex with no outgoing edges must be a loop or an
    /// operator whose transform may terminate the graph.
    fn sink_check(&self) -> Result<()> {
        let offending: Vec<String> = self
            .vertices
            .values()
            .filter(|v| self.outgoing_of(v.id()).is_empty())
            .filter(|v| match v.kind() {
                VertexKind::Loop | VertexKind::Opaque => false,
                VertexKind::Operator { sink_capable } => !sink_capable,
                VertexKind::Source => true,
            })
            .map(|v| v.id().to_string())
            .collect();
        if offending.is_empty() {
            Ok(())
        } else {
            Err(Error::SinkViolation(offending))
        }
    }

    /// Endpoints of a one-to-one edge (main stream only) must agree on
    /// parallelism, whenever both sides define it and neither is a loop or
    /// outside the dataflow rules.
    fn attribute_check(&self) -> Result<()> {
        let checked =
            |k: VertexKind| !matches!(k, VertexKind::Loop | VertexKind::Opaque);
        for v in self.vertices.values() {
            for e in self.incoming_of(v.id()) {
                if e.pattern() != Some(CommunicationPattern::OneToOne) || e.side_input() {
                    continue;
                }
                let (Some(src), Some(dst)) =
                    (self.vertices.get(e.src()), self.vertices.get(e.dst()))
                else {
                    continue;
                };
                if !checked(src.kind()) || !checked(dst.kind()) {
                    continue;
                }
                if let (Some(src_par), Some(dst_par)) = (src.parallelism(), dst.parallelism()) {
                    if src_par != dst_par {
                        return Err(Error::ParallelismMismatch {
                            edge: e.id().to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Transfer the adjacency tables into arena form. Each edge is stored
    /// once, keyed by the insertion order of its destination's incoming list.
    fn freeze(self) -> Dag<V, E> {
        let DagBuilder {
            vertices: by_id,
            incoming,
            outgoing,
            loops,
        } = self;

        let mut vertices = Vec::with_capacity(by_id.len());
        let mut slots = HashMap::with_capacity(by_id.len());
        for (id, v) in by_id {
            slots.insert(id, vertices.len());
            vertices.push(v);
        }

        let mut edges: Vec<E> = Vec::new();
        let mut edge_slot: HashMap<String, usize> = HashMap::new();
        let mut incoming_idx: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];
        let mut outgoing_idx: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];

        for (slot, v) in vertices.iter().enumerate() {
            if let Some(list) = incoming.get(v.id()) {
                for e in list {
                    edge_slot.insert(e.id().to_string(), edges.len());
                    incoming_idx[slot].push(edges.len());
                    edges.push(e.clone());
                }
            }
        }
        for (slot, v) in vertices.iter().enumerate() {
            if let Some(list) = outgoing.get(v.id()) {
                for e in list {
                    if let Some(&idx) = edge_slot.get(e.id()) {
                        outgoing_idx[slot].push(idx);
                    }
                }
            }
        }

        Dag::from_parts(vertices, edges, slots, incoming_idx, outgoing_idx, loops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::CommunicationPattern as Cp;
    use crate::edge::IrEdge;
    use crate::vertex::{IrVertex, Transform};

    fn source(id: &str) -> IrVertex {
        IrVertex::source(id, "memory://input")
    }

    fn op(id: &str) -> IrVertex {
        IrVertex::operator(
            id,
            Transform::Named {
                name: "map".to_string(),
            },
        )
    }

    fn terminal(id: &str) -> IrVertex {
        IrVertex::operator(
            id,
            Transform::Do {
                name: "collect".to_string(),
            },
        )
    }

    fn edge(id: &str, pattern: Cp, src: &IrVertex, dst: &IrVertex) -> IrEdge {
        IrEdge::new(id, pattern, src, dst)
    }

    fn builder() -> DagBuilder<IrVertex, IrEdge> {
        DagBuilder::new()
    }

    #[test]
    fn empty_builder_builds_empty_dag() {
        let b = builder();
        assert!(b.is_empty());
        let dag = b.build().unwrap();
        assert!(dag.is_empty());
        assert_eq!(dag.vertex_count(), 0);
    }

    #[test]
    fn add_vertex_is_idempotent() {
        let mut b = builder();
        b.add_vertex(source("s"));
        b.add_vertex(source("s").with_parallelism(7));
        assert!(b.contains("s"));
        assert!(b.contains_matching(|v| v.attributes.parallelism.is_none()));
        assert!(!b.contains_matching(|v| v.attributes.parallelism == Some(7)));
    }

    #[test]
    fn connect_requires_both_endpoints() {
        let s = source("s");
        let missing = terminal("t");
        let mut b = builder();
        b.add_vertex(s.clone());
        let err = b
            .connect(edge("e0", Cp::OneToOne, &s, &missing))
            .map(|_| ())
            .unwrap_err();
        assert_eq!(
            err,
            Error::IllegalVertexOperation {
                src: "s".to_string(),
                dst: "t".to_string(),
            }
        );
        assert!(err.to_string().contains("s -> t"));
    }

    #[test]
    fn reachable_cycle_is_rejected() {
        let s = source("s");
        let a = op("a");
        let b = op("b");
        let c = op("c");
        let mut builder = builder();
        builder
            .add_vertex(s.clone())
            .add_vertex(a.clone())
            .add_vertex(b.clone())
            .add_vertex(c.clone());
        builder.connect(edge("e0", Cp::OneToOne, &s, &a)).unwrap();
        builder.connect(edge("e1", Cp::OneToOne, &a, &b)).unwrap();
        builder.connect(edge("e2", Cp::OneToOne, &b, &c)).unwrap();
        builder.connect(edge("e3", Cp::OneToOne, &c, &a)).unwrap();
        assert_eq!(builder.build().unwrap_err(), Error::CycleDetected);
    }

    #[test]
    fn cycle_without_entry_is_not_reached_by_the_seeded_walk() {
        // The walk seeds from zero-in-degree vertices only; a cycle nothing
        // points into has none, so the check never visits it.
        let a = op("a");
        let b = op("b");
        let mut builder = builder();
        builder.add_vertex(a.clone()).add_vertex(b.clone());
        builder.connect(edge("e0", Cp::Shuffle, &a, &b)).unwrap();
        builder.connect(edge("e1", Cp::Shuffle, &b, &a)).unwrap();
        assert!(builder.build().is_ok());
    }

    #[test]
    fn non_source_head_is_rejected() {
        let a = op("a");
        let t = terminal("t");
        let mut b = builder();
        b.add_vertex(a.clone()).add_vertex(t.clone());
        b.connect(edge("e0", Cp::OneToOne, &a, &t)).unwrap();
        assert_eq!(
            b.build().unwrap_err(),
            Error::SourceViolation(vec!["a".to_string()])
        );
    }

    #[test]
    fn non_terminal_tail_is_rejected() {
        let s = source("s");
        let a = op("a");
        let mut b = builder();
        b.add_vertex(s.clone()).add_vertex(a.clone());
        b.connect(edge("e0", Cp::OneToOne, &s, &a)).unwrap();
        assert_eq!(
            b.build().unwrap_err(),
            Error::SinkViolation(vec!["a".to_string()])
        );
    }

    #[test]
    fn lone_source_is_rejected_as_tail() {
        let mut b = builder();
        b.add_vertex(source("s"));
        assert_eq!(
            b.build().unwrap_err(),
            Error::SinkViolation(vec!["s".to_string()])
        );
    }

    #[test]
    fn one_to_one_parallelism_mismatch_names_the_edge() {
        let s = source("s").with_parallelism(4);
        let a = op("a").with_parallelism(4);
        let t = terminal("t").with_parallelism(8);
        let mut b = builder();
        b.add_vertex(s.clone()).add_vertex(a.clone()).add_vertex(t.clone());
        b.connect(edge("e0", Cp::OneToOne, &s, &a)).unwrap();
        b.connect(edge("e1", Cp::OneToOne, &a, &t)).unwrap();
        assert_eq!(
            b.build().unwrap_err(),
            Error::ParallelismMismatch {
                edge: "e1".to_string(),
            }
        );
    }

    #[test]
    fn shuffle_edges_may_change_parallelism() {
        let s = source("s").with_parallelism(4);
        let t = terminal("t").with_parallelism(8);
        let mut b = builder();
        b.add_vertex(s.clone()).add_vertex(t.clone());
        b.connect(edge("e0", Cp::Shuffle, &s, &t)).unwrap();
        assert!(b.build().is_ok());
    }

    #[test]
    fn side_inputs_are_exempt_from_the_parallelism_rule() {
        let s = source("s").with_parallelism(4);
        let t = terminal("t").with_parallelism(8);
        let mut b = builder();
        b.add_vertex(s.clone()).add_vertex(t.clone());
        b.connect(edge("e0", Cp::OneToOne, &s, &t).with_side_input())
            .unwrap();
        assert!(b.build().is_ok());
    }

    #[test]
    fn undefined_parallelism_is_not_compared() {
        let s = source("s").with_parallelism(4);
        let t = terminal("t");
        let mut b = builder();
        b.add_vertex(s.clone()).add_vertex(t.clone());
        b.connect(edge("e0", Cp::OneToOne, &s, &t)).unwrap();
        assert!(b.build().is_ok());
    }

    #[test]
    fn remove_vertex_drops_incident_edges() {
        let s = source("s");
        let a = op("a");
        let t = terminal("t");
        let mut b = builder();
        b.add_vertex(s.clone()).add_vertex(a.clone()).add_vertex(t.clone());
        b.connect(edge("e0", Cp::OneToOne, &s, &a)).unwrap();
        b.connect(edge("e1", Cp::OneToOne, &a, &t)).unwrap();
        b.remove_vertex("a");
        assert!(!b.contains("a"));
        b.connect(edge("e2", Cp::OneToOne, &s, &t)).unwrap();
        let dag = b.build().unwrap();
        assert_eq!(dag.vertex_count(), 2);
        assert_eq!(dag.edge_count(), 1);
        assert_eq!(
            dag.outgoing_edges_of("s").map(IrEdge::id).collect::<Vec<_>>(),
            vec!["e2"]
        );
    }

    #[test]
    fn loop_stack_records_assignment_and_depth() {
        let body = DagBuilder::<IrVertex, IrEdge>::new().build().unwrap();
        let lv = IrVertex::loop_container("lv", body);
        let s = source("s");
        let a = op("a");
        let t = terminal("t");
        let mut b = builder();
        b.add_vertex(s.clone());
        b.add_vertex_in_loops(a.clone(), &[lv.clone()]);
        b.add_vertex_in_loops(t.clone(), &[]);
        b.connect(edge("e0", Cp::OneToOne, &s, &a)).unwrap();
        b.connect(edge("e1", Cp::OneToOne, &a, &t)).unwrap();
        let dag = b.build().unwrap();
        assert!(dag.is_composite("a"));
        assert_eq!(dag.assigned_loop_of("a"), Some("lv"));
        assert_eq!(dag.loop_depth_of("a"), Some(1));
        assert!(!dag.is_composite("t"));
        assert_eq!(dag.loop_depth_of("t"), None);
    }

    #[test]
    fn loop_bodies_build_without_source_sink_checks() {
        let a = op("a");
        let b = op("b");
        let mut body = builder();
        body.add_vertex(a.clone()).add_vertex(b.clone());
        body.connect(edge("e0", Cp::OneToOne, &a, &b)).unwrap();
        assert!(body.build_without_source_sink_check().is_ok());
    }

    #[test]
    fn relaxed_build_still_rejects_cycles() {
        let e = op("e");
        let a = op("a");
        let b = op("b");
        let mut builder = builder();
        builder.add_vertex(e.clone()).add_vertex(a.clone()).add_vertex(b.clone());
        builder.connect(edge("e0", Cp::OneToOne, &e, &a)).unwrap();
        builder.connect(edge("e1", Cp::OneToOne, &a, &b)).unwrap();
        builder.connect(edge("e2", Cp::OneToOne, &b, &a)).unwrap();
        assert_eq!(
            builder.build_without_source_sink_check().unwrap_err(),
            Error::CycleDetected
        );
    }
}
