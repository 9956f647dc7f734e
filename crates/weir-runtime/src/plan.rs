//! Physical-plan types: stages, stage edges, and the plan container.
//!
//! Stages reuse the core graph container through the vertex/edge traits with
//! an opaque kind, so the dataflow well-formedness rules skip them while the
//! acyclicity check still applies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use weir_core::attribute::{CommunicationPattern, DecoderDescriptor};
use weir_core::dag::{Dag, DagEdge, DagVertex, VertexKind};

use crate::id::generate_task_id;
use crate::key_range::HashRange;

/// The runtime-level graph: [`Stage`] vertices joined by [`StageEdge`]s.
pub type StageDag = Dag<Stage, StageEdge>;

/// Groups the parallel tasks that execute one operator pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    id: String,
    task_ids: Vec<String>,
}

impl Stage {
    pub fn new(id: impl Into<String>, task_count: u32) -> Self {
        let id = id.into();
        let task_ids = (0..task_count).map(|i| generate_task_id(&id, i)).collect();
        Self { id, task_ids }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// One task id per parallel task, ordered by task index.
    pub fn task_ids(&self) -> &[String] {
        &self.task_ids
    }
}

impl DagVertex for Stage {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> VertexKind {
        VertexKind::Opaque
    }
}

/// Runtime edge between stages. Carries the communication pattern, the
/// decoder chosen at compile time, and the mutable task-index → key-range
/// assignment that tells each downstream task which keys it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEdge {
    id: String,
    src: String,
    dst: String,
    pattern: CommunicationPattern,
    pub decoder: Option<DecoderDescriptor>,
    task_key_ranges: BTreeMap<u32, HashRange>,
}

impl StageEdge {
    pub fn new(
        id: impl Into<String>,
        pattern: CommunicationPattern,
        src: &Stage,
        dst: &Stage,
    ) -> Self {
        Self {
            id: id.into(),
            src: src.id.clone(),
            dst: dst.id.clone(),
            pattern,
            decoder: None,
            task_key_ranges: BTreeMap::new(),
        }
    }

    pub fn with_decoder(mut self, decoder: DecoderDescriptor) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn with_task_key_ranges(mut self, ranges: BTreeMap<u32, HashRange>) -> Self {
        self.task_key_ranges = ranges;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dst(&self) -> &str {
        &self.dst
    }

    pub fn pattern(&self) -> CommunicationPattern {
        self.pattern
    }

    pub fn task_key_ranges(&self) -> &BTreeMap<u32, HashRange> {
        &self.task_key_ranges
    }

    pub fn set_task_key_ranges(&mut self, ranges: BTreeMap<u32, HashRange>) {
        self.task_key_ranges = ranges;
    }
}

impl DagEdge for StageEdge {
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
}

/// Executable plan: a stable id plus the stage graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalPlan {
    id: String,
    stage_dag: StageDag,
}

impl PhysicalPlan {
    pub fn new(id: impl Into<String>, stage_dag: StageDag) -> Self {
        Self {
            id: id.into(),
            stage_dag,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stage_dag(&self) -> &StageDag {
        &self.stage_dag
    }
}
