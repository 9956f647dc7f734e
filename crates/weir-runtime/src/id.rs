//! Runtime identifiers: process-local minting plus the block-id codec.
//!
//! A block id embeds the runtime edge that produced it and the index of the
//! producing task, so metric reports keyed by block can be traced back to
//! the stage edge they describe.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STAGE: AtomicU64 = AtomicU64::new(0);
static NEXT_RUNTIME_EDGE: AtomicU64 = AtomicU64::new(0);

const BLOCK_PREFIX: &str = "Block-";

pub fn generate_stage_id() -> String {
    format!("Stage{}", NEXT_STAGE.fetch_add(1, Ordering::Relaxed))
}

/// Runtime edge ids must not contain `-`; the block-id codec splits on it.
pub fn generate_runtime_edge_id() -> String {
    format!("REdge{}", NEXT_RUNTIME_EDGE.fetch_add(1, Ordering::Relaxed))
}

pub fn generate_task_id(stage_id: &str, task_index: u32) -> String {
    format!("Task-{stage_id}-{task_index}")
}

/// Id of the block written by task `task_index` over `runtime_edge_id`.
pub fn generate_block_id(runtime_edge_id: &str, task_index: u32) -> String {
    format!("{BLOCK_PREFIX}{runtime_edge_id}-{task_index}")
}

/// Inverts [`generate_block_id`]: the runtime edge id embedded in a block
/// id, or `None` when the string does not follow the block-id scheme.
pub fn runtime_edge_id_of(block_id: &str) -> Option<&str> {
    let rest = block_id.strip_prefix(BLOCK_PREFIX)?;
    let (edge, index) = rest.rsplit_once('-')?;
    if edge.is_empty() || index.parse::<u32>().is_err() {
        return None;
    }
    Some(edge)
}
