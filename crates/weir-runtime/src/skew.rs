//! Data-skew rebalancing.
//!
//! Consumes a metric report (block ids plus a key → partition-size map),
//! computes a near-even partition of the keyspace across the destination
//! stage's tasks, marks hot keys, and overwrites the task key-range
//! assignment of every stage edge the report describes. All writes land on a
//! rebuilt plan returned to the caller, so a failed invocation leaves the
//! running plan untouched.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use weir_core::builder::DagBuilder;

use crate::config::RuntimeOptimizerConfig;
use crate::error::{Error, Result};
use crate::id::runtime_edge_id_of;
use crate::key_range::HashRange;
use crate::pass::{RuntimePass, DYNAMIC_OPTIMIZATION_HANDLER};
use crate::plan::{PhysicalPlan, StageEdge};

/// Number of keys treated as skewed when nothing else is configured.
pub const DEFAULT_SKEWED_KEY_COUNT: usize = 3;

/// Metric payload delivered by the executor: which blocks the report covers
/// and the observed size of each key's partition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkewMetric {
    pub block_ids: Vec<String>,
    pub key_sizes: BTreeMap<u64, u64>,
}

/// Rebalances key ranges when partition sizes are skewed.
#[derive(Debug, Clone)]
pub struct DataSkewPass {
    skewed_key_count: usize,
}

impl Default for DataSkewPass {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSkewPass {
    pub fn new() -> Self {
        Self {
            skewed_key_count: DEFAULT_SKEWED_KEY_COUNT,
        }
    }

    pub fn from_config(config: &RuntimeOptimizerConfig) -> Self {
        Self {
            skewed_key_count: config.skewed_key_count,
        }
    }

    pub fn with_skewed_key_count(mut self, count: usize) -> Self {
        self.skewed_key_count = count;
        self
    }

    /// The configured number of largest keys, ordered by size descending
    /// with ascending key as the tie-break.
    pub fn identify_skewed_keys(&self, key_sizes: &BTreeMap<u64, u64>) -> Result<Vec<u64>> {
        if key_sizes.len() < self.skewed_key_count {
            return Err(Error::InsufficientKeys {
                requested: self.skewed_key_count,
                observed: key_sizes.len(),
            });
        }
        let mut by_size: Vec<(u64, u64)> = key_sizes.iter().map(|(k, s)| (*k, *s)).collect();
        by_size.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(by_size
            .into_iter()
            .take(self.skewed_key_count)
            .map(|(key, size)| {
                tracing::debug!(key, size, "skewed key");
                key
            })
            .collect())
    }

    /// Group keys into `task_count` contiguous ranges of approximately
    /// `total size / task_count` each.
    ///
    /// Walks keys upward from 0, accumulating sizes (absent keys weigh 0)
    /// until the accumulated size reaches the running ideal; if stopping one
    /// key earlier lands closer to the ideal, the boundary steps back. The
    /// emitted ranges partition `[0, max_key + 1)`: bounds never pass the end
    /// of the keyspace, and the final range always closes it.
    pub fn calculate_key_ranges(
        &self,
        key_sizes: &BTreeMap<u64, u64>,
        task_count: usize,
    ) -> Result<Vec<HashRange>> {
        let max_key = *key_sizes.keys().next_back().ok_or_else(|| {
            Error::DynamicOptimization("no key sizes were reported".to_string())
        })?;
        if task_count == 0 {
            return Err(Error::DynamicOptimization(
                "destination stage has no tasks".to_string(),
            ));
        }
        let skewed = self.identify_skewed_keys(key_sizes)?;

        let total: u64 = key_sizes.values().sum();
        let ideal = total / task_count as u64;
        let size_of = |key: u64| key_sizes.get(&key).copied().unwrap_or(0);
        let keyspace_end = max_key + 1;

        let mut ranges = Vec::with_capacity(task_count);
        // Invariant between iterations: acc is the summed size of [0, finish).
        let mut start: u64 = 0;
        let mut finish: u64 = 1;
        let mut acc: u64 = size_of(0);
        for i in 1..=task_count {
            if i != task_count {
                let target = ideal * i as u64;
                while acc < target {
                    acc += size_of(finish);
                    finish += 1;
                }
                // Stopped at or past the target; prefer the closer of here
                // and one key back. The step-back gap can be negative when an
                // earlier boundary already overshot this target.
                let one_step_back = acc - size_of(finish - 1);
                let overshoot = (acc - target) as i128;
                let step_back_gap = target as i128 - one_step_back as i128;
                if overshoot > step_back_gap {
                    finish -= 1;
                    acc -= size_of(finish);
                }
                // Small totals can stall the walk past the keyspace; emitted
                // bounds are capped at its end.
                let end = finish.min(keyspace_end);
                ranges.push(range_over(start, end, &skewed));
                start = end;
                acc += size_of(finish);
                finish += 1;
            } else {
                ranges.push(range_over(start, keyspace_end, &skewed));
            }
        }
        Ok(ranges)
    }
}

fn range_over(start: u64, end: u64, skewed: &[u64]) -> HashRange {
    let flag = skewed.iter().any(|k| *k >= start && *k < end);
    tracing::debug!(start, end, skewed = flag, "assigned key range");
    HashRange::of(start, end, flag)
}

impl RuntimePass<SkewMetric> for DataSkewPass {
    fn event_handler_ids(&self) -> &'static [&'static str] {
        &[DYNAMIC_OPTIMIZATION_HANDLER]
    }

    fn apply(&self, plan: &PhysicalPlan, metric: SkewMetric) -> Result<PhysicalPlan> {
        let reported_edges: HashSet<&str> = metric
            .block_ids
            .iter()
            .filter_map(|block_id| runtime_edge_id_of(block_id))
            .collect();

        let stage_dag = plan.stage_dag();
        let matched: Vec<&StageEdge> = stage_dag
            .vertices()
            .flat_map(|stage| stage_dag.incoming_edges_of(stage.id()))
            .filter(|edge| reported_edges.contains(edge.id()))
            .collect();

        // Every matched edge shares the destination stage; its task count is
        // the number of ranges to hand out.
        let first = matched.first().ok_or(Error::EmptyOptimizationEdges)?;
        let destination = stage_dag.vertex(first.dst()).ok_or_else(|| {
            Error::DynamicOptimization(format!(
                "destination stage {} is not in the plan",
                first.dst()
            ))
        })?;
        let task_count = destination.task_ids().len();

        let ranges = self.calculate_key_ranges(&metric.key_sizes, task_count)?;
        let assignment: BTreeMap<u32, HashRange> = ranges
            .into_iter()
            .enumerate()
            .map(|(task_index, range)| (task_index as u32, range))
            .collect();

        // Ranges computed; only now touch plan state, on a rebuilt copy.
        let matched_ids: HashSet<&str> = matched.iter().map(|e| e.id()).collect();
        let mut rebuilt = DagBuilder::from_dag(stage_dag)?.build()?;
        for edge in rebuilt.edges_mut() {
            if matched_ids.contains(edge.id()) {
                edge.set_task_key_ranges(assignment.clone());
            }
        }
        Ok(PhysicalPlan::new(plan.id(), rebuilt))
    }
}
