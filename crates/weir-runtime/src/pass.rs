//! The runtime-pass contract.

use crate::error::Result;
use crate::plan::PhysicalPlan;

/// Handler id the driver wires up for data-skew rebalancing events.
pub const DYNAMIC_OPTIMIZATION_HANDLER: &str = "dynamic-optimization";

/// A pass invoked with live metric data that rewrites physical-plan
/// attributes.
///
/// `apply` never mutates the input plan: the rewritten plan is returned, so
/// a failed invocation leaves the running plan exactly as it was.
pub trait RuntimePass<M> {
    /// Event-handler identifiers the driver must register so this pass
    /// receives its metric messages.
    fn event_handler_ids(&self) -> &'static [&'static str];

    fn apply(&self, plan: &PhysicalPlan, metric: M) -> Result<PhysicalPlan>;
}
