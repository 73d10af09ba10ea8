//! Planning errors.
//!
//! A cycle found by the detector and an incomplete schedule found by the
//! sorter are separate types: the second also fires for sorter or builder
//! bugs where no real cycle exists.

use crate::cycles::Cycle;
use seedplan_core::relations::IntrospectionError;

/// The dependency graph contains a cycle, so no valid order exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("dependency cycle detected: {cycle}")]
pub struct CycleDetectionError {
    pub cycle: Cycle,
}

/// The sorter finished with units that never became ready.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "scheduling incomplete: {} unit(s) never became ready: {}",
    .unscheduled.len(),
    .unscheduled.join(", ")
)]
pub struct SchedulingIncompleteError {
    /// Names of the unscheduled units, in declaration order.
    pub unscheduled: Vec<String>,
}

/// Errors from [`Orchestrator::plan`](crate::Orchestrator::plan).
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Cycle(#[from] CycleDetectionError),
    #[error(transparent)]
    SchedulingIncomplete(#[from] SchedulingIncompleteError),
    #[error("relation metadata for unit `{unit}` ({record_kind}): {source}")]
    Introspection {
        unit: String,
        record_kind: String,
        #[source]
        source: IntrospectionError,
    },
    #[error("duplicate generation unit `{0}`")]
    DuplicateUnit(String),
}

impl PlanError {
    /// The cycle, when this error is a detected cycle.
    pub fn cycle(&self) -> Option<&Cycle> {
        match self {
            Self::Cycle(err) => Some(&err.cycle),
            _ => None,
        }
    }
}
