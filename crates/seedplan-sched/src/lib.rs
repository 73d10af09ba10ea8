//! # seedplan-sched
//!
//! Dependency-ordered planning for generation units.
//!
//! Given a list of [`GenerationUnit`]s and a [`PlanContext`], the
//! [`Orchestrator`] builds a [`DependencyGraph`], rejects it if it contains a
//! cycle, and otherwise produces a leveled, priority-ordered [`ExecutionPlan`]:
//!
//! 1. **Graph building** ([`builder`]): structural edges from relation
//!    metadata, plus explicit, conditional and business-logic edges.
//! 2. **Cycle detection** ([`cycles`]): iterative DFS, first cycle wins.
//! 3. **Scheduling** ([`sort`]): layered Kahn's algorithm with priority
//!    tie-breaks.
//! 4. **Reporting** ([`report`]): human-readable plan diagnostics.
//!
//! [`GenerationUnit`]: seedplan_core::unit::GenerationUnit
//! [`PlanContext`]: seedplan_core::unit::PlanContext
//! [`DependencyGraph`]: seedplan_core::graph::DependencyGraph

pub mod builder;
pub mod cycles;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod report;
pub mod sort;

pub use builder::GraphBuilder;
pub use cycles::{Cycle, find_cycle};
pub use error::{CycleDetectionError, PlanError, SchedulingIncompleteError};
pub use orchestrator::Orchestrator;
pub use plan::{ExecutionPlan, PlanLevel, PlanSummary};
pub use sort::schedule;
