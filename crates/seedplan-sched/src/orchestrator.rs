//! Planning facade: build → detect cycles → schedule.

use crate::builder::GraphBuilder;
use crate::cycles::{Cycle, find_cycle};
use crate::error::{CycleDetectionError, PlanError};
use crate::plan::ExecutionPlan;
use crate::report;
use crate::sort::schedule;
use seedplan_core::config::{PlanningConfig, SeedplanConfig};
use seedplan_core::flags::{FeatureFlags, NoFlags};
use seedplan_core::graph::DependencyGraph;
use seedplan_core::relations::RelationSource;
use seedplan_core::translation::TranslationPredicate;
use seedplan_core::unit::{GenerationUnit, PlanContext};
use std::sync::Arc;
use tracing::{info, warn};

/// Plans generation units against injected collaborators.
///
/// Holds no per-call state, so one instance can serve concurrent callers.
#[derive(Clone)]
pub struct Orchestrator {
    planning: PlanningConfig,
    relations: Arc<dyn RelationSource>,
    flags: Arc<dyn FeatureFlags>,
    translation: Arc<dyn TranslationPredicate>,
}

impl Orchestrator {
    /// Orchestrator with no feature flags and the configured translation suffixes.
    pub fn new(planning: PlanningConfig, relations: Arc<dyn RelationSource>) -> Self {
        let translation = Arc::new(planning.translation_predicate());
        Self {
            planning,
            relations,
            flags: Arc::new(NoFlags),
            translation,
        }
    }

    /// Orchestrator wired from a loaded config, including its `[flags]` table.
    pub fn from_config(config: &SeedplanConfig, relations: Arc<dyn RelationSource>) -> Self {
        Self::new(config.planning.clone(), relations).with_flags(Arc::new(config.feature_flags()))
    }

    #[must_use]
    pub fn with_flags(mut self, flags: Arc<dyn FeatureFlags>) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_translation_predicate(mut self, translation: Arc<dyn TranslationPredicate>) -> Self {
        self.translation = translation;
        self
    }

    pub fn planning(&self) -> &PlanningConfig {
        &self.planning
    }

    fn builder(&self) -> GraphBuilder<'_> {
        GraphBuilder::new(
            &self.planning,
            self.relations.as_ref(),
            self.flags.as_ref(),
            self.translation.as_ref(),
        )
    }

    /// Build the dependency graph without checking or sorting it.
    pub fn build_graph(
        &self,
        units: &[GenerationUnit],
        context: &PlanContext,
    ) -> Result<DependencyGraph, PlanError> {
        self.builder().build(units, context)
    }

    /// Build the graph and report its first cycle, if any.
    pub fn detect_cycle(
        &self,
        units: &[GenerationUnit],
        context: &PlanContext,
    ) -> Result<Option<Cycle>, PlanError> {
        let graph = self.build_graph(units, context)?;
        Ok(find_cycle(&graph))
    }

    /// Compute a dependency-safe execution order.
    ///
    /// Strict: a cycle, an incomplete schedule, or bad relation metadata is
    /// returned as an error, never papered over.
    pub fn plan(
        &self,
        units: &[GenerationUnit],
        context: &PlanContext,
    ) -> Result<ExecutionPlan, PlanError> {
        self.plan_with_graph(units, context).map(|(_, plan)| plan)
    }

    fn plan_with_graph(
        &self,
        units: &[GenerationUnit],
        context: &PlanContext,
    ) -> Result<(DependencyGraph, ExecutionPlan), PlanError> {
        let builder = self.builder();
        let mut graph = builder.build(units, context)?;

        if let Some(cycle) = find_cycle(&graph) {
            return Err(CycleDetectionError { cycle }.into());
        }

        let mut plan = schedule(&mut graph)?;
        plan.excluded_translation_units = builder.excluded_units(units);

        info!(
            units = plan.len(),
            levels = plan.level_count(),
            edges = plan.edge_count,
            excluded = plan.excluded_translation_units.len(),
            "planned generation order"
        );
        Ok((graph, plan))
    }

    /// Best-effort order: the planned order, or on any failure the input
    /// unchanged.
    ///
    /// The fallback carries no dependency guarantee. Callers that need one
    /// must use [`plan`](Self::plan) and handle the error.
    pub fn safe_plan(&self, units: &[GenerationUnit], context: &PlanContext) -> Vec<GenerationUnit> {
        match self.plan(units, context) {
            Ok(plan) => plan.into_units(),
            Err(err) => {
                warn!(error = %err, "planning failed, falling back to declaration order");
                units.to_vec()
            }
        }
    }

    /// Human-readable diagnostic of the plan, or of why planning failed.
    pub fn report(&self, units: &[GenerationUnit], context: &PlanContext) -> String {
        match self.plan_with_graph(units, context) {
            Ok((graph, plan)) => report::render(&graph, &plan),
            Err(err) => report::render_failure(&err),
        }
    }
}
