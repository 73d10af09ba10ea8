//! Execution plans produced by the scheduler.

use seedplan_core::unit::GenerationUnit;
use serde::{Deserialize, Serialize};

/// Units that became ready together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLevel {
    /// 0 for units with no dependencies.
    pub level: usize,
    /// Units in priority order (ties in declaration order).
    pub units: Vec<GenerationUnit>,
}

/// A dependency-safe execution order, partitioned into levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub levels: Vec<PlanLevel>,
    /// Distinct dependency pairs in the graph the plan was built from.
    pub edge_count: usize,
    /// Translation units left out of scheduling, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_translation_units: Vec<String>,
}

/// Counts describing a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub unit_count: usize,
    pub level_count: usize,
    pub edge_count: usize,
    pub excluded_translation_units: usize,
}

impl ExecutionPlan {
    /// Units in execution order.
    pub fn units(&self) -> impl Iterator<Item = &GenerationUnit> {
        self.levels.iter().flat_map(|l| l.units.iter())
    }

    pub fn into_units(self) -> Vec<GenerationUnit> {
        self.levels.into_iter().flat_map(|l| l.units).collect()
    }

    /// Unit names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.units().map(|u| u.name.as_str()).collect()
    }

    /// Position of a unit in the execution order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.units().position(|u| u.name == name)
    }

    pub fn level_of(&self, name: &str) -> Option<usize> {
        self.levels
            .iter()
            .find(|l| l.units.iter().any(|u| u.name == name))
            .map(|l| l.level)
    }

    pub fn len(&self) -> usize {
        self.levels.iter().map(|l| l.units.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            unit_count: self.len(),
            level_count: self.level_count(),
            edge_count: self.edge_count,
            excluded_translation_units: self.excluded_translation_units.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(level: usize, names: &[&str]) -> PlanLevel {
        PlanLevel {
            level,
            units: names
                .iter()
                .map(|n| GenerationUnit::new(*n, "app.kind"))
                .collect(),
        }
    }

    #[test]
    fn test_plan_accessors() {
        let plan = ExecutionPlan {
            levels: vec![level(0, &["U", "X"]), level(1, &["V", "W"])],
            edge_count: 2,
            excluded_translation_units: vec!["UTranslation".to_string()],
        };

        assert_eq!(plan.names(), vec!["U", "X", "V", "W"]);
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.position("V"), Some(2));
        assert_eq!(plan.level_of("W"), Some(1));
        assert_eq!(plan.level_of("missing"), None);
        assert_eq!(
            plan.summary(),
            PlanSummary {
                unit_count: 4,
                level_count: 2,
                edge_count: 2,
                excluded_translation_units: 1,
            }
        );
        assert_eq!(plan.into_units().len(), 4);
    }

    #[test]
    fn test_empty_plan() {
        let plan = ExecutionPlan::default();
        assert!(plan.is_empty());
        assert_eq!(plan.level_count(), 0);
    }
}
