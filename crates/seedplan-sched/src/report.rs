//! Human-readable plan diagnostics. Meant for logs and terminals, not parsing.

use crate::error::PlanError;
use crate::plan::ExecutionPlan;
use seedplan_core::graph::{DependencyGraph, DependencyNode, EdgeKind};

/// Render a plan level by level, then summary statistics.
///
/// `graph` must be the graph `plan` was scheduled from.
pub fn render(graph: &DependencyGraph, plan: &ExecutionPlan) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Generation plan: {} unit(s) in {} level(s)\n",
        plan.len(),
        plan.level_count()
    ));

    for level in &plan.levels {
        out.push_str(&format!("\nLevel {}\n", level.level));
        for unit in &level.units {
            let Some(node) = graph.node_by_name(&unit.name) else {
                continue;
            };
            out.push_str(&format!(
                "  {} [priority {}]\n",
                unit.name, unit.execution_priority
            ));
            out.push_str(&format!("    depends on: {}\n", dependency_line(graph, node)));
            out.push_str(&format!(
                "    flags: locale_aware={}, business_rules_enabled={}\n",
                yes_no(unit.locale_aware),
                yes_no(unit.business_rules_enabled)
            ));
        }
    }

    let summary = plan.summary();
    out.push_str("\nSummary\n");
    out.push_str(&format!("  units:  {}\n", summary.unit_count));
    out.push_str(&format!("  levels: {}\n", summary.level_count));
    out.push_str(&format!("  edges:  {}\n", summary.edge_count));
    if !plan.excluded_translation_units.is_empty() {
        out.push_str(&format!(
            "  excluded translation units: {}\n",
            plan.excluded_translation_units.join(", ")
        ));
    }
    out
}

/// Render why planning failed.
pub fn render_failure(err: &PlanError) -> String {
    match err {
        PlanError::Cycle(cycle_err) => format!(
            "Generation plan: FAILED\n\nDependency cycle ({} units):\n  {}\n",
            cycle_err.cycle.len(),
            cycle_err.cycle
        ),
        PlanError::SchedulingIncomplete(incomplete) => format!(
            "Generation plan: FAILED\n\nUnits never scheduled:\n  {}\n",
            incomplete.unscheduled.join(", ")
        ),
        other => format!("Generation plan: FAILED\n\n{other}\n"),
    }
}

fn dependency_line(graph: &DependencyGraph, node: &DependencyNode) -> String {
    if node.dependencies().is_empty() {
        return "none".to_string();
    }
    node.dependencies()
        .iter()
        .filter_map(|dep| {
            let name = graph.node(*dep)?.name();
            let kinds: Vec<&str> = node
                .edge_kinds(*dep)
                .map(|kinds| kinds.iter().map(|k| EdgeKind::as_str(*k)).collect())
                .unwrap_or_default();
            Some(format!("{name} ({})", kinds.join("+")))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
