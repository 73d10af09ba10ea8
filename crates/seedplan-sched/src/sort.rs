//! Priority-aware topological scheduling.
//!
//! Layered Kahn's algorithm: every round takes all units whose dependencies are
//! already scheduled, orders them by `(execution_priority, declaration index)`
//! and emits them as one level. The declaration index keeps ties stable and
//! makes the next round independent of edge iteration order.

use crate::error::SchedulingIncompleteError;
use crate::plan::{ExecutionPlan, PlanLevel};
use seedplan_core::graph::{DependencyGraph, NodeId};

/// Schedule every node of `graph` and record each node's level on it.
///
/// `graph` is expected to be acyclic. If some nodes never reach in-degree 0
/// the graph is left without levels and the unscheduled names are returned.
pub fn schedule(graph: &mut DependencyGraph) -> Result<ExecutionPlan, SchedulingIncompleteError> {
    let level_ids = layer(graph)?;

    for (level, ids) in level_ids.iter().enumerate() {
        for id in ids {
            if let Some(node) = graph.node_mut(*id) {
                node.set_level(level);
            }
        }
    }

    let levels = level_ids
        .into_iter()
        .enumerate()
        .map(|(level, ids)| PlanLevel {
            level,
            units: ids
                .into_iter()
                .map(|id| graph.nodes()[id].unit().clone())
                .collect(),
        })
        .collect();

    Ok(ExecutionPlan {
        levels,
        edge_count: graph.edge_count(),
        excluded_translation_units: Vec::new(),
    })
}

fn layer(graph: &DependencyGraph) -> Result<Vec<Vec<NodeId>>, SchedulingIncompleteError> {
    let nodes = graph.nodes();
    let sort_key = |id: &NodeId| (nodes[*id].priority(), *id);

    let mut in_degree: Vec<usize> = nodes.iter().map(|n| n.dependencies().len()).collect();
    let mut ready: Vec<NodeId> = (0..nodes.len()).filter(|id| in_degree[*id] == 0).collect();
    ready.sort_by_key(sort_key);

    let mut levels: Vec<Vec<NodeId>> = Vec::new();
    let mut scheduled = 0usize;

    while !ready.is_empty() {
        let mut next = Vec::new();
        for id in &ready {
            for dependent in nodes[*id].dependents() {
                let degree = &mut in_degree[*dependent];
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    next.push(*dependent);
                }
            }
        }

        scheduled += ready.len();
        levels.push(std::mem::take(&mut ready));

        next.sort_by_key(sort_key);
        ready = next;
    }

    if scheduled != nodes.len() {
        let unscheduled = nodes
            .iter()
            .filter(|n| in_degree[n.id()] > 0)
            .map(|n| n.name().to_string())
            .collect();
        return Err(SchedulingIncompleteError { unscheduled });
    }

    tracing::debug!(
        units = scheduled,
        levels = levels.len(),
        "scheduled dependency graph"
    );
    Ok(levels)
}
