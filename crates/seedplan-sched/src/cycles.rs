//! Dependency cycle detection.
//!
//! Depth-first search over dependency edges with an explicit stack, so graph
//! depth is bounded by heap rather than by the call stack. Roots are tried in
//! declaration order and neighbours in id order, which makes the reported
//! cycle deterministic.

use seedplan_core::graph::{DependencyGraph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::fmt;

/// A closed dependency path: the first and last names are the same unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    path: Vec<String>,
}

impl Cycle {
    /// Wrap a closed path. The caller guarantees `first == last`.
    pub fn new(path: Vec<String>) -> Self {
        debug_assert!(path.len() >= 2 && path.first() == path.last());
        Self { path }
    }

    /// Full path including the closing repeat.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Distinct units on the cycle, without the closing repeat.
    pub fn members(&self) -> &[String] {
        &self.path[..self.path.len().saturating_sub(1)]
    }

    /// Number of distinct units on the cycle.
    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members().iter().any(|n| n == name)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path.join(" → "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    /// On the current DFS path, at this stack depth.
    OnStack(usize),
    Done,
}

/// Find the first dependency cycle in `graph`, or `None` if it is acyclic.
///
/// Every component is visited. The returned cycle runs from the first node
/// seen twice, through the current path, back to that node.
pub fn find_cycle(graph: &DependencyGraph) -> Option<Cycle> {
    let nodes = graph.nodes();
    let mut state = vec![VisitState::Unvisited; nodes.len()];
    let mut stack: Vec<(NodeId, btree_set::Iter<'_, NodeId>)> = Vec::new();

    for root in 0..nodes.len() {
        if state[root] != VisitState::Unvisited {
            continue;
        }
        state[root] = VisitState::OnStack(0);
        stack.push((root, nodes[root].dependencies().iter()));

        while let Some((node, neighbours)) = stack.last_mut() {
            let node = *node;
            match neighbours.next().copied() {
                Some(next) => match state[next] {
                    VisitState::Unvisited => {
                        state[next] = VisitState::OnStack(stack.len());
                        stack.push((next, nodes[next].dependencies().iter()));
                    }
                    VisitState::OnStack(depth) => {
                        let mut path: Vec<String> = stack[depth..]
                            .iter()
                            .map(|(id, _)| nodes[*id].name().to_string())
                            .collect();
                        path.push(nodes[next].name().to_string());
                        return Some(Cycle::new(path));
                    }
                    VisitState::Done => {}
                },
                None => {
                    state[node] = VisitState::Done;
                    stack.pop();
                }
            }
        }
    }

    None
}
