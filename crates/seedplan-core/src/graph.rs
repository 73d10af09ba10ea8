//! Dependency graph over generation units.
//!
//! Nodes live in a `Vec` in declaration order and refer to each other by
//! [`NodeId`] (the declaration index). Edge sets are ordered, so iterating a
//! graph never depends on hashing.

use crate::flags::FeatureFlags;
use crate::unit::{GenerationUnit, PlanContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Index of a node in its graph. Equal to the unit's declaration position.
pub type NodeId = usize;

/// Built-in condition: more than one content language is active.
pub const MULTI_LANGUAGE: &str = "multi_language";
/// Built-in condition: business-rule generation is switched on for this run.
pub const BUSINESS_RULES: &str = "business_rules";

/// Why one unit depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Inferred from a relation field between record kinds.
    Structural,
    /// Declared in `explicit_dependencies`.
    Explicit,
    /// Declared in `conditional_dependencies` and active for this context.
    Conditional,
    /// Declared in `business_logic_dependencies`.
    BusinessLogic,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Explicit => "explicit",
            Self::Conditional => "conditional",
            Self::BusinessLogic => "business_logic",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a condition can be resolved against.
#[derive(Clone, Copy)]
pub struct ConditionScope<'a> {
    pub context: &'a PlanContext,
    /// Configured content languages, used when the context carries none.
    pub languages: &'a [String],
    pub flags: &'a dyn FeatureFlags,
}

impl<'a> ConditionScope<'a> {
    pub fn new(
        context: &'a PlanContext,
        languages: &'a [String],
        flags: &'a dyn FeatureFlags,
    ) -> Self {
        Self {
            context,
            languages,
            flags,
        }
    }

    fn multi_language(&self) -> bool {
        if let Some(explicit) = self.context.truthy(MULTI_LANGUAGE) {
            return explicit;
        }
        match self.context.get("languages") {
            Some(Value::Array(langs)) => langs.len() > 1,
            _ => self.languages.len() > 1,
        }
    }

    fn business_rules(&self) -> bool {
        self.context
            .truthy(BUSINESS_RULES)
            .or_else(|| self.context.truthy("business_rules_enabled"))
            .unwrap_or(false)
    }
}

/// One generation unit plus its edges.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    id: NodeId,
    unit: GenerationUnit,
    dependencies: BTreeSet<NodeId>,
    dependents: BTreeSet<NodeId>,
    edge_kinds: BTreeMap<NodeId, BTreeSet<EdgeKind>>,
    level: Option<usize>,
}

impl DependencyNode {
    fn new(id: NodeId, unit: GenerationUnit) -> Self {
        Self {
            id,
            unit,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            edge_kinds: BTreeMap::new(),
            level: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.unit.name
    }

    pub fn unit(&self) -> &GenerationUnit {
        &self.unit
    }

    pub fn priority(&self) -> i32 {
        self.unit.execution_priority
    }

    /// Nodes this node must run after.
    pub fn dependencies(&self) -> &BTreeSet<NodeId> {
        &self.dependencies
    }

    /// Nodes that must run after this node.
    pub fn dependents(&self) -> &BTreeSet<NodeId> {
        &self.dependents
    }

    /// Every kind of edge recorded towards `dependency`.
    pub fn edge_kinds(&self, dependency: NodeId) -> Option<&BTreeSet<EdgeKind>> {
        self.edge_kinds.get(&dependency)
    }

    /// Scheduling level, set by the sorter.
    pub fn level(&self) -> Option<usize> {
        self.level
    }

    pub fn set_level(&mut self, level: usize) {
        self.level = Some(level);
    }

    /// Record that `self` depends on `other` via `kind`.
    ///
    /// Repeating a pair adds the new kind to the pair's kind set; nothing is
    /// overwritten.
    pub fn add_dependency(&mut self, other: &mut DependencyNode, kind: EdgeKind) {
        self.dependencies.insert(other.id);
        other.dependents.insert(self.id);
        self.edge_kinds.entry(other.id).or_default().insert(kind);
    }

    /// Resolve a named condition.
    ///
    /// The built-ins [`MULTI_LANGUAGE`] and [`BUSINESS_RULES`] read the context.
    /// Any other name is read from the context by its exact key, then from the
    /// feature-flag source under its uppercased name. Unresolved is false.
    pub fn evaluate_condition(&self, condition: &str, scope: &ConditionScope<'_>) -> bool {
        match condition {
            MULTI_LANGUAGE => scope.multi_language(),
            BUSINESS_RULES => scope.business_rules(),
            other => scope
                .context
                .truthy(other)
                .or_else(|| scope.flags.flag(&other.to_uppercase()))
                .unwrap_or(false),
        }
    }

    /// Names behind every condition that holds for `scope`, in condition order.
    pub fn conditional_deps_for_context(&self, scope: &ConditionScope<'_>) -> Vec<&str> {
        self.unit
            .conditional_dependencies
            .iter()
            .filter(|(condition, _)| self.evaluate_condition(condition, scope))
            .flat_map(|(_, names)| names.iter().map(String::as_str))
            .collect()
    }
}

/// Nodes for one planning call plus the record-kind index used to infer
/// structural edges.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<DependencyNode>,
    name_index: HashMap<String, NodeId>,
    record_kind_index: BTreeMap<String, String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node for `unit`. Returns `None` if a unit with the same name is
    /// already present.
    ///
    /// The first unit declared for a record kind owns it in the record-kind
    /// index.
    pub fn insert_unit(&mut self, unit: GenerationUnit) -> Option<NodeId> {
        if self.name_index.contains_key(&unit.name) {
            return None;
        }
        let id = self.nodes.len();
        self.name_index.insert(unit.name.clone(), id);
        self.record_kind_index
            .entry(unit.record_kind.clone())
            .or_insert_with(|| unit.name.clone());
        self.nodes.push(DependencyNode::new(id, unit));
        Some(id)
    }

    /// Add an edge `from` depends on `to`. Self-loops are refused.
    ///
    /// Returns whether an edge was recorded.
    pub fn add_dependency(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        if from == to || from >= self.nodes.len() || to >= self.nodes.len() {
            return false;
        }
        let (dependent, dependency) = if from < to {
            let (head, tail) = self.nodes.split_at_mut(to);
            (&mut head[from], &mut tail[0])
        } else {
            let (head, tail) = self.nodes.split_at_mut(from);
            (&mut tail[0], &mut head[to])
        };
        dependent.add_dependency(dependency, kind);
        true
    }

    pub fn nodes(&self) -> &[DependencyNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&DependencyNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DependencyNode> {
        self.nodes.get_mut(id)
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    pub fn node_by_name(&self, name: &str) -> Option<&DependencyNode> {
        self.id_of(name).map(|id| &self.nodes[id])
    }

    /// Node that produces `record_kind`, if any unit in the graph does.
    pub fn owner_of_kind(&self, record_kind: &str) -> Option<NodeId> {
        self.record_kind_index
            .get(record_kind)
            .and_then(|name| self.id_of(name))
    }

    pub fn record_kind_index(&self) -> &BTreeMap<String, String> {
        &self.record_kind_index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Distinct dependency pairs, however many kinds each pair carries.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.dependencies.len()).sum()
    }

    /// Names for a set of node ids, in id order.
    pub fn names_of<'a>(&'a self, ids: impl IntoIterator<Item = &'a NodeId>) -> Vec<&'a str> {
        ids.into_iter()
            .filter_map(|id| self.nodes.get(*id).map(DependencyNode::name))
            .collect()
    }
}
