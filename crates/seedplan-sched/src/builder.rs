//! Dependency graph construction.
//!
//! Edges are added in four passes: structural (inferred from relation
//! metadata), explicit, conditional, then business-logic. A pair connected by
//! more than one pass keeps every kind it was given.

use crate::error::PlanError;
use seedplan_core::config::PlanningConfig;
use seedplan_core::flags::FeatureFlags;
use seedplan_core::graph::{ConditionScope, DependencyGraph, EdgeKind, NodeId};
use seedplan_core::relations::{RelationSource, owning_domain};
use seedplan_core::translation::TranslationPredicate;
use seedplan_core::unit::{GenerationUnit, PlanContext};
use std::collections::BTreeSet;
use tracing::debug;

/// Builds a fully-edged [`DependencyGraph`] for one planning call.
pub struct GraphBuilder<'a> {
    planning: &'a PlanningConfig,
    relations: &'a dyn RelationSource,
    flags: &'a dyn FeatureFlags,
    translation: &'a dyn TranslationPredicate,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        planning: &'a PlanningConfig,
        relations: &'a dyn RelationSource,
        flags: &'a dyn FeatureFlags,
        translation: &'a dyn TranslationPredicate,
    ) -> Self {
        Self {
            planning,
            relations,
            flags,
            translation,
        }
    }

    /// Names of the units that will be left out as translation units.
    pub fn excluded_units(&self, units: &[GenerationUnit]) -> Vec<String> {
        units
            .iter()
            .filter(|u| self.translation.is_translation_unit(u))
            .map(|u| u.name.clone())
            .collect()
    }

    pub fn build(
        &self,
        units: &[GenerationUnit],
        context: &PlanContext,
    ) -> Result<DependencyGraph, PlanError> {
        let mut graph = DependencyGraph::new();
        for unit in units {
            if self.translation.is_translation_unit(unit) {
                debug!(unit = %unit.name, "skipping translation unit");
                continue;
            }
            if graph.insert_unit(unit.clone()).is_none() {
                return Err(PlanError::DuplicateUnit(unit.name.clone()));
            }
        }

        let structural = self.structural_edges(&graph)?;
        apply(&mut graph, structural, EdgeKind::Structural);

        let explicit = declared_edges(&graph, |unit| {
            unit.explicit_dependencies.iter().map(String::as_str).collect()
        });
        apply(&mut graph, explicit, EdgeKind::Explicit);

        let scope = ConditionScope::new(context, &self.planning.languages, self.flags);
        let conditional: Vec<(NodeId, NodeId)> = graph
            .nodes()
            .iter()
            .flat_map(|node| {
                resolve_names(&graph, node.id(), node.conditional_deps_for_context(&scope))
            })
            .collect();
        apply(&mut graph, conditional, EdgeKind::Conditional);

        let business = declared_edges(&graph, |unit| {
            unit.business_logic_dependencies
                .iter()
                .map(String::as_str)
                .collect()
        });
        apply(&mut graph, business, EdgeKind::BusinessLogic);

        debug!(
            units = graph.len(),
            edges = graph.edge_count(),
            "built dependency graph"
        );
        Ok(graph)
    }

    fn structural_edges(&self, graph: &DependencyGraph) -> Result<Vec<(NodeId, NodeId)>, PlanError> {
        let reserved_kinds: BTreeSet<&str> = self
            .planning
            .reserved_record_kinds
            .iter()
            .map(String::as_str)
            .collect();
        let reserved_domains: BTreeSet<&str> = self
            .planning
            .reserved_domains
            .iter()
            .map(String::as_str)
            .collect();

        let mut edges = Vec::new();
        for node in graph.nodes() {
            let unit = node.unit();
            let fields = self.relations.relations_of(&unit.record_kind).map_err(|source| {
                PlanError::Introspection {
                    unit: unit.name.clone(),
                    record_kind: unit.record_kind.clone(),
                    source,
                }
            })?;

            for field in fields {
                let target_kind = field.target_record_kind.as_str();
                let Some(target) = graph.owner_of_kind(target_kind) else {
                    debug!(unit = %unit.name, field = %field.field_name, target = target_kind, "relation target not generated, ignoring");
                    continue;
                };
                if target == node.id() {
                    continue;
                }
                if field.is_optional_with_default() {
                    debug!(unit = %unit.name, field = %field.field_name, "optional relation with default, no edge");
                    continue;
                }
                if reserved_kinds.contains(target_kind)
                    || owning_domain(target_kind).is_some_and(|d| reserved_domains.contains(d))
                {
                    debug!(unit = %unit.name, field = %field.field_name, target = target_kind, "platform-reserved target, no edge");
                    continue;
                }
                edges.push((node.id(), target));
            }
        }
        Ok(edges)
    }
}

fn declared_edges<F>(graph: &DependencyGraph, names_of: F) -> Vec<(NodeId, NodeId)>
where
    F: Fn(&GenerationUnit) -> Vec<&str>,
{
    graph
        .nodes()
        .iter()
        .flat_map(|node| resolve_names(graph, node.id(), names_of(node.unit())))
        .collect()
}

/// Map dependency names to node ids, dropping names with no node.
fn resolve_names(graph: &DependencyGraph, from: NodeId, names: Vec<&str>) -> Vec<(NodeId, NodeId)> {
    names
        .into_iter()
        .filter_map(|name| match graph.id_of(name) {
            Some(to) => Some((from, to)),
            None => {
                debug!(unit = graph.nodes()[from].name(), dependency = name, "unknown dependency, ignoring");
                None
            }
        })
        .collect()
}

fn apply(graph: &mut DependencyGraph, edges: Vec<(NodeId, NodeId)>, kind: EdgeKind) {
    for (from, to) in edges {
        graph.add_dependency(from, to, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedplan_core::flags::{NoFlags, StaticFlags};
    use seedplan_core::relations::{RecordCatalog, RelationField};
    use seedplan_core::translation::SuffixPredicate;

    fn build_with(
        catalog: &RecordCatalog,
        flags: &dyn FeatureFlags,
        units: &[GenerationUnit],
        context: &PlanContext,
    ) -> Result<DependencyGraph, PlanError> {
        let planning = PlanningConfig::default();
        let translation = SuffixPredicate::default();
        GraphBuilder::new(&planning, catalog, flags, &translation).build(units, context)
    }

    fn kinds(graph: &DependencyGraph, from: &str, to: &str) -> Vec<EdgeKind> {
        let to_id = graph.id_of(to).unwrap();
        graph
            .node_by_name(from)
            .unwrap()
            .edge_kinds(to_id)
            .map(|k| k.iter().copied().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_structural_edge_from_relation() {
        let catalog = RecordCatalog::new()
            .with_kind("shop.customer")
            .with_relation("shop.order", RelationField::new("customer", "shop.customer"));
        let units = [
            GenerationUnit::new("Customer", "shop.customer"),
            GenerationUnit::new("Order", "shop.order"),
        ];
        let graph = build_with(&catalog, &NoFlags, &units, &PlanContext::new()).unwrap();
        assert_eq!(kinds(&graph, "Order", "Customer"), vec![EdgeKind::Structural]);
    }

    #[test]
    fn test_skip_rules() {
        let catalog = RecordCatalog::new()
            .with_kind("shop.customer")
            .with_kind("auth.user")
            .with_kind("sessions.session")
            .with_relation(
                "shop.order",
                RelationField::new("referrer", "shop.customer").optional_with_default(),
            )
            .with_relation("shop.order", RelationField::new("owner", "auth.user"))
            .with_relation("shop.order", RelationField::new("session", "sessions.session"));
        let units = [
            GenerationUnit::new("Customer", "shop.customer"),
            GenerationUnit::new("User", "auth.user"),
            GenerationUnit::new("Session", "sessions.session"),
            GenerationUnit::new("Order", "shop.order"),
        ];
        let graph = build_with(&catalog, &NoFlags, &units, &PlanContext::new()).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_nullable_without_default_still_orders() {
        let catalog = RecordCatalog::new()
            .with_kind("shop.customer")
            .with_relation("shop.order", RelationField::new("referrer", "shop.customer").nullable());
        let units = [
            GenerationUnit::new("Customer", "shop.customer"),
            GenerationUnit::new("Order", "shop.order"),
        ];
        let graph = build_with(&catalog, &NoFlags, &units, &PlanContext::new()).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_self_and_dangling_relations_ignored() {
        let catalog = RecordCatalog::new().with_relation(
            "blog.category",
            RelationField::new("parent", "blog.category"),
        )
        .with_relation("blog.category", RelationField::new("site", "cms.site"));
        let units = [GenerationUnit::new("Category", "blog.category")];
        let graph = build_with(&catalog, &NoFlags, &units, &PlanContext::new()).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_declared_edges_and_kind_sets() {
        let catalog = RecordCatalog::new()
            .with_kind("shop.customer")
            .with_kind("shop.warehouse")
            .with_relation("shop.order", RelationField::new("customer", "shop.customer"));
        let units = [
            GenerationUnit::new("Customer", "shop.customer"),
            GenerationUnit::new("Warehouse", "shop.warehouse"),
            GenerationUnit::new("Order", "shop.order")
                .depends_on("Customer")
                .depends_on("Ghost")
                .requires_for_rules("Warehouse")
                .depends_on_when("enable_stock", "Warehouse"),
        ];
        let ctx = PlanContext::new().with("enable_stock", true);
        let graph = build_with(&catalog, &NoFlags, &units, &ctx).unwrap();

        assert_eq!(
            kinds(&graph, "Order", "Customer"),
            vec![EdgeKind::Structural, EdgeKind::Explicit]
        );
        assert_eq!(
            kinds(&graph, "Order", "Warehouse"),
            vec![EdgeKind::Conditional, EdgeKind::BusinessLogic]
        );
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_conditional_edge_from_feature_flag() {
        let catalog = RecordCatalog::new().with_kind("shop.coupon").with_kind("shop.order");
        let units = [
            GenerationUnit::new("Coupon", "shop.coupon"),
            GenerationUnit::new("Order", "shop.order").depends_on_when("enable_coupons", "Coupon"),
        ];
        let flags = StaticFlags::new().with("enable_coupons", true);

        let on = build_with(&catalog, &flags, &units, &PlanContext::new()).unwrap();
        assert_eq!(kinds(&on, "Order", "Coupon"), vec![EdgeKind::Conditional]);

        let off = build_with(&catalog, &NoFlags, &units, &PlanContext::new()).unwrap();
        assert_eq!(off.edge_count(), 0);
    }

    #[test]
    fn test_translation_units_excluded() {
        let catalog = RecordCatalog::new()
            .with_kind("blog.post")
            .with_relation("blog.post_translation", RelationField::new("master", "blog.post"));
        let units = [
            GenerationUnit::new("Post", "blog.post"),
            GenerationUnit::new("PostTranslation", "blog.post_translation"),
        ];
        let graph = build_with(&catalog, &NoFlags, &units, &PlanContext::new()).unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.node_by_name("PostTranslation").is_none());
    }

    #[test]
    fn test_duplicate_unit_rejected() {
        let catalog = RecordCatalog::new().with_kind("shop.order");
        let units = [
            GenerationUnit::new("Order", "shop.order"),
            GenerationUnit::new("Order", "shop.order"),
        ];
        let err = build_with(&catalog, &NoFlags, &units, &PlanContext::new()).unwrap_err();
        assert!(matches!(err, PlanError::DuplicateUnit(name) if name == "Order"));
    }

    #[test]
    fn test_unknown_record_kind_is_an_error() {
        let units = [GenerationUnit::new("Order", "shop.order")];
        let err = build_with(&RecordCatalog::new(), &NoFlags, &units, &PlanContext::new()).unwrap_err();
        assert!(matches!(err, PlanError::Introspection { ref unit, .. } if unit == "Order"));
    }
}
