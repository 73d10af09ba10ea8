use criterion::{Criterion, criterion_group, criterion_main};
use seedplan_core::config::PlanningConfig;
use seedplan_core::relations::{CachedRelations, RecordCatalog, RelationField};
use seedplan_core::unit::{GenerationUnit, PlanContext};
use seedplan_sched::{Orchestrator, find_cycle};
use std::hint::black_box;
use std::sync::Arc;

/// `width` units per layer, each pointing at two units of the previous layer.
fn build_units(layers: usize, width: usize) -> (Vec<GenerationUnit>, RecordCatalog) {
    let mut units = Vec::with_capacity(layers * width);
    let mut catalog = RecordCatalog::new();

    for layer in 0..layers {
        for i in 0..width {
            let kind = format!("app.l{layer}_u{i}");
            let mut unit = GenerationUnit::new(format!("L{layer}U{i}"), kind.clone())
                .with_priority((i % 7) as i32);
            catalog = catalog.with_kind(kind.clone());
            if layer > 0 {
                catalog.insert_relation(
                    kind.clone(),
                    RelationField::new("parent", format!("app.l{}_u{}", layer - 1, i)),
                );
                unit = unit.depends_on(format!("L{}U{}", layer - 1, (i + 1) % width));
            }
            units.push(unit);
        }
    }
    (units, catalog)
}

fn bench_plan_1000(c: &mut Criterion) {
    let (units, catalog) = build_units(20, 50);
    let orchestrator = Orchestrator::new(
        PlanningConfig::default(),
        Arc::new(CachedRelations::new(catalog)),
    );
    let ctx = PlanContext::new();

    c.bench_function("plan_1000_units", |b| {
        b.iter(|| orchestrator.plan(black_box(&units), &ctx).unwrap())
    });
}

fn bench_find_cycle_1000(c: &mut Criterion) {
    let (units, catalog) = build_units(20, 50);
    let orchestrator = Orchestrator::new(PlanningConfig::default(), Arc::new(catalog));
    let graph = orchestrator.build_graph(&units, &PlanContext::new()).unwrap();

    c.bench_function("find_cycle_1000_units", |b| {
        b.iter(|| find_cycle(black_box(&graph)))
    });
}

criterion_group!(benches, bench_plan_1000, bench_find_cycle_1000);
criterion_main!(benches);
