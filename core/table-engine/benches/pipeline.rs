//! FILENAME: core/table-engine/benches/pipeline.rs
//! Full pipeline over a synthetic sales dataset.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use table_engine::{
    calculate_view, AggregateKind, ColumnDef, ColumnRegistry, FilterKind, FilterValue, GroupState,
    Row, SortKey, SortState, TableOptions, TableState, Value,
};

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const PRODUCTS: [&str; 6] = ["Widget", "Gadget", "Doohickey", "Sprocket", "Gizmo", "Thingamajig"];

fn build_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            Row::from_pairs(
                i,
                [
                    ("region", Value::from(REGIONS[i % REGIONS.len()])),
                    ("product", Value::from(PRODUCTS[(i / 7) % PRODUCTS.len()])),
                    ("customer", Value::from(format!("Customer {}", i % 997))),
                    ("amount", Value::from(((i * 37) % 1000) as f64)),
                ],
            )
        })
        .collect()
}

fn registry() -> ColumnRegistry {
    ColumnRegistry::new(vec![
        ColumnDef::new("region", "Region")
            .with_filter(FilterKind::ExactSelect)
            .groupable(),
        ColumnDef::new("product", "Product")
            .with_filter(FilterKind::ExactSelect)
            .groupable(),
        ColumnDef::new("customer", "Customer").with_filter(FilterKind::Fuzzy),
        ColumnDef::new("amount", "Amount")
            .with_filter(FilterKind::NumericRange)
            .with_aggregate(AggregateKind::RangeMidpoint),
    ])
    .unwrap()
}

fn bench_pipeline(c: &mut Criterion) {
    let registry = registry();
    let options = TableOptions::default();

    let mut grouped = TableState {
        group_by: GroupState::new(vec!["region".to_string(), "product".to_string()]),
        sort_by: SortState::new(vec![SortKey::desc("amount")]),
        ..TableState::default()
    };
    grouped.filters.set("amount", FilterValue::range(Some(100.0), Some(900.0)));

    let mut searched = TableState {
        sort_by: SortState::new(vec![SortKey::asc("customer")]),
        ..TableState::default()
    };
    searched.filters.set_global(Some("cust 12".to_string()));

    let mut group = c.benchmark_group("pipeline");
    for size in [1_000usize, 10_000, 100_000] {
        let rows = build_rows(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("grouped_sorted", size), &rows, |b, rows| {
            b.iter(|| calculate_view(black_box(rows), &registry, &options, &grouped).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("global_search", size), &rows, |b, rows| {
            b.iter(|| calculate_view(black_box(rows), &registry, &options, &searched).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
