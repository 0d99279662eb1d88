use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use coltab_join::{JoinOptions, JoinStrategyKind, JoinType, join};
use coltab_types::{Column, Table};

fn fixture(name: &str, rows: usize, distinct: usize, payload: &str) -> Table {
    let keys = (0..rows).map(|i| Some(i32::try_from(i % distinct).unwrap_or(i32::MAX)));
    let values = (0..rows).map(|i| Some(i as f64 * 0.5));
    Table::create(
        name,
        vec![Column::integers("id", keys), Column::doubles(payload, values)],
    )
    .expect("fixture columns share a length")
}

fn bench_join_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("join_strategies");
    for rows in [1_024_usize, 8_192_usize] {
        let left = fixture("left", rows, rows / 4, "lv");
        let right = fixture("right", rows, rows / 2, "rv");
        group.throughput(Throughput::Elements(u64::try_from(rows).unwrap_or(u64::MAX)));
        for strategy in [JoinStrategyKind::CrossProduct, JoinStrategyKind::SortMerge] {
            for join_type in [JoinType::Inner, JoinType::FullOuter] {
                let options = JoinOptions::new(join_type).with_strategy(strategy);
                let id = format!("{}/{}", strategy.as_str(), join_type.as_str());
                group.bench_with_input(BenchmarkId::new(id, rows), &options, |b, options| {
                    b.iter(|| {
                        let out = join(&left, &right, &["id"], &["id"], options)
                            .expect("join should succeed");
                        criterion::black_box(out.row_count());
                    });
                });
            }
        }
    }
    group.finish();
}

/// Distinct keys on both sides; time per row should stay flat as rows grow.
fn bench_cross_product_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_product_scaling");
    group.sample_size(10);
    for rows in [25_000_usize, 50_000, 100_000, 200_000] {
        let left = fixture("left", rows, rows, "lv");
        let right = fixture("right", rows, rows, "rv");
        group.throughput(Throughput::Elements(u64::try_from(rows).unwrap_or(u64::MAX)));
        let options = JoinOptions::new(JoinType::FullOuter).with_strategy(JoinStrategyKind::CrossProduct);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &options, |b, options| {
            b.iter(|| {
                let out = join(&left, &right, &["id"], &["id"], options)
                    .expect("join should succeed");
                criterion::black_box(out.row_count());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_join_strategies, bench_cross_product_scaling);
criterion_main!(benches);
