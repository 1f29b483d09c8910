use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shard_recover::solver::{Dinic, EdmondsKarp};
use shard_recover::table::{canonical_table, CanonicalTable};
use shard_recover::validator::validate;

fn bench_build_table(c: &mut Criterion) {
    c.bench_function("build_table_edmonds_karp", |b| {
        b.iter(|| CanonicalTable::build(black_box(6), &EdmondsKarp))
    });
    c.bench_function("build_table_dinic", |b| {
        b.iter(|| CanonicalTable::build(black_box(6), &Dinic))
    });
}

fn bench_distribute(c: &mut Criterion) {
    c.bench_function("distribute", |b| {
        let table = canonical_table().unwrap();
        let active = [1u8, 2, 4, 5];
        b.iter(|| table.distribute(black_box(&active), black_box(6)))
    });
}

fn bench_validate(c: &mut Criterion) {
    c.bench_function("validate", |b| {
        let table = canonical_table().unwrap();
        b.iter(|| validate(black_box(table)))
    });
}

criterion_group!(benches, bench_build_table, bench_distribute, bench_validate);
criterion_main!(benches);
