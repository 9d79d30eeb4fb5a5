use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use glam::Vec2;
use kinetica::{BodyDef, World};

/// World with `count` balls raining into a 800x800 box.
fn populated_world(count: usize) -> World {
    let mut world = World::default();
    world.set_edges(Vec2::ZERO, Vec2::new(800.0, 800.0));
    for i in 0..count {
        let x = 20.0 + (i % 60) as f32 * 13.0;
        let y = 20.0 + (i / 60) as f32 * 13.0;
        world.add_body(BodyDef::circle(6.0).with_position(Vec2::new(x, y)));
    }
    world.commit_staged();
    world
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit_staged");
    for &count in &[64usize, 256, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut world = World::default();
                    for i in 0..count {
                        world.add_body(
                            BodyDef::circle(6.0)
                                .with_position(Vec2::new(i as f32 * 15.0, 100.0)),
                        );
                    }
                    world
                },
                |mut world| world.commit_staged(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    group.sample_size(20);
    for &count in &[64usize, 256, 1024] {
        let mut world = populated_world(count);
        // Settle the pile so the measurement is steady-state contact solving.
        for _ in 0..120 {
            world.step();
        }
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| world.step());
        });
    }
    group.finish();
}

fn bench_query_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_point");
    for &count in &[64usize, 1024] {
        let mut world = populated_world(count);
        world.step();
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| world.query_point(Vec2::new(400.0, 400.0), true, 10));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_commit, bench_step, bench_query_point);
criterion_main!(benches);
