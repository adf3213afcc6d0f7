use criterion::{criterion_group, criterion_main, Criterion};
use pbd2d::{Scene, SimConfig, Simulation};

fn bench_granular_tick(c: &mut Criterion) {
    let mut sim = Simulation::new(SimConfig::default());
    sim.init(Scene::Granular).unwrap();
    c.bench_function("granular_tick", |b| b.iter(|| sim.tick(1.0 / 60.0)));
}

fn bench_fluid_tick(c: &mut Criterion) {
    let mut sim = Simulation::new(SimConfig::default());
    sim.init(Scene::Fluid).unwrap();
    c.bench_function("fluid_tick", |b| b.iter(|| sim.tick(1.0 / 60.0)));
}

criterion_group!(benches, bench_granular_tick, bench_fluid_tick);
criterion_main!(benches);
