//! # Entity Storage Benchmark
//!
//! Frame-loop operations on a loaded manager. None of the measured loops
//! allocate: every table lives in the arena reserved up front.
//!
//! Run with: `cargo bench --package hearth_core`

// Benchmarks don't need docs and component fields are only written
#![allow(missing_docs)]
#![allow(dead_code)]

use bytemuck::{Pod, Zeroable};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hearth_core::{
    Arena, Component, ComponentId, ComponentRegistry, ComponentTypeInfo, EntityHandle,
    EntityManager, Signature,
};
use hearth_shared::Vec2;

/// Entity slots in the benchmark manager.
const ENTITY_COUNT: usize = 100_000;

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct Velocity {
    x: f32,
    y: f32,
}

impl Component for Velocity {
    const ID: ComponentId = 0;
}

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct Health {
    current: i32,
    max: i32,
}

impl Component for Health {
    const ID: ComponentId = 1;

    fn init_defaults(&mut self) {
        self.current = 100;
        self.max = 100;
    }
}

fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry
        .load(2, |id| match id {
            Velocity::ID => ComponentTypeInfo::of::<Velocity>(),
            _ => ComponentTypeInfo::of::<Health>(),
        })
        .expect("registry loads");
    registry
}

fn arena_for(registry: &ComponentRegistry, count: usize) -> Arena {
    let bytes = EntityManager::arena_bytes_needed(registry, count, |_, _| {})
        .expect("registry is loaded");
    Arena::new(bytes)
}

/// Benchmark: Carve a manager out of a reused arena.
fn bench_load(c: &mut Criterion) {
    let registry = registry();
    let mut arena = arena_for(&registry, ENTITY_COUNT);
    let mut bump = arena.allocator();

    c.bench_function("load_100k", |b| {
        b.iter(|| {
            let mut scope = bump.scope();
            let manager = EntityManager::load(&mut scope, &registry, ENTITY_COUNT, |_, _| {})
                .expect("arena sized for load");
            black_box(manager.entity_capacity())
        });
    });
}

/// Benchmark: Fill the table then destroy everything.
fn bench_spawn_destroy(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("spawn_destroy");

    for count in [1_000, 10_000, ENTITY_COUNT] {
        let mut arena = arena_for(&registry, count);
        let mut bump = arena.allocator();
        let mut manager =
            EntityManager::load(&mut bump, &registry, count, |_, _| {}).expect("arena sized");
        let mut handles = vec![EntityHandle::NULL; count];

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                for (i, handle) in handles.iter_mut().enumerate() {
                    *handle = manager
                        .spawn(Vec2::splat(i as f32))
                        .expect("table has room");
                }
                for handle in &handles {
                    manager.destroy(*handle).expect("handle is live");
                }
                black_box(manager.alive_count())
            });
        });
    }

    group.finish();
}

/// Benchmark: Attach two components to every entity, then destroy.
fn bench_attach(c: &mut Criterion) {
    let registry = registry();
    let mut arena = arena_for(&registry, ENTITY_COUNT);
    let mut bump = arena.allocator();
    let mut manager =
        EntityManager::load(&mut bump, &registry, ENTITY_COUNT, |_, _| {}).expect("arena sized");

    c.bench_function("attach_100k", |b| {
        b.iter(|| {
            for _ in 0..ENTITY_COUNT {
                let entity = manager.spawn(Vec2::ZERO).expect("table has room");
                manager.add_component::<Velocity>(entity).expect("pool has room");
                manager.add_component::<Health>(entity).expect("pool has room");
            }
            black_box(manager.component_count(Health::ID).ok());
            manager.clear();
        });
    });
}

/// Benchmark: Integrate velocities through trusted access.
fn bench_velocity_pass(c: &mut Criterion) {
    let registry = registry();
    let mut arena = arena_for(&registry, ENTITY_COUNT);
    let mut bump = arena.allocator();
    let mut manager =
        EntityManager::load(&mut bump, &registry, ENTITY_COUNT, |_, _| {}).expect("arena sized");

    for i in 0..ENTITY_COUNT {
        let entity = manager.spawn(Vec2::ZERO).expect("table has room");
        if i % 2 == 0 {
            let velocity = manager.add_component::<Velocity>(entity).expect("pool has room");
            velocity.x = 1.0;
            velocity.y = 0.5;
        }
    }

    let mut out = vec![EntityHandle::NULL; ENTITY_COUNT];
    let required = Signature::of::<Velocity>();

    c.bench_function("velocity_pass_50k", |b| {
        b.iter(|| {
            let moving = manager.query_by_signature(required, &mut out);
            for &entity in moving.iter() {
                let velocity = *manager.component_trusted::<Velocity>(entity);
                let position = manager.position(entity).expect("handle is live");
                let step = Vec2::new(velocity.x, velocity.y) * 0.016;
                manager
                    .set_position(entity, position + step)
                    .expect("handle is live");
            }
            black_box(moving.len())
        });
    });
}

/// Benchmark: Tag query across a full table.
fn bench_tag_query(c: &mut Criterion) {
    let registry = registry();
    let mut arena = arena_for(&registry, ENTITY_COUNT);
    let mut bump = arena.allocator();
    let mut manager =
        EntityManager::load(&mut bump, &registry, ENTITY_COUNT, |_, _| {}).expect("arena sized");

    for i in 0..ENTITY_COUNT {
        let entity = manager.spawn(Vec2::ZERO).expect("table has room");
        manager.set_tag(entity, (i % 8) as i32).expect("handle is live");
    }

    let mut out = vec![EntityHandle::NULL; ENTITY_COUNT];

    c.bench_function("tag_query_100k", |b| {
        b.iter(|| black_box(manager.query_by_tag(3, &mut out).len()));
    });
}

criterion_group!(
    benches,
    bench_load,
    bench_spawn_destroy,
    bench_attach,
    bench_velocity_pass,
    bench_tag_query,
);

criterion_main!(benches);
