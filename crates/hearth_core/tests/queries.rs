//! # Query Tests
//!
//! Signature and tag queries against a shadow model of the live set,
//! driven by seeded spawn/destroy interleavings.
//!
//! Run with: cargo test --package hearth_core --test queries

use bytemuck::{Pod, Zeroable};
use hearth_core::{
    Arena, Component, ComponentId, ComponentRegistry, ComponentTypeInfo, EcsConfig, EcsError,
    EntityHandle, EntityManager, Signature, NO_TAG,
};
use hearth_shared::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Velocity {
    x: f32,
    y: f32,
}

impl Component for Velocity {
    const ID: ComponentId = 0;
}

#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Health {
    current: i32,
}

impl Component for Health {
    const ID: ComponentId = 1;

    fn init_defaults(&mut self) {
        self.current = 10;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Gravity {
    scale: f32,
}

impl Component for Gravity {
    const ID: ComponentId = 2;
}

fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry
        .load(3, |id| match id {
            Velocity::ID => ComponentTypeInfo::of::<Velocity>(),
            Health::ID => ComponentTypeInfo::of::<Health>(),
            _ => ComponentTypeInfo::of::<Gravity>(),
        })
        .expect("registry loads");
    registry
}

#[test]
fn four_slot_walkthrough() {
    let registry = registry();
    let mut arena = Arena::new(16 * 1024);
    let mut bump = arena.allocator();
    let mut manager = EntityManager::load(&mut bump, &registry, 4, |_, _| {}).unwrap();

    let a = manager.spawn(Vec2::new(0.0, 0.0)).unwrap();
    let b = manager.spawn(Vec2::new(1.0, 0.0)).unwrap();
    let c = manager.spawn(Vec2::new(2.0, 0.0)).unwrap();
    let d = manager.spawn(Vec2::new(3.0, 0.0)).unwrap();
    assert_eq!(
        [a.index(), b.index(), c.index(), d.index()],
        [0, 1, 2, 3]
    );
    assert_eq!(
        manager.spawn(Vec2::ZERO),
        Err(EcsError::EntityTableFull { capacity: 4 })
    );

    manager.destroy(b).unwrap();
    let f = manager.spawn(Vec2::new(9.0, 9.0)).unwrap();
    assert_eq!(f.index(), 1);
    assert!(f.generation() > b.generation());
    assert!(!manager.is_valid(b));
    assert!(manager.is_valid(f));

    let mut out = [EntityHandle::NULL; 4];
    assert!(manager.query_by_tag(5, &mut out).is_empty());

    manager.set_tag(a, 5).unwrap();
    manager.set_tag(c, 5).unwrap();
    assert_eq!(manager.query_by_tag(5, &mut out), &[a, c]);
    assert_eq!(manager.has_tag(a, 5), Ok(true));
    assert_eq!(manager.has_tag(f, 5), Ok(false));
    assert_eq!(manager.has_tag(b, 5), Err(EcsError::StaleHandle(b)));
    assert_eq!(manager.collect_by_tag(NO_TAG), vec![f, d]);
}

#[test]
fn signature_queries_match_attached_components() {
    let registry = registry();
    let mut arena = Arena::new(16 * 1024);
    let mut bump = arena.allocator();
    let mut manager = EntityManager::load(&mut bump, &registry, 8, |_, _| {}).unwrap();

    let mover = manager.spawn(Vec2::ZERO).unwrap();
    let faller = manager.spawn(Vec2::ZERO).unwrap();
    let rock = manager.spawn(Vec2::ZERO).unwrap();

    manager.add_component::<Velocity>(mover).unwrap();
    manager.add_component::<Velocity>(faller).unwrap();
    manager.add_component::<Gravity>(faller).unwrap();
    manager.add_component::<Gravity>(rock).unwrap();

    let moving = Signature::of::<Velocity>();
    let falling = Signature::of::<Velocity>().with::<Gravity>();

    assert_eq!(manager.collect_by_signature(moving), vec![mover, faller]);
    assert_eq!(manager.collect_by_signature(falling), vec![faller]);
    assert!(manager
        .collect_by_signature(Signature::of::<Health>())
        .is_empty());

    // The empty signature matches every live entity.
    assert_eq!(
        manager.collect_by_signature(Signature::EMPTY),
        vec![mover, faller, rock]
    );

    manager.destroy(faller).unwrap();
    assert_eq!(manager.collect_by_signature(moving), vec![mover]);
    assert!(manager.collect_by_signature(falling).is_empty());
}

#[test]
fn query_results_are_repeatable() {
    let registry = registry();
    let mut arena = Arena::new(16 * 1024);
    let mut bump = arena.allocator();
    let mut manager = EntityManager::load(&mut bump, &registry, 16, |_, _| {}).unwrap();

    for i in 0..16 {
        let entity = manager.spawn(Vec2::ZERO).unwrap();
        if i % 3 == 0 {
            manager.add_component::<Health>(entity).unwrap();
        }
    }

    let required = Signature::of::<Health>();
    let mut first = [EntityHandle::NULL; 16];
    let mut second = [EntityHandle::NULL; 16];
    let first = manager.query_by_signature(required, &mut first);
    let second = manager.query_by_signature(required, &mut second);
    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
    assert!(first.windows(2).all(|w| w[0].index() < w[1].index()));
}

#[test]
fn seeded_churn_matches_shadow_model() {
    const CAPACITY: usize = 32;

    let registry = registry();
    let mut arena = Arena::new(64 * 1024);
    let mut bump = arena.allocator();
    let mut manager = EntityManager::load(&mut bump, &registry, CAPACITY, |_, _| {}).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(0x4845_4152_5448);
    let mut live: Vec<EntityHandle> = Vec::new();
    let mut dead: Vec<EntityHandle> = Vec::new();

    for _ in 0..2_000 {
        if live.is_empty() || (live.len() < CAPACITY && rng.gen_bool(0.55)) {
            let entity = manager.spawn(Vec2::ZERO).unwrap();
            if rng.gen_bool(0.5) {
                manager.add_component::<Velocity>(entity).unwrap();
            }
            manager.set_tag(entity, rng.gen_range(0..3)).unwrap();
            live.push(entity);
        } else {
            let victim = live.swap_remove(rng.gen_range(0..live.len()));
            manager.destroy(victim).unwrap();
            dead.push(victim);
        }

        assert_eq!(manager.alive_count(), live.len());
    }

    for handle in &dead {
        assert!(!manager.is_valid(*handle));
    }

    live.sort_unstable_by_key(|h| h.index());
    assert_eq!(manager.live_entities().collect::<Vec<_>>(), live);

    let expected_moving: Vec<EntityHandle> = live
        .iter()
        .copied()
        .filter(|e| manager.has_component(*e, Velocity::ID).unwrap())
        .collect();
    assert_eq!(
        manager.collect_by_signature(Signature::of::<Velocity>()),
        expected_moving
    );
    assert_eq!(
        manager.component_count(Velocity::ID),
        Ok(expected_moving.len())
    );

    for tag in 0..3 {
        let expected: Vec<EntityHandle> = live
            .iter()
            .copied()
            .filter(|e| manager.tag(*e) == Ok(tag))
            .collect();
        assert_eq!(manager.collect_by_tag(tag), expected);
    }
}

#[test]
fn config_sizes_component_pools() {
    let config = EcsConfig::from_toml_str(
        r#"
        entity_capacity = 8

        [[component]]
        id = 1
        capacity = 2
        "#,
    )
    .unwrap();

    let registry = registry();
    let mut arena = Arena::new(16 * 1024);
    let mut bump = arena.allocator();
    let mut manager = EntityManager::from_config(&mut bump, &registry, &config).unwrap();

    assert_eq!(manager.entity_capacity(), 8);
    assert_eq!(manager.component_capacity(Velocity::ID), Ok(8));
    assert_eq!(manager.component_capacity(Health::ID), Ok(2));

    let entities: Vec<EntityHandle> = (0..3)
        .map(|_| manager.spawn(Vec2::ZERO).unwrap())
        .collect();
    assert_eq!(manager.add_component::<Health>(entities[0]).unwrap().current, 10);
    manager.add_component::<Health>(entities[1]).unwrap();
    assert_eq!(
        manager.add_component::<Health>(entities[2]).unwrap_err(),
        EcsError::ComponentPoolFull {
            component: Health::ID,
            capacity: 2,
        }
    );
    // A failed attach leaves the entity untouched.
    assert_eq!(manager.has_component(entities[2], Health::ID), Ok(false));
}
