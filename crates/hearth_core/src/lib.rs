//! # HEARTH Core Engine
//!
//! Arena-backed entity/component storage for a single-threaded game loop:
//! - Fixed entity capacity, chosen per scene
//! - Generational handles; a handle to a destroyed entity never matches the
//!   slot's next occupant
//! - Zero heap allocations after load
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in hot path** - Every table is carved from an arena at load
//! 2. **Data-oriented design** - Per-entity fields are columns, components live in per-type pools
//! 3. **Misuse is an error, not corruption** - Stale handles and double attaches are rejected
//!
//! ## Example
//!
//! ```rust,ignore
//! use hearth_core::{Arena, ComponentRegistry, ComponentTypeInfo, EntityManager};
//! use hearth_shared::Vec2;
//!
//! let mut registry = ComponentRegistry::new();
//! registry.load(1, |_| ComponentTypeInfo::of::<Health>())?;
//!
//! let mut arena = Arena::new(1 << 20);
//! let mut bump = arena.allocator();
//! let mut manager = EntityManager::load(&mut bump, &registry, 1024, |_, _| {})?;
//!
//! let goblin = manager.spawn(Vec2::new(64.0, 32.0))?;
//! manager.add_component::<Health>(goblin)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;

pub use config::{ComponentCapacity, EcsConfig};
pub use ecs::{
    collider_rect, ColliderOffset, Component, ComponentId, ComponentPool, ComponentRegistry,
    ComponentTypeInfo, DefaultsFn, EntityHandle, EntityManager, Signature, MAX_COMPONENT_TYPES,
    NO_TAG,
};
pub use error::{EcsError, EcsResult};
pub use memory::{ActiveBits, Arena, ArenaAllocator, BitSet};
