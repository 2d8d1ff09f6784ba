//! # Entity Component Storage
//!
//! A fixed-capacity, arena-backed entity table.
//!
//! ## Design Philosophy
//!
//! - All storage is carved from an arena when the manager loads
//! - Components are stored per type in dense, never-moving pools
//! - Entities are slot indices with generation counters
//! - Component types are described at runtime by a registry

mod collider;
mod component;
mod entity;
mod manager;
mod query;
mod storage;

pub use collider::collider_rect;
pub use component::{
    Component, ComponentId, ComponentRegistry, ComponentTypeInfo, DefaultsFn,
    MAX_COMPONENT_TYPES,
};
pub use entity::{ColliderOffset, EntityHandle, NO_TAG};
pub use manager::EntityManager;
pub use query::Signature;
pub use storage::ComponentPool;
