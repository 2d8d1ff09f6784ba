//! # Storage Error Types
//!
//! Every failure the entity storage core can report.
//!
//! Two families live here:
//! - **Exhaustion** (table full, pool full, arena too small). Expected at
//!   runtime; callers skip, log, or retry next frame.
//! - **Misuse** (stale handle, double attach, unknown type, bad flag). A caller
//!   bug. Reported instead of touching live data.

use thiserror::Error;

use crate::ecs::{ComponentId, EntityHandle};

/// Errors that can occur in the entity storage core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    // =========================================================================
    // Resource exhaustion
    // =========================================================================
    /// Every entity slot is occupied.
    #[error("entity table full: capacity {capacity}")]
    EntityTableFull {
        /// Configured entity capacity.
        capacity: usize,
    },

    /// Every slot of one component pool is occupied.
    #[error("component pool {component} full: capacity {capacity}")]
    ComponentPoolFull {
        /// The exhausted component type.
        component: ComponentId,
        /// Configured capacity of that pool.
        capacity: usize,
    },

    /// The arena ran out of bytes while a manager was being built.
    #[error("arena exhausted: requested {requested} bytes, {remaining} remaining")]
    ArenaExhausted {
        /// Bytes the failing reservation asked for (before alignment padding).
        requested: usize,
        /// Bytes left in the arena at that point.
        remaining: usize,
    },

    // =========================================================================
    // Contract violations
    // =========================================================================
    /// The handle's slot is free or has been reused since the handle was issued.
    #[error("stale entity handle {0:?}")]
    StaleHandle(EntityHandle),

    /// The entity already owns a component of this type.
    #[error("entity {entity:?} already has component {component}")]
    ComponentAlreadyAttached {
        /// The entity.
        entity: EntityHandle,
        /// The component type.
        component: ComponentId,
    },

    /// The entity has no component of this type.
    #[error("entity {entity:?} has no component {component}")]
    MissingComponent {
        /// The entity.
        entity: EntityHandle,
        /// The component type.
        component: ComponentId,
    },

    /// The type index is not in the loaded registry.
    #[error("component type {0} is not registered")]
    UnregisteredComponent(ComponentId),

    /// A flag argument was not a single set bit.
    #[error("flag {0:#010b} is not a single bit")]
    InvalidFlag(u8),

    /// Typed access with a Rust type whose size or alignment differs from the
    /// registered layout.
    #[error("component {component} accessed with a type of different layout")]
    ComponentLayoutMismatch {
        /// The component type.
        component: ComponentId,
    },

    // =========================================================================
    // Startup / configuration
    // =========================================================================
    /// `ComponentRegistry::load` called on a loaded registry.
    #[error("component registry already loaded")]
    RegistryAlreadyLoaded,

    /// A manager was built against an unloaded registry.
    #[error("component registry not loaded")]
    RegistryNotLoaded,

    /// The type loader returned an all-zero info for this index.
    #[error("component type {0} was never filled in by the loader")]
    UnfilledComponentType(ComponentId),

    /// The type loader returned an unusable layout.
    #[error("component type {component} has invalid layout: size {size}, align {align}")]
    InvalidComponentLayout {
        /// The component type.
        component: ComponentId,
        /// Reported size in bytes.
        size: usize,
        /// Reported alignment in bytes.
        align: usize,
    },

    /// More component types than a signature can describe.
    #[error("{requested} component types requested, at most {max} supported")]
    TooManyComponentTypes {
        /// Requested type count.
        requested: usize,
        /// Supported maximum.
        max: usize,
    },

    /// Capacity does not fit the 32-bit slot index.
    #[error("capacity {0} exceeds the 32-bit index range")]
    CapacityTooLarge(usize),

    /// The capacity config could not be read or is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for storage operations.
pub type EcsResult<T> = Result<T, EcsError>;
