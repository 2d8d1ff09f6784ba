//! # Entity Handles
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into the per-entity arrays
//! - A generation counter for safe reuse

use bytemuck::{Pod, Zeroable};

/// Generational reference to an entity.
///
/// The handle is split into two parts:
/// - Lower 32 bits: Slot index
/// - Upper 32 bits: Generation the slot had when this entity was spawned
///
/// A handle is valid only while its slot is alive at the same generation.
/// Generations start at 0 and every spawn bumps them, so a handle with
/// generation 0 is never valid.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EntityHandle(u64);

impl EntityHandle {
    /// Creates a handle from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid handle.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this is the null handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            return f.write_str("EntityHandle(NULL)");
        }
        f.debug_struct("EntityHandle")
            .field("index", &self.index())
            .field("generation", &self.generation())
            .finish()
    }
}

/// Edge deltas applied on top of a sprite-derived collision rectangle.
///
/// Positive values grow the rectangle outward on that side; negative values
/// shrink it.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ColliderOffset {
    /// Moves the left edge left.
    pub left: f32,
    /// Moves the top edge up.
    pub top: f32,
    /// Moves the right edge right.
    pub right: f32,
    /// Moves the bottom edge down.
    pub bottom: f32,
}

impl ColliderOffset {
    /// No adjustment.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a new offset.
    #[inline]
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Tag value of an entity nobody has tagged.
pub const NO_TAG: i32 = -1;
