//! # Signatures
//!
//! A signature is a 64-bit mask over component type indices. Every entity
//! carries one describing what it has; a query carries one describing what it
//! requires.

use bytemuck::{Pod, Zeroable};

use super::component::{Component, ComponentId, MAX_COMPONENT_TYPES};

/// Set of component types, one bit per [`ComponentId`].
///
/// # Example
///
/// ```rust,ignore
/// let movers = Signature::of::<Velocity>().with::<Sprite>();
/// let found = manager.query_by_signature(movers, &mut buffer);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Signature(u64);

impl Signature {
    /// No component types.
    pub const EMPTY: Self = Self(0);

    /// Builds a signature from a raw mask.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw mask.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Signature holding one typed component.
    #[inline]
    #[must_use]
    pub const fn of<T: Component>() -> Self {
        Self::EMPTY.with_id(T::ID)
    }

    /// Adds a typed component.
    #[inline]
    #[must_use]
    pub const fn with<T: Component>(self) -> Self {
        self.with_id(T::ID)
    }

    /// Adds a component type by index. Indices past the last bit are ignored.
    #[inline]
    #[must_use]
    pub const fn with_id(self, id: ComponentId) -> Self {
        if id as usize >= MAX_COMPONENT_TYPES {
            return self;
        }
        Self(self.0 | (1 << id))
    }

    /// Adds a component type in place.
    #[inline]
    pub fn insert(&mut self, id: ComponentId) {
        *self = self.with_id(id);
    }

    /// Removes a component type in place.
    #[inline]
    pub fn remove(&mut self, id: ComponentId) {
        if usize::from(id) < MAX_COMPONENT_TYPES {
            self.0 &= !(1 << id);
        }
    }

    /// Whether one component type is present.
    #[inline]
    #[must_use]
    pub const fn contains_id(self, id: ComponentId) -> bool {
        (id as usize) < MAX_COMPONENT_TYPES && (self.0 >> id) & 1 == 1
    }

    /// Whether every type in `required` is present.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Number of component types.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether no component type is present.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}
