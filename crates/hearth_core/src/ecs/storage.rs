//! # Component Storage
//!
//! Pre-allocated, dense component storage with zero runtime allocations.
//!
//! One pool per component type:
//! - `capacity * size` contiguous bytes, carved from the arena at load
//! - An activity bit per slot
//! - Slots never move, so a component's bytes stay put until its entity dies

use crate::memory::BitSet;

use super::component::{ComponentTypeInfo, DefaultsFn};

/// Fixed-capacity, type-erased storage for a single component type.
///
/// Slots are indexed by a component slot index, which is unrelated to the
/// owning entity's index. Acquiring always takes the lowest free slot.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = ComponentPool::new(storage, activity, &info, 64);
/// let slot = pool.acquire().expect("pool full");
/// pool.bytes_mut(slot)[0] = 7;
/// ```
#[derive(Debug)]
pub struct ComponentPool<'a> {
    /// `capacity * size` bytes of component data.
    storage: &'a mut [u8],
    /// Which slots hold a live component.
    active: BitSet<'a>,
    /// Bytes per component.
    size: usize,
    /// Maximum simultaneously-live components.
    capacity: usize,
    /// Number of live components.
    live: usize,
    /// Runs after zeroing on acquire.
    init_defaults: Option<DefaultsFn>,
}

impl<'a> ComponentPool<'a> {
    /// Wraps pre-reserved bytes as a pool.
    ///
    /// # Arguments
    ///
    /// * `storage` - At least `capacity * info.size` bytes, aligned to `info.align`
    /// * `activity` - At least `BitSet::bytes_for(capacity)` bytes
    /// * `info` - Layout of the stored type
    /// * `capacity` - Number of slots
    ///
    /// # Panics
    ///
    /// Panics if either buffer is too small, including when
    /// `capacity * info.size` overflows.
    #[must_use]
    pub fn new(
        storage: &'a mut [u8],
        activity: &'a mut [u8],
        info: &ComponentTypeInfo,
        capacity: usize,
    ) -> Self {
        // Saturates so an overflowing request fails the length check below.
        let bytes = capacity.saturating_mul(info.size);
        assert!(
            storage.len() >= bytes,
            "component pool needs {bytes} bytes, got {}",
            storage.len()
        );

        Self {
            storage: &mut storage[..bytes],
            active: BitSet::new(activity, capacity),
            size: info.size,
            capacity,
            live: 0,
            init_defaults: info.init_defaults,
        }
    }

    /// Returns the number of slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of live components.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether no component is live.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns the size of one component in bytes.
    #[inline]
    #[must_use]
    pub const fn component_size(&self) -> usize {
        self.size
    }

    /// Claims the lowest free slot and initializes it.
    ///
    /// The slot's bytes are zeroed, then the type's defaults run.
    ///
    /// # Returns
    ///
    /// The slot index, or None if every slot is live.
    pub fn acquire(&mut self) -> Option<usize> {
        let slot = self.active.first_inactive()?;
        self.active.activate(slot);
        self.live += 1;

        let bytes = self.bytes_mut(slot);
        bytes.fill(0);
        if let Some(init) = self.init_defaults {
            init(self.bytes_mut(slot));
        }

        Some(slot)
    }

    /// Frees a slot. Its bytes are left as they are until the next acquire.
    #[inline]
    pub fn release(&mut self, slot: usize) {
        debug_assert!(self.active.is_active(slot), "releasing a free slot");
        if self.active.is_active(slot) {
            self.active.deactivate(slot);
            self.live -= 1;
        }
    }

    /// Whether `slot` holds a live component.
    #[inline]
    #[must_use]
    pub fn is_active(&self, slot: usize) -> bool {
        self.active.is_active(slot)
    }

    /// Bytes of one slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= capacity`.
    #[inline]
    #[must_use]
    pub fn bytes(&self, slot: usize) -> &[u8] {
        let start = slot * self.size;
        &self.storage[start..start + self.size]
    }

    /// Mutable bytes of one slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= capacity`.
    #[inline]
    pub fn bytes_mut(&mut self, slot: usize) -> &mut [u8] {
        let start = slot * self.size;
        &mut self.storage[start..start + self.size]
    }

    /// Frees every slot.
    pub fn clear(&mut self) {
        self.active.clear();
        self.live = 0;
    }
}
