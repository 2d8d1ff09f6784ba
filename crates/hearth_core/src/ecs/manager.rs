//! # Entity Manager
//!
//! The central container for entities and their components. Every table is
//! carved from a caller-owned arena when the manager loads; nothing is
//! allocated or freed afterwards.
//!
//! ## Layout
//!
//! ```text
//! per entity slot:  active bit | generation | position | collider offset
//!                   tag | flags | signature | component slot per type
//! per component:    [capacity * size bytes] + activity bits
//! ```

use bytemuck::Pod;
use hearth_shared::{Rect, Vec2};

use crate::config::EcsConfig;
use crate::error::{EcsError, EcsResult};
use crate::memory::{ArenaAllocator, BitSet};

use super::collider::collider_rect;
use super::component::{Component, ComponentId, ComponentRegistry};
use super::entity::{ColliderOffset, EntityHandle, NO_TAG};
use super::query::Signature;
use super::storage::ComponentPool;

/// Component slot value of an entity that lacks that component.
const NO_COMPONENT: i32 = -1;

/// Fixed-capacity entity table with per-type component pools.
///
/// All memory is reserved at [`load`](Self::load). Spawning, destroying,
/// attaching and querying never allocate.
///
/// # Handles
///
/// Entities are only reachable through [`EntityHandle`]s. Every operation
/// that takes a handle first checks that its slot is alive at the same
/// generation and returns [`EcsError::StaleHandle`] otherwise, so a handle
/// kept past its entity's destruction can never read or write the slot's
/// next occupant.
///
/// # Example
///
/// ```rust,ignore
/// let mut arena = Arena::new(1 << 20);
/// let mut bump = arena.allocator();
/// let mut manager = EntityManager::load(&mut bump, &registry, 1024, |_, _| {})?;
///
/// let player = manager.spawn(Vec2::new(16.0, 16.0))?;
/// manager.add_component::<Health>(player)?.current = 80;
/// ```
pub struct EntityManager<'a> {
    /// Component layouts; borrowed so it outlives every pool built from it.
    registry: &'a ComponentRegistry,
    /// Number of entity slots.
    capacity: usize,
    /// Registered component types (row width of `component_slots`).
    type_count: usize,
    /// Number of live entities.
    alive: usize,

    // =========================================================================
    // Per-entity columns, indexed by slot
    // =========================================================================
    /// Which slots hold a live entity.
    active: BitSet<'a>,
    /// Bumped on every spawn.
    generations: &'a mut [u32],
    /// World position.
    positions: &'a mut [Vec2],
    /// Collider edge adjustments.
    collider_offsets: &'a mut [ColliderOffset],
    /// Caller-defined tag, `NO_TAG` when unset.
    tags: &'a mut [i32],
    /// Caller-defined flag bits.
    flags: &'a mut [u8],
    /// Attached component types, mirrors `component_slots`.
    signatures: &'a mut [Signature],
    /// `[capacity][type_count]` pool slot per component, `NO_COMPONENT` if absent.
    component_slots: &'a mut [i32],

    /// One pool per registered type.
    pools: Box<[ComponentPool<'a>]>,
}

impl<'a> EntityManager<'a> {
    /// Builds a manager, reserving every table from `arena`.
    ///
    /// Reservations happen in a fixed order: positions, collider offsets,
    /// component slot rows, tags, flags, activity bits, generations,
    /// signatures, then for each component type its storage and activity bits.
    ///
    /// # Arguments
    ///
    /// * `arena` - Bump allocator the tables are carved from
    /// * `registry` - Loaded component registry
    /// * `entity_capacity` - Number of entity slots; 0 builds an empty manager
    /// * `capacity_loader` - Called once per component type with its capacity
    ///   (defaulting to `entity_capacity`); may overwrite it
    ///
    /// # Errors
    ///
    /// - `RegistryNotLoaded` if the registry is not loaded
    /// - `CapacityTooLarge` if a capacity does not fit a slot index
    /// - `ArenaExhausted` if the arena runs out; the manager is not built
    pub fn load<F>(
        arena: &mut ArenaAllocator<'a>,
        registry: &'a ComponentRegistry,
        entity_capacity: usize,
        mut capacity_loader: F,
    ) -> EcsResult<Self>
    where
        F: FnMut(ComponentId, &mut usize),
    {
        if !registry.is_loaded() {
            return Err(EcsError::RegistryNotLoaded);
        }
        // u32::MAX is the index of the null handle.
        if entity_capacity >= u32::MAX as usize {
            return Err(EcsError::CapacityTooLarge(entity_capacity));
        }
        if entity_capacity == 0 {
            return Ok(Self::empty(registry));
        }

        let used_before = arena.used();
        let manager = match Self::carve(arena, registry, entity_capacity, &mut capacity_loader) {
            Ok(manager) => manager,
            Err(err) => {
                tracing::warn!(entity_capacity, %err, "entity manager failed to load");
                return Err(err);
            }
        };

        tracing::debug!(
            entity_capacity,
            component_types = manager.type_count,
            arena_bytes = arena.used() - used_before,
            "entity manager loaded"
        );
        Ok(manager)
    }

    /// Builds a manager sized by a capacity config.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn from_config(
        arena: &mut ArenaAllocator<'a>,
        registry: &'a ComponentRegistry,
        config: &EcsConfig,
    ) -> EcsResult<Self> {
        Self::load(arena, registry, config.entity_capacity, |id, capacity| {
            config.apply_capacity(id, capacity);
        })
    }

    /// Upper bound on the arena bytes [`load`](Self::load) consumes with the
    /// same arguments, alignment padding included.
    ///
    /// # Errors
    ///
    /// - `RegistryNotLoaded` if the registry is not loaded
    /// - `CapacityTooLarge` if a capacity does not fit a slot index or the
    ///   byte count overflows `usize`
    pub fn arena_bytes_needed<F>(
        registry: &ComponentRegistry,
        entity_capacity: usize,
        mut capacity_loader: F,
    ) -> EcsResult<usize>
    where
        F: FnMut(ComponentId, &mut usize),
    {
        if !registry.is_loaded() {
            return Err(EcsError::RegistryNotLoaded);
        }
        if entity_capacity >= u32::MAX as usize {
            return Err(EcsError::CapacityTooLarge(entity_capacity));
        }
        if entity_capacity == 0 {
            return Ok(0);
        }

        let columns = || -> Option<usize> {
            let row_cells = entity_capacity.checked_mul(registry.type_count())?;
            [
                slice_bytes::<Vec2>(entity_capacity)?,
                slice_bytes::<ColliderOffset>(entity_capacity)?,
                slice_bytes::<i32>(row_cells)?,
                slice_bytes::<i32>(entity_capacity)?,
                slice_bytes::<u8>(entity_capacity)?,
                slice_bytes::<u8>(BitSet::bytes_for(entity_capacity))?,
                slice_bytes::<u32>(entity_capacity)?,
                slice_bytes::<Signature>(entity_capacity)?,
            ]
            .into_iter()
            .try_fold(0usize, usize::checked_add)
        };
        let mut total = columns().ok_or(EcsError::CapacityTooLarge(entity_capacity))?;

        for (id, info) in registry.iter() {
            let mut capacity = entity_capacity;
            capacity_loader(id, &mut capacity);
            total = capacity
                .checked_mul(info.size)
                .and_then(|size| padded_bytes(size, info.align))
                .and_then(|storage| {
                    storage.checked_add(slice_bytes::<u8>(BitSet::bytes_for(capacity))?)
                })
                .and_then(|pool| total.checked_add(pool))
                .ok_or(EcsError::CapacityTooLarge(capacity))?;
        }
        Ok(total)
    }

    fn empty(registry: &'a ComponentRegistry) -> Self {
        Self {
            registry,
            capacity: 0,
            type_count: registry.type_count(),
            alive: 0,
            active: BitSet::new(&mut [], 0),
            generations: &mut [],
            positions: &mut [],
            collider_offsets: &mut [],
            tags: &mut [],
            flags: &mut [],
            signatures: &mut [],
            component_slots: &mut [],
            pools: Box::default(),
        }
    }

    fn carve(
        arena: &mut ArenaAllocator<'a>,
        registry: &'a ComponentRegistry,
        capacity: usize,
        capacity_loader: &mut dyn FnMut(ComponentId, &mut usize),
    ) -> EcsResult<Self> {
        let type_count = registry.type_count();
        let row_cells = capacity
            .checked_mul(type_count)
            .ok_or(EcsError::CapacityTooLarge(capacity))?;

        let positions = reserve::<Vec2>(arena, capacity)?;
        let collider_offsets = reserve::<ColliderOffset>(arena, capacity)?;
        let component_slots = reserve::<i32>(arena, row_cells)?;
        let tags = reserve::<i32>(arena, capacity)?;
        let flags = reserve::<u8>(arena, capacity)?;
        let activity = reserve::<u8>(arena, BitSet::bytes_for(capacity))?;
        let generations = reserve::<u32>(arena, capacity)?;
        let signatures = reserve::<Signature>(arena, capacity)?;

        let mut pools = Vec::with_capacity(type_count);
        for (id, info) in registry.iter() {
            let mut pool_capacity = capacity;
            capacity_loader(id, &mut pool_capacity);
            // Pool slots are stored as i32 in the entity rows.
            if pool_capacity > i32::MAX as usize {
                return Err(EcsError::CapacityTooLarge(pool_capacity));
            }

            let size = pool_capacity
                .checked_mul(info.size)
                .ok_or(EcsError::CapacityTooLarge(pool_capacity))?;
            let remaining = arena.remaining();
            let storage = arena
                .alloc_bytes(size, info.align)
                .ok_or(EcsError::ArenaExhausted {
                    requested: size,
                    remaining,
                })?;
            let pool_activity = reserve::<u8>(arena, BitSet::bytes_for(pool_capacity))?;
            pools.push(ComponentPool::new(storage, pool_activity, info, pool_capacity));
        }

        component_slots.fill(NO_COMPONENT);
        tags.fill(NO_TAG);

        Ok(Self {
            registry,
            capacity,
            type_count,
            alive: 0,
            active: BitSet::new(activity, capacity),
            generations,
            positions,
            collider_offsets,
            tags,
            flags,
            signatures,
            component_slots,
            pools: pools.into_boxed_slice(),
        })
    }

    /// Returns the number of entity slots.
    #[inline]
    #[must_use]
    pub const fn entity_capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive
    }

    /// Returns the registry this manager was built against.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &'a ComponentRegistry {
        self.registry
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Spawns an entity in the lowest free slot.
    ///
    /// The slot's fields are reset (no tag, no flags, no components, zero
    /// collider offset) and its generation is bumped, so no earlier handle to
    /// this slot matches the new one.
    ///
    /// # Errors
    ///
    /// `EntityTableFull` when every slot is live. This is an expected
    /// condition; the table is unchanged.
    pub fn spawn(&mut self, position: Vec2) -> EcsResult<EntityHandle> {
        let Some(index) = self.active.first_inactive() else {
            tracing::debug!(capacity = self.capacity, "entity table full");
            return Err(EcsError::EntityTableFull {
                capacity: self.capacity,
            });
        };

        self.active.activate(index);
        self.positions[index] = position;
        self.collider_offsets[index] = ColliderOffset::ZERO;
        self.tags[index] = NO_TAG;
        self.flags[index] = 0;
        self.signatures[index] = Signature::EMPTY;
        self.component_row_mut(index).fill(NO_COMPONENT);

        // Generation 0 is never handed out, even after wrapping.
        let generation = match self.generations[index].wrapping_add(1) {
            0 => 1,
            g => g,
        };
        self.generations[index] = generation;
        self.alive += 1;

        let handle = EntityHandle::new(index as u32, generation);
        tracing::trace!(?handle, "entity spawned");
        Ok(handle)
    }

    /// Destroys an entity and releases every component it owns.
    ///
    /// # Errors
    ///
    /// `StaleHandle` if the handle is not valid; nothing is touched.
    pub fn destroy(&mut self, handle: EntityHandle) -> EcsResult<()> {
        let index = self.live_index(handle)?;

        let row = index * self.type_count;
        for (ty, pool) in self.pools.iter_mut().enumerate() {
            let cell = &mut self.component_slots[row + ty];
            if *cell != NO_COMPONENT {
                pool.release(*cell as usize);
                *cell = NO_COMPONENT;
            }
        }

        self.signatures[index] = Signature::EMPTY;
        self.active.deactivate(index);
        self.alive -= 1;

        tracing::trace!(?handle, "entity destroyed");
        Ok(())
    }

    /// Destroys every live entity. Generations are kept, so every handle
    /// issued so far becomes stale.
    pub fn clear(&mut self) {
        self.active.clear();
        self.component_slots.fill(NO_COMPONENT);
        self.signatures.fill(Signature::EMPTY);
        for pool in self.pools.iter_mut() {
            pool.clear();
        }
        self.alive = 0;
    }

    /// Whether `handle` refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, handle: EntityHandle) -> bool {
        let index = handle.index() as usize;
        !handle.is_null()
            && index < self.capacity
            && self.active.is_active(index)
            && self.generations[index] == handle.generation()
    }

    /// Iterates over live entities in slot order.
    pub fn live_entities(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        self.active.iter_active().map(move |index| self.handle_at(index))
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a component and returns its bytes.
    ///
    /// The lowest free pool slot is used. Its bytes are zeroed, then the
    /// type's defaults run. The returned bytes stay in place until the entity
    /// is destroyed.
    ///
    /// # Errors
    ///
    /// - `StaleHandle`, `UnregisteredComponent`, `ComponentAlreadyAttached`
    /// - `ComponentPoolFull` when the type's pool has no free slot (expected;
    ///   the entity is unchanged)
    pub fn add_component_raw(
        &mut self,
        handle: EntityHandle,
        id: ComponentId,
    ) -> EcsResult<&mut [u8]> {
        let index = self.live_index(handle)?;
        let ty = self.type_index(id)?;

        let cell = index * self.type_count + ty;
        if self.component_slots[cell] != NO_COMPONENT {
            return Err(EcsError::ComponentAlreadyAttached {
                entity: handle,
                component: id,
            });
        }

        let pool = &mut self.pools[ty];
        let Some(slot) = pool.acquire() else {
            tracing::debug!(component = id, capacity = pool.capacity(), "component pool full");
            return Err(EcsError::ComponentPoolFull {
                component: id,
                capacity: pool.capacity(),
            });
        };

        self.component_slots[cell] = slot as i32;
        self.signatures[index].insert(id);
        Ok(pool.bytes_mut(slot))
    }

    /// Attaches a typed component and returns it.
    ///
    /// # Errors
    ///
    /// Same as [`add_component_raw`](Self::add_component_raw), plus
    /// `ComponentLayoutMismatch` if `T` does not match the registered layout
    /// (checked before anything is attached).
    pub fn add_component<T: Component>(&mut self, handle: EntityHandle) -> EcsResult<&mut T> {
        self.check_layout::<T>()?;
        let bytes = self.add_component_raw(handle, T::ID)?;
        cast_mut(bytes, T::ID)
    }

    /// Bytes of an attached component.
    ///
    /// # Errors
    ///
    /// `StaleHandle`, `UnregisteredComponent`, or `MissingComponent`.
    pub fn component_bytes(&self, handle: EntityHandle, id: ComponentId) -> EcsResult<&[u8]> {
        let (ty, slot) = self.attached_slot(handle, id)?;
        Ok(self.pools[ty].bytes(slot))
    }

    /// Mutable bytes of an attached component.
    ///
    /// # Errors
    ///
    /// `StaleHandle`, `UnregisteredComponent`, or `MissingComponent`.
    pub fn component_bytes_mut(
        &mut self,
        handle: EntityHandle,
        id: ComponentId,
    ) -> EcsResult<&mut [u8]> {
        let (ty, slot) = self.attached_slot(handle, id)?;
        Ok(self.pools[ty].bytes_mut(slot))
    }

    /// Typed view of an attached component.
    ///
    /// # Errors
    ///
    /// Same as [`component_bytes`](Self::component_bytes), plus
    /// `ComponentLayoutMismatch`.
    pub fn get_component<T: Component>(&self, handle: EntityHandle) -> EcsResult<&T> {
        self.check_layout::<T>()?;
        let bytes = self.component_bytes(handle, T::ID)?;
        bytemuck::try_from_bytes(bytes)
            .map_err(|_| EcsError::ComponentLayoutMismatch { component: T::ID })
    }

    /// Mutable typed view of an attached component.
    ///
    /// # Errors
    ///
    /// Same as [`get_component`](Self::get_component).
    pub fn get_component_mut<T: Component>(&mut self, handle: EntityHandle) -> EcsResult<&mut T> {
        self.check_layout::<T>()?;
        let bytes = self.component_bytes_mut(handle, T::ID)?;
        cast_mut(bytes, T::ID)
    }

    /// Typed view that panics on misuse instead of returning a `Result`.
    ///
    /// For loops that validated `handle` earlier in the frame. Skips the
    /// `Result` plumbing but still compares the generation, so a stale handle,
    /// a missing component, or a wrong layout panics. It never reads another
    /// entity's component.
    ///
    /// # Panics
    ///
    /// Panics on a stale handle, a missing component, or a layout mismatch.
    #[inline]
    #[must_use]
    pub fn component_trusted<T: Component>(&self, handle: EntityHandle) -> &T {
        assert!(self.is_valid(handle), "stale handle {handle:?}");
        let ty = usize::from(T::ID);
        let slot = self.component_slots[handle.index() as usize * self.type_count + ty];
        assert_ne!(slot, NO_COMPONENT, "entity has no component {}", T::ID);
        bytemuck::from_bytes(self.pools[ty].bytes(slot as usize))
    }

    /// Mutable typed view that panics on misuse.
    ///
    /// See [`component_trusted`](Self::component_trusted).
    ///
    /// # Panics
    ///
    /// Same as [`component_trusted`](Self::component_trusted).
    #[inline]
    pub fn component_trusted_mut<T: Component>(&mut self, handle: EntityHandle) -> &mut T {
        assert!(self.is_valid(handle), "stale handle {handle:?}");
        let ty = usize::from(T::ID);
        let slot = self.component_slots[handle.index() as usize * self.type_count + ty];
        assert_ne!(slot, NO_COMPONENT, "entity has no component {}", T::ID);
        bytemuck::from_bytes_mut(self.pools[ty].bytes_mut(slot as usize))
    }

    /// Whether the entity has a component of type `id`.
    ///
    /// # Errors
    ///
    /// `StaleHandle` or `UnregisteredComponent`.
    pub fn has_component(&self, handle: EntityHandle, id: ComponentId) -> EcsResult<bool> {
        let index = self.live_index(handle)?;
        self.type_index(id)?;
        Ok(self.signatures[index].contains_id(id))
    }

    /// Component types attached to the entity.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn signature(&self, handle: EntityHandle) -> EcsResult<Signature> {
        let index = self.live_index(handle)?;
        Ok(self.signatures[index])
    }

    /// Pool slot holding the entity's component of type `id`, if attached.
    ///
    /// # Errors
    ///
    /// `StaleHandle` or `UnregisteredComponent`.
    pub fn component_slot(&self, handle: EntityHandle, id: ComponentId) -> EcsResult<Option<usize>> {
        let index = self.live_index(handle)?;
        let ty = self.type_index(id)?;
        let slot = self.component_slots[index * self.type_count + ty];
        Ok((slot != NO_COMPONENT).then_some(slot as usize))
    }

    /// Whether slot `slot` of the `id` pool holds a live component.
    ///
    /// # Errors
    ///
    /// `UnregisteredComponent`.
    pub fn pool_slot_active(&self, id: ComponentId, slot: usize) -> EcsResult<bool> {
        let ty = self.type_index(id)?;
        Ok(self.pools.get(ty).is_some_and(|pool| pool.is_active(slot)))
    }

    /// Capacity of the `id` pool.
    ///
    /// # Errors
    ///
    /// `UnregisteredComponent`.
    pub fn component_capacity(&self, id: ComponentId) -> EcsResult<usize> {
        let ty = self.type_index(id)?;
        Ok(self.pools.get(ty).map_or(0, ComponentPool::capacity))
    }

    /// Live components in the `id` pool.
    ///
    /// # Errors
    ///
    /// `UnregisteredComponent`.
    pub fn component_count(&self, id: ComponentId) -> EcsResult<usize> {
        let ty = self.type_index(id)?;
        Ok(self.pools.get(ty).map_or(0, ComponentPool::len))
    }

    // =========================================================================
    // Per-entity fields
    // =========================================================================

    /// Entity position.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn position(&self, handle: EntityHandle) -> EcsResult<Vec2> {
        let index = self.live_index(handle)?;
        Ok(self.positions[index])
    }

    /// Moves an entity.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn set_position(&mut self, handle: EntityHandle, position: Vec2) -> EcsResult<()> {
        let index = self.live_index(handle)?;
        self.positions[index] = position;
        Ok(())
    }

    /// Collider edge adjustments.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn collider_offset(&self, handle: EntityHandle) -> EcsResult<ColliderOffset> {
        let index = self.live_index(handle)?;
        Ok(self.collider_offsets[index])
    }

    /// Sets collider edge adjustments.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn set_collider_offset(
        &mut self,
        handle: EntityHandle,
        offset: ColliderOffset,
    ) -> EcsResult<()> {
        let index = self.live_index(handle)?;
        self.collider_offsets[index] = offset;
        Ok(())
    }

    /// Entity tag, [`NO_TAG`] when unset.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn tag(&self, handle: EntityHandle) -> EcsResult<i32> {
        let index = self.live_index(handle)?;
        Ok(self.tags[index])
    }

    /// Sets the entity tag.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn set_tag(&mut self, handle: EntityHandle, tag: i32) -> EcsResult<()> {
        let index = self.live_index(handle)?;
        self.tags[index] = tag;
        Ok(())
    }

    /// Whether the entity carries `tag`.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn has_tag(&self, handle: EntityHandle, tag: i32) -> EcsResult<bool> {
        Ok(self.tag(handle)? == tag)
    }

    /// Entity flag bits.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn flags(&self, handle: EntityHandle) -> EcsResult<u8> {
        let index = self.live_index(handle)?;
        Ok(self.flags[index])
    }

    /// Sets one flag bit.
    ///
    /// # Errors
    ///
    /// `StaleHandle`, or `InvalidFlag` if `flag` is not a single bit.
    pub fn add_flag(&mut self, handle: EntityHandle, flag: u8) -> EcsResult<()> {
        let index = self.flag_target(handle, flag)?;
        self.flags[index] |= flag;
        Ok(())
    }

    /// Clears one flag bit.
    ///
    /// # Errors
    ///
    /// `StaleHandle`, or `InvalidFlag` if `flag` is not a single bit.
    pub fn remove_flag(&mut self, handle: EntityHandle, flag: u8) -> EcsResult<()> {
        let index = self.flag_target(handle, flag)?;
        self.flags[index] &= !flag;
        Ok(())
    }

    /// Whether one flag bit is set.
    ///
    /// # Errors
    ///
    /// `StaleHandle`, or `InvalidFlag` if `flag` is not a single bit.
    pub fn has_flag(&self, handle: EntityHandle, flag: u8) -> EcsResult<bool> {
        let index = self.flag_target(handle, flag)?;
        Ok(self.flags[index] & flag != 0)
    }

    /// World-space collision rectangle of an entity.
    ///
    /// See [`collider_rect`] for how the inputs combine. Pass `Vec2::ZERO` as
    /// `extra_offset` for no extra translation.
    ///
    /// # Errors
    ///
    /// `StaleHandle`.
    pub fn create_collider(
        &self,
        handle: EntityHandle,
        frame: Rect,
        origin: Vec2,
        scale: Vec2,
        extra_offset: Vec2,
    ) -> EcsResult<Rect> {
        let index = self.live_index(handle)?;
        Ok(collider_rect(
            self.positions[index],
            self.collider_offsets[index],
            frame,
            origin,
            scale,
            extra_offset,
        ))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fills `out` with live entities that have every type in `required`.
    ///
    /// Results are in ascending slot order and stop when `out` is full.
    ///
    /// # Returns
    ///
    /// The filled prefix of `out`.
    pub fn query_by_signature<'o>(
        &self,
        required: Signature,
        out: &'o mut [EntityHandle],
    ) -> &'o [EntityHandle] {
        let filled = self.fill_matching(out, |index| {
            self.signatures[index].contains_all(required)
        });
        &out[..filled]
    }

    /// Fills `out` with live entities tagged `tag`.
    ///
    /// Results are in ascending slot order and stop when `out` is full.
    ///
    /// # Returns
    ///
    /// The filled prefix of `out`.
    pub fn query_by_tag<'o>(&self, tag: i32, out: &'o mut [EntityHandle]) -> &'o [EntityHandle] {
        let filled = self.fill_matching(out, |index| self.tags[index] == tag);
        &out[..filled]
    }

    /// Allocating variant of [`query_by_signature`](Self::query_by_signature)
    /// for code outside the frame loop.
    #[must_use]
    pub fn collect_by_signature(&self, required: Signature) -> Vec<EntityHandle> {
        self.active
            .iter_active()
            .filter(|&index| self.signatures[index].contains_all(required))
            .map(|index| self.handle_at(index))
            .collect()
    }

    /// Allocating variant of [`query_by_tag`](Self::query_by_tag).
    #[must_use]
    pub fn collect_by_tag(&self, tag: i32) -> Vec<EntityHandle> {
        self.active
            .iter_active()
            .filter(|&index| self.tags[index] == tag)
            .map(|index| self.handle_at(index))
            .collect()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn fill_matching<P>(&self, out: &mut [EntityHandle], mut predicate: P) -> usize
    where
        P: FnMut(usize) -> bool,
    {
        let mut filled = 0;
        for index in self.active.iter_active() {
            if filled == out.len() {
                break;
            }
            if predicate(index) {
                out[filled] = self.handle_at(index);
                filled += 1;
            }
        }
        filled
    }

    #[inline]
    fn handle_at(&self, index: usize) -> EntityHandle {
        EntityHandle::new(index as u32, self.generations[index])
    }

    #[inline]
    fn live_index(&self, handle: EntityHandle) -> EcsResult<usize> {
        if self.is_valid(handle) {
            Ok(handle.index() as usize)
        } else {
            Err(EcsError::StaleHandle(handle))
        }
    }

    #[inline]
    fn type_index(&self, id: ComponentId) -> EcsResult<usize> {
        let ty = usize::from(id);
        if ty < self.type_count {
            Ok(ty)
        } else {
            Err(EcsError::UnregisteredComponent(id))
        }
    }

    fn flag_target(&self, handle: EntityHandle, flag: u8) -> EcsResult<usize> {
        let index = self.live_index(handle)?;
        if !flag.is_power_of_two() {
            return Err(EcsError::InvalidFlag(flag));
        }
        Ok(index)
    }

    fn attached_slot(&self, handle: EntityHandle, id: ComponentId) -> EcsResult<(usize, usize)> {
        let index = self.live_index(handle)?;
        let ty = self.type_index(id)?;
        match self.component_slots[index * self.type_count + ty] {
            NO_COMPONENT => Err(EcsError::MissingComponent {
                entity: handle,
                component: id,
            }),
            slot => Ok((ty, slot as usize)),
        }
    }

    fn check_layout<T: Component>(&self) -> EcsResult<()> {
        if self.registry.type_info(T::ID)?.matches::<T>() {
            Ok(())
        } else {
            Err(EcsError::ComponentLayoutMismatch { component: T::ID })
        }
    }

    #[inline]
    fn component_row_mut(&mut self, index: usize) -> &mut [i32] {
        let start = index * self.type_count;
        &mut self.component_slots[start..start + self.type_count]
    }
}

fn reserve<'a, T: Pod>(arena: &mut ArenaAllocator<'a>, count: usize) -> EcsResult<&'a mut [T]> {
    let remaining = arena.remaining();
    arena.alloc_slice(count).ok_or(EcsError::ArenaExhausted {
        requested: count.saturating_mul(std::mem::size_of::<T>()),
        remaining,
    })
}

fn slice_bytes<T>(count: usize) -> Option<usize> {
    if count == 0 {
        return Some(0);
    }
    padded_bytes(count.checked_mul(std::mem::size_of::<T>())?, std::mem::align_of::<T>())
}

/// Checked form of [`ArenaAllocator::worst_case_bytes`].
fn padded_bytes(size: usize, align: usize) -> Option<usize> {
    size.checked_add(align - 1)
}

fn cast_mut<T: Component>(bytes: &mut [u8], id: ComponentId) -> EcsResult<&mut T> {
    bytemuck::try_from_bytes_mut(bytes).map_err(|_| EcsError::ComponentLayoutMismatch { component: id })
}
