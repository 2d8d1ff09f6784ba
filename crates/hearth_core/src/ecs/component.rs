//! # Component Types
//!
//! Components are plain data records with no behavior. The core never sees
//! their Rust types; it stores each one as `size` bytes at `align` inside a
//! per-type pool, as described by the [`ComponentRegistry`].
//!
//! The registry is filled once at startup and only read afterwards. Managers
//! borrow it, so it cannot change or unload underneath them.

use bytemuck::Pod;

use crate::error::{EcsError, EcsResult};

/// Index of a registered component type (0-63).
pub type ComponentId = u8;

/// Most component types a registry can hold (one bit each in a `Signature`).
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Sets non-zero defaults on freshly zeroed component bytes.
pub type DefaultsFn = fn(&mut [u8]);

/// Marker trait for typed component access.
///
/// Components must be:
/// - `Pod`: Plain old data, valid for any bit pattern, safe to view as bytes
/// - `Send + Sync + 'static`: No borrowed or thread-bound data
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// #[repr(C)]
/// struct Health {
///     current: i32,
///     max: i32,
/// }
///
/// impl Component for Health {
///     const ID: ComponentId = 0;
///
///     fn init_defaults(&mut self) {
///         self.current = 100;
///         self.max = 100;
///     }
/// }
/// ```
pub trait Component: Pod + Send + Sync + 'static {
    /// Registry index of this component type.
    const ID: ComponentId;

    /// Called on the zeroed value right after it is attached.
    fn init_defaults(&mut self) {}
}

/// Byte layout and initializer of one component type.
#[derive(Clone, Copy, Debug)]
pub struct ComponentTypeInfo {
    /// Size of one instance in bytes.
    pub size: usize,
    /// Alignment of one instance in bytes.
    pub align: usize,
    /// Runs after zeroing on attach. `None` leaves the bytes zeroed.
    pub init_defaults: Option<DefaultsFn>,
}

impl ComponentTypeInfo {
    /// An unfilled entry. Loaders must never return this.
    pub const EMPTY: Self = Self {
        size: 0,
        align: 0,
        init_defaults: None,
    };

    /// Layout with zero-initialization only.
    #[must_use]
    pub const fn new(size: usize, align: usize) -> Self {
        Self {
            size,
            align,
            init_defaults: None,
        }
    }

    /// Adds a defaults initializer.
    #[must_use]
    pub const fn with_defaults(mut self, init: DefaultsFn) -> Self {
        self.init_defaults = Some(init);
        self
    }

    /// Layout and initializer of a typed component.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::new(std::mem::size_of::<T>(), std::mem::align_of::<T>())
            .with_defaults(init_typed_defaults::<T>)
    }

    /// Whether every field is unset.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0 && self.align == 0 && self.init_defaults.is_none()
    }

    /// Whether `T` has exactly this layout.
    #[inline]
    #[must_use]
    pub fn matches<T: Pod>(&self) -> bool {
        self.size == std::mem::size_of::<T>() && self.align == std::mem::align_of::<T>()
    }
}

fn init_typed_defaults<T: Component>(bytes: &mut [u8]) {
    bytemuck::from_bytes_mut::<T>(bytes).init_defaults();
}

/// Table of component layouts, indexed by [`ComponentId`].
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = ComponentRegistry::new();
/// registry.load(2, |id| match id {
///     Health::ID => ComponentTypeInfo::of::<Health>(),
///     Sprite::ID => ComponentTypeInfo::of::<Sprite>(),
///     _ => ComponentTypeInfo::EMPTY,
/// })?;
/// ```
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    /// One entry per type index.
    types: Vec<ComponentTypeInfo>,
    /// Set by `load`, cleared by `unload`.
    loaded: bool,
}

impl ComponentRegistry {
    /// Creates an unloaded registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the table by calling `loader` once per type index.
    ///
    /// Every entry is validated before the registry is marked loaded; on error
    /// the registry stays unloaded.
    ///
    /// # Errors
    ///
    /// - `RegistryAlreadyLoaded` if called twice without `unload`
    /// - `TooManyComponentTypes` if `type_count` exceeds [`MAX_COMPONENT_TYPES`]
    /// - `UnfilledComponentType` if the loader returned an empty entry
    /// - `InvalidComponentLayout` for a zero or non-power-of-two alignment, or
    ///   a size that is not a multiple of the alignment
    pub fn load<F>(&mut self, type_count: usize, mut loader: F) -> EcsResult<()>
    where
        F: FnMut(ComponentId) -> ComponentTypeInfo,
    {
        if self.loaded {
            return Err(EcsError::RegistryAlreadyLoaded);
        }
        if type_count > MAX_COMPONENT_TYPES {
            return Err(EcsError::TooManyComponentTypes {
                requested: type_count,
                max: MAX_COMPONENT_TYPES,
            });
        }

        let mut types = Vec::with_capacity(type_count);
        for id in (0..type_count).map(|i| i as ComponentId) {
            let info = loader(id);
            if info.is_empty() {
                return Err(EcsError::UnfilledComponentType(id));
            }
            if !info.align.is_power_of_two() || info.size % info.align != 0 {
                return Err(EcsError::InvalidComponentLayout {
                    component: id,
                    size: info.size,
                    align: info.align,
                });
            }
            types.push(info);
        }

        tracing::debug!(type_count, "component registry loaded");
        self.types = types;
        self.loaded = true;
        Ok(())
    }

    /// Drops the table. The registry can be loaded again afterwards.
    pub fn unload(&mut self) {
        self.types = Vec::new();
        self.loaded = false;
    }

    /// Whether `load` has succeeded since creation or the last `unload`.
    #[inline]
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of registered types.
    #[inline]
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Layout of one registered type.
    ///
    /// # Errors
    ///
    /// `RegistryNotLoaded` or `UnregisteredComponent`.
    pub fn type_info(&self, id: ComponentId) -> EcsResult<&ComponentTypeInfo> {
        if !self.loaded {
            return Err(EcsError::RegistryNotLoaded);
        }
        self.types
            .get(usize::from(id))
            .ok_or(EcsError::UnregisteredComponent(id))
    }

    /// Iterates over `(id, info)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &ComponentTypeInfo)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, info)| (i as ComponentId, info))
    }
}
