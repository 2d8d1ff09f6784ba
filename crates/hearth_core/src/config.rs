//! # Capacity Configuration
//!
//! Scene capacities, loaded once at startup from TOML.
//!
//! ```toml
//! entity_capacity = 1024
//!
//! [[component]]
//! id = 2
//! capacity = 64
//! ```
//!
//! Component types without an entry get `entity_capacity` slots.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ecs::{ComponentId, MAX_COMPONENT_TYPES};
use crate::error::{EcsError, EcsResult};

/// Capacity override for one component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCapacity {
    /// Component type index.
    pub id: ComponentId,
    /// Maximum simultaneously-live instances.
    pub capacity: usize,
}

/// Entity and per-component capacities of a scene.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcsConfig {
    /// Number of entity slots.
    pub entity_capacity: usize,
    /// Per-type overrides.
    #[serde(default, rename = "component")]
    pub components: Vec<ComponentCapacity>,
}

impl EcsConfig {
    /// Config with no per-type overrides.
    #[must_use]
    pub fn new(entity_capacity: usize) -> Self {
        Self {
            entity_capacity,
            components: Vec::new(),
        }
    }

    /// Adds or replaces one per-type override.
    #[must_use]
    pub fn with_component_capacity(mut self, id: ComponentId, capacity: usize) -> Self {
        self.components.retain(|c| c.id != id);
        self.components.push(ComponentCapacity { id, capacity });
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML, an entity capacity that does not fit
    /// a slot index, an out-of-range component id, or a duplicated id.
    pub fn from_toml_str(source: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_toml_file(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| EcsError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks capacities and ids.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> EcsResult<()> {
        if self.entity_capacity >= u32::MAX as usize {
            return Err(EcsError::InvalidConfig(format!(
                "entity_capacity {} exceeds the 32-bit index range",
                self.entity_capacity
            )));
        }

        let mut seen = 0u64;
        for entry in &self.components {
            if usize::from(entry.id) >= MAX_COMPONENT_TYPES {
                return Err(EcsError::InvalidConfig(format!(
                    "component id {} out of range",
                    entry.id
                )));
            }
            let bit = 1u64 << entry.id;
            if seen & bit != 0 {
                return Err(EcsError::InvalidConfig(format!(
                    "component id {} listed twice",
                    entry.id
                )));
            }
            seen |= bit;
        }
        Ok(())
    }

    /// Overwrites `capacity` if `id` has an override.
    ///
    /// Shaped to be passed straight to `EntityManager::load` as the
    /// per-type capacity loader.
    pub fn apply_capacity(&self, id: ComponentId, capacity: &mut usize) {
        if let Some(entry) = self.components.iter().find(|c| c.id == id) {
            *capacity = entry.capacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = EcsConfig::from_toml_str(
            r"
            entity_capacity = 256

            [[component]]
            id = 1
            capacity = 16
            ",
        )
        .unwrap();

        assert_eq!(config.entity_capacity, 256);
        let mut capacity = 256;
        config.apply_capacity(1, &mut capacity);
        assert_eq!(capacity, 16);

        let mut untouched = 256;
        config.apply_capacity(0, &mut untouched);
        assert_eq!(untouched, 256);
    }

    #[test]
    fn test_components_optional() {
        let config = EcsConfig::from_toml_str("entity_capacity = 8").unwrap();
        assert_eq!(config, EcsConfig::new(8));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = EcsConfig::from_toml_str(
            r"
            entity_capacity = 8
            [[component]]
            id = 3
            capacity = 1
            [[component]]
            id = 3
            capacity = 2
            ",
        );
        assert!(matches!(result, Err(EcsError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            EcsConfig::from_toml_str("entity_capacity = \"lots\""),
            Err(EcsError::InvalidConfig(_))
        ));
        assert!(matches!(
            EcsConfig::from_toml_str("entity_capacity = 8\n[[component]]\nid = 70\ncapacity = 1"),
            Err(EcsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builder_replaces_override() {
        let config = EcsConfig::new(32)
            .with_component_capacity(2, 4)
            .with_component_capacity(2, 8);
        assert_eq!(config.components.len(), 1);
        let mut capacity = 32;
        config.apply_capacity(2, &mut capacity);
        assert_eq!(capacity, 8);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EcsConfig::from_toml_file("/nonexistent/hearth.toml"),
            Err(EcsError::InvalidConfig(_))
        ));
    }
}
