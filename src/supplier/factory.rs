//! Supplier Factory
//!
//! Maps resource types to the functions that build their suppliers, so a run
//! can instantiate every known type or just a filtered subset.

use super::{ResourceSupplier, SupplierRegistry};
use crate::resource::ResourceType;
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// Builds the supplier of one resource type from shared dependencies `D`
pub type SupplierConstructor<D> = fn(&D) -> Result<Box<dyn ResourceSupplier>>;

pub struct SupplierFactory<D> {
    constructors: BTreeMap<ResourceType, SupplierConstructor<D>>,
}

impl<D> Default for SupplierFactory<D> {
    fn default() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }
}

impl<D> SupplierFactory<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for a resource type
    pub fn register(&mut self, resource_type: ResourceType, constructor: SupplierConstructor<D>) {
        self.constructors.insert(resource_type, constructor);
    }

    pub fn contains(&self, resource_type: &ResourceType) -> bool {
        self.constructors.contains_key(resource_type)
    }

    /// Known resource types, sorted
    pub fn resource_types(&self) -> Vec<&ResourceType> {
        self.constructors.keys().collect()
    }

    /// Build the supplier of one resource type
    pub fn build(&self, resource_type: &ResourceType, deps: &D) -> Result<Box<dyn ResourceSupplier>> {
        let Some(constructor) = self.constructors.get(resource_type) else {
            return Err(anyhow::anyhow!("Unknown resource type: {}", resource_type));
        };
        constructor(deps).with_context(|| format!("Failed to build supplier for {}", resource_type))
    }

    /// Build a registry with every known type, or only the `only` subset
    ///
    /// Unknown types in `only` are rejected before anything is built.
    pub fn build_registry(&self, only: Option<&[ResourceType]>, deps: &D) -> Result<SupplierRegistry> {
        let selected: Vec<&ResourceType> = match only {
            Some(types) => {
                if let Some(unknown) = types.iter().find(|ty| !self.contains(ty)) {
                    return Err(anyhow::anyhow!("Unknown resource type: {}", unknown));
                }
                types.iter().collect()
            }
            None => self.resource_types(),
        };

        let mut registry = SupplierRegistry::new();
        for resource_type in selected {
            if registry.resource_types().contains(&resource_type) {
                continue;
            }
            registry.register(self.build(resource_type, deps)?)?;
        }
        Ok(registry)
    }
}
