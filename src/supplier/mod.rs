//! Resource suppliers
//!
//! A supplier enumerates every instance of one resource type:
//!
//! 1. its [`Lister`] asks the cloud API which instances exist
//! 2. one read per instance is fanned out over a [`JobRunner`]
//! 3. the collected values go through the type's [`Deserializer`]
//!
//! The result is all-or-nothing. A listing failure becomes an
//! [`EnumerationError`] naming this type (and the dependency type when a
//! parent listing failed); a read failure aborts the batch and is returned
//! verbatim.
//!
//! - [`registry`] - Holds suppliers and drains them into an inventory
//! - [`factory`] - Maps resource types to supplier constructors

pub mod factory;
pub mod registry;

pub use factory::SupplierFactory;
pub use registry::{Inventory, InventoryReport, SupplierRegistry};

use crate::error::{EnumerationError, RunnerError, SupplyError};
use crate::provider::{read_logged, ReadResourceArgs, ResourceReader};
use crate::resource::{Deserializer, Resource, ResourceId, ResourceType};
use crate::runner::{EnumerationContext, JobRunner};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// One instance to read, as produced by a lister
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTarget {
    pub id: ResourceId,
    /// Hints passed through to the reader (region alias, parent name...)
    pub attributes: BTreeMap<String, String>,
}

impl ReadTarget {
    pub fn new(id: impl Into<ResourceId>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}

/// Why a listing failed
#[derive(Error, Debug)]
pub enum ListError {
    /// The resource type's own listing failed
    #[error(transparent)]
    Direct(anyhow::Error),

    /// Listing a resource type this one depends on failed
    #[error("listing {source_type} failed: {cause:#}")]
    Dependency {
        source_type: ResourceType,
        cause: anyhow::Error,
    },
}

impl ListError {
    pub fn dependency(source_type: ResourceType, cause: anyhow::Error) -> Self {
        ListError::Dependency { source_type, cause }
    }
}

/// Enumerates the identifiers of one resource type through the cloud API
///
/// Pagination must be fully drained before returning.
#[async_trait]
pub trait Lister: Send + Sync {
    async fn list(&self) -> Result<Vec<ReadTarget>, ListError>;
}

/// Something that produces every resource of one type
#[async_trait]
pub trait ResourceSupplier: Send + Sync {
    fn resource_type(&self) -> &ResourceType;

    async fn resources(&self) -> Result<Vec<Resource>, SupplyError>;
}

/// The generic list, read, deserialize supplier
pub struct Supplier<L> {
    resource_type: ResourceType,
    lister: L,
    reader: Arc<dyn ResourceReader>,
    deserializer: Arc<dyn Deserializer>,
    ctx: EnumerationContext,
    parallelism: usize,
}

impl<L: Lister> Supplier<L> {
    pub fn new(
        resource_type: ResourceType,
        lister: L,
        reader: Arc<dyn ResourceReader>,
        deserializer: Arc<dyn Deserializer>,
        ctx: EnumerationContext,
        parallelism: usize,
    ) -> Self {
        debug_assert_eq!(
            deserializer.resource_type(),
            &resource_type,
            "deserializer must produce the supplier's resource type"
        );
        Self {
            resource_type,
            lister,
            reader,
            deserializer,
            ctx,
            parallelism,
        }
    }

    fn enumeration_error(&self, err: ListError) -> SupplyError {
        let err = match err {
            ListError::Direct(cause) => EnumerationError::new(cause, self.resource_type.clone()),
            ListError::Dependency { source_type, cause } => {
                EnumerationError::with_source(cause, self.resource_type.clone(), source_type)
            }
        };
        SupplyError::Enumeration(err)
    }
}

#[async_trait]
impl<L: Lister> ResourceSupplier for Supplier<L> {
    fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    async fn resources(&self) -> Result<Vec<Resource>, SupplyError> {
        let listed = tokio::select! {
            biased;
            _ = self.ctx.cancelled() => {
                return Err(SupplyError::Cancelled(self.resource_type.clone()));
            }
            listed = self.lister.list() => listed,
        };
        let targets = listed.map_err(|err| self.enumeration_error(err))?;
        tracing::debug!("{}: listed {} instances", self.resource_type, targets.len());

        let mut runner = JobRunner::new(self.ctx.clone(), self.parallelism);
        for target in targets {
            let reader = Arc::clone(&self.reader);
            let args = ReadResourceArgs {
                resource_type: self.resource_type.clone(),
                id: target.id,
                attributes: target.attributes,
            };
            runner.submit(move || async move { read_logged(reader.as_ref(), &args).await });
        }

        let values = runner.wait().await.map_err(|err| {
            if matches!(err.downcast_ref::<RunnerError>(), Some(RunnerError::Cancelled)) {
                SupplyError::Cancelled(self.resource_type.clone())
            } else {
                SupplyError::Read(err)
            }
        })?;

        let resources = self.deserializer.deserialize(&values)?;
        tracing::debug!("{}: enumerated {} resources", self.resource_type, resources.len());
        Ok(resources)
    }
}
