//! Supplier Registry
//!
//! Explicitly constructed per enumeration run. Suppliers are drained
//! concurrently; a failing resource type never stops the others.

use super::ResourceSupplier;
use crate::error::SupplyError;
use crate::resource::{Resource, ResourceType};
use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

/// Holds the suppliers of one enumeration run
#[derive(Default)]
pub struct SupplierRegistry {
    suppliers: Vec<Box<dyn ResourceSupplier>>,
}

impl SupplierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a supplier. Each resource type may only be registered once.
    pub fn register(&mut self, supplier: Box<dyn ResourceSupplier>) -> Result<()> {
        if self
            .suppliers
            .iter()
            .any(|s| s.resource_type() == supplier.resource_type())
        {
            return Err(anyhow::anyhow!(
                "A supplier for {} is already registered",
                supplier.resource_type()
            ));
        }
        self.suppliers.push(supplier);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.suppliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suppliers.is_empty()
    }

    pub fn resource_types(&self) -> Vec<&ResourceType> {
        self.suppliers.iter().map(|s| s.resource_type()).collect()
    }

    /// Run every supplier and aggregate the outcome
    pub async fn drain(self) -> Inventory {
        let run_id = Uuid::new_v4();
        let scanned_at = Utc::now();
        let span = tracing::info_span!("enumeration", %run_id);

        async move {
            tracing::info!("enumerating {} resource types", self.suppliers.len());

            let outcomes = join_all(self.suppliers.iter().map(|supplier| async move {
                (supplier.resource_type().clone(), supplier.resources().await)
            }))
            .await;

            let mut inventory = Inventory {
                run_id,
                scanned_at,
                resources: Vec::new(),
                errors: Vec::new(),
            };
            for (resource_type, outcome) in outcomes {
                match outcome {
                    Ok(resources) => {
                        tracing::info!("{}: {} resources", resource_type, resources.len());
                        inventory.resources.extend(resources);
                    }
                    Err(err) => {
                        tracing::warn!("{}: {}", resource_type, err);
                        inventory.errors.push((resource_type, err));
                    }
                }
            }

            tracing::info!(
                "enumeration finished: {} resources, {} failed resource types",
                inventory.resources.len(),
                inventory.errors.len()
            );
            inventory
        }
        .instrument(span)
        .await
    }
}

/// Result of one enumeration run
#[derive(Debug)]
pub struct Inventory {
    run_id: Uuid,
    scanned_at: DateTime<Utc>,
    resources: Vec<Resource>,
    errors: Vec<(ResourceType, SupplyError)>,
}

impl Inventory {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn into_resources(self) -> Vec<Resource> {
        self.resources
    }

    /// Resources of a single type
    pub fn resources_of<'a>(
        &'a self,
        resource_type: &'a ResourceType,
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources
            .iter()
            .filter(move |r| r.resource_type() == resource_type)
    }

    pub fn errors(&self) -> &[(ResourceType, SupplyError)] {
        &self.errors
    }

    pub fn error_for(&self, resource_type: &ResourceType) -> Option<&SupplyError> {
        self.errors
            .iter()
            .find(|(ty, _)| ty == resource_type)
            .map(|(_, err)| err)
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Serializable snapshot with errors rendered as messages
    pub fn report(&self) -> InventoryReport<'_> {
        InventoryReport {
            run_id: self.run_id,
            scanned_at: self.scanned_at,
            resources: &self.resources,
            failures: self
                .errors
                .iter()
                .map(|(resource_type, err)| FailureReport {
                    resource_type,
                    source_type: err.as_enumeration().and_then(|e| e.source_type.as_ref()),
                    message: err.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InventoryReport<'a> {
    pub run_id: Uuid,
    pub scanned_at: DateTime<Utc>,
    pub resources: &'a [Resource],
    pub failures: Vec<FailureReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct FailureReport<'a> {
    pub resource_type: &'a ResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<&'a ResourceType>,
    pub message: String,
}
