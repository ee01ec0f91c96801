//! Declarative provider bridge
//!
//! A [`ResourceReader`] asks an external declarative-infrastructure provider
//! for the live state of one resource instance. The provider knows every
//! resource type's schema; this crate only sees the resulting [`RawValue`].
//!
//! - [`http`] - Reader speaking JSON over HTTP to a provider gateway

pub mod http;

pub use http::HttpResourceReader;

use crate::resource::{ResourceId, ResourceType};
use crate::value::RawValue;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Arguments of a single read request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResourceArgs {
    pub resource_type: ResourceType,
    pub id: ResourceId,
    /// Extra provider hints, e.g. `alias` naming the region to read from
    pub attributes: BTreeMap<String, String>,
}

impl ReadResourceArgs {
    pub fn new(resource_type: ResourceType, id: ResourceId) -> Self {
        Self {
            resource_type,
            id,
            attributes: BTreeMap::new(),
        }
    }
}

/// Reads the current state of one resource instance
///
/// Implementations must be safe to call concurrently for the same resource
/// type. Failures (transport or semantic) are returned as-is; no retries.
#[async_trait]
pub trait ResourceReader: Send + Sync {
    async fn read_resource(&self, args: &ReadResourceArgs) -> Result<RawValue>;
}

/// Read a resource, logging the resource type on failure
pub async fn read_logged(reader: &dyn ResourceReader, args: &ReadResourceArgs) -> Result<RawValue> {
    match reader.read_resource(args).await {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::error!(
                resource_type = %args.resource_type,
                id = %args.id,
                "read failed: {:#}",
                err
            );
            Err(err)
        }
    }
}
