//! driftscan - enumerate the live state of a cloud account
//!
//! For every supported resource type, driftscan lists the existing instances
//! through the native cloud API, reads each one's full state through a
//! declarative-infrastructure provider, and returns canonical [`Resource`]
//! records ready to be compared against declared infrastructure.
//!
//! # Module Structure
//!
//! - [`runner`] - Bounded, fail-fast job runner and cancellation context
//! - [`provider`] - Reader bridge to the declarative provider
//! - [`resource`] - Canonical model, type catalog and deserializers
//! - [`supplier`] - Per-type supplier, registry and factory
//! - [`aws`] - AWS listers and SDK clients
//! - [`config`] - Persistent configuration

pub mod aws;
pub mod config;
pub mod error;
pub mod provider;
pub mod resource;
pub mod runner;
pub mod supplier;
pub mod value;

pub use error::{DeserializeError, EnumerationError, RunnerError, SupplyError};
pub use resource::{Resource, ResourceId, ResourceType};
pub use runner::{EnumerationContext, JobRunner};
pub use supplier::{Inventory, ResourceSupplier, Supplier, SupplierRegistry};
pub use value::RawValue;
