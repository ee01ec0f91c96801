//! Enumeration error types

use crate::resource::ResourceType;
use crate::value::ValueKind;
use std::fmt;
use thiserror::Error;

/// A resource type could not be enumerated
///
/// `source_type` is set when the failure happened while resolving a resource
/// type that `target_type` depends on (listing buckets while enumerating
/// bucket analytics, for instance). When it is `None` the target itself could
/// not be listed.
#[derive(Debug)]
pub struct EnumerationError {
    pub cause: anyhow::Error,
    pub target_type: ResourceType,
    pub source_type: Option<ResourceType>,
}

impl EnumerationError {
    pub fn new(cause: anyhow::Error, target_type: ResourceType) -> Self {
        Self {
            cause,
            target_type,
            source_type: None,
        }
    }

    pub fn with_source(
        cause: anyhow::Error,
        target_type: ResourceType,
        source_type: ResourceType,
    ) -> Self {
        Self {
            cause,
            target_type,
            source_type: Some(source_type),
        }
    }
}

impl fmt::Display for EnumerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_type {
            Some(source) => write!(
                f,
                "{} could not be enumerated because {} failed: {:#}",
                self.target_type, source, self.cause
            ),
            None => write!(
                f,
                "{} could not be enumerated: {:#}",
                self.target_type, self.cause
            ),
        }
    }
}

impl std::error::Error for EnumerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let cause: &(dyn std::error::Error + 'static) = self.cause.as_ref();
        Some(cause)
    }
}

/// Failures raised by the job runner itself rather than by a job
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("enumeration cancelled")]
    Cancelled,

    #[error("job panicked: {0}")]
    JobPanicked(String),
}

/// A provider value could not be mapped to a canonical resource
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeserializeError {
    #[error("no schema for resource type {0}")]
    UnknownType(ResourceType),

    #[error("{resource_type}: expected an object, found {found}")]
    NotAnObject {
        resource_type: ResourceType,
        found: ValueKind,
    },

    #[error("{resource_type}: missing required field `{field}`")]
    MissingField {
        resource_type: ResourceType,
        field: String,
    },

    #[error("{resource_type}: field `{field}` should be {expected}, found {found}")]
    UnexpectedType {
        resource_type: ResourceType,
        field: String,
        expected: &'static str,
        found: ValueKind,
    },

    #[error("{resource_type}: field `{field}` is not a valid JSON document: {message}")]
    InvalidDocument {
        resource_type: ResourceType,
        field: String,
        message: String,
    },
}

/// Everything a supplier can fail with
#[derive(Error, Debug)]
pub enum SupplyError {
    /// Listing failed, directly or through a dependency
    #[error(transparent)]
    Enumeration(#[from] EnumerationError),

    /// A read failed during fan-out; the first read error, unwrapped
    #[error(transparent)]
    Read(anyhow::Error),

    #[error(transparent)]
    Deserialize(#[from] DeserializeError),

    #[error("enumeration of {0} was cancelled")]
    Cancelled(ResourceType),
}

impl SupplyError {
    pub fn as_enumeration(&self) -> Option<&EnumerationError> {
        match self {
            SupplyError::Enumeration(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SupplyError::Cancelled(_))
    }
}
