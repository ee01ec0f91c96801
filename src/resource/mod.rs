//! Canonical resource model
//!
//! Every resource type enumerated from the cloud account ends up as a
//! [`Resource`]: a type tag, an identifier, and an ordered attribute map.
//! Downstream drift comparison only ever sees this shape.
//!
//! # Architecture
//!
//! - [`registry`] - Loads the resource type catalog from embedded JSON
//! - [`deserializer`] - Turns provider values into canonical resources
//!
//! # Resource Definitions
//!
//! Resource types are described in JSON files under `src/resources/`:
//! - `aws.json` - S3 buckets, S3 bucket analytics, SQS queues and policies

pub mod deserializer;
mod registry;

pub use deserializer::{Deserializer, SchemaDeserializer};
pub use registry::*;

use crate::value::RawValue;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

pub const AWS_S3_BUCKET: ResourceType = ResourceType::from_static("aws_s3_bucket");
pub const AWS_S3_BUCKET_ANALYTICS_CONFIGURATION: ResourceType =
    ResourceType::from_static("aws_s3_bucket_analytics_configuration");
pub const AWS_SQS_QUEUE: ResourceType = ResourceType::from_static("aws_sqs_queue");
pub const AWS_SQS_QUEUE_POLICY: ResourceType = ResourceType::from_static("aws_sqs_queue_policy");

/// Identifier of a resource kind, e.g. `aws_sqs_queue`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(Cow<'static, str>);

impl ResourceType {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceType {
    fn from(name: &str) -> Self {
        Self(Cow::Owned(name.to_string()))
    }
}

impl From<String> for ResourceType {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// Identifier of one resource instance within its type
///
/// Scoped identifiers join parent and child with a colon,
/// e.g. `my-bucket:analytics-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build a child identifier scoped under its parent
    pub fn scoped(parent: &str, child: &str) -> Self {
        Self(format!("{}:{}", parent, child))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A canonical resource record
///
/// Immutable once built; identity is `(type, id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    resource_type: ResourceType,
    id: ResourceId,
    attributes: BTreeMap<String, RawValue>,
}

impl Resource {
    pub fn new(
        resource_type: ResourceType,
        id: ResourceId,
        attributes: BTreeMap<String, RawValue>,
    ) -> Self {
        Self {
            resource_type,
            id,
            attributes,
        }
    }

    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn attributes(&self) -> &BTreeMap<String, RawValue> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&RawValue> {
        self.attributes.get(name)
    }

    /// Resource key (`type:id`), unique within one inventory
    pub fn key(&self) -> String {
        format!("{}:{}", self.resource_type, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_and_owned_types_compare_equal() {
        assert_eq!(AWS_SQS_QUEUE, ResourceType::from("aws_sqs_queue"));
        assert_eq!(AWS_SQS_QUEUE.to_string(), "aws_sqs_queue");
    }

    #[test]
    fn test_scoped_id() {
        let id = ResourceId::scoped("bucket-martin-test-drift", "Analytics_Bucket1");
        assert_eq!(id.as_str(), "bucket-martin-test-drift:Analytics_Bucket1");
    }

    #[test]
    fn test_resource_serializes_with_type_key() {
        let mut attributes = BTreeMap::new();
        attributes.insert("name".to_string(), RawValue::from("foo"));
        let resource = Resource::new(AWS_SQS_QUEUE, ResourceId::from("q1"), attributes);

        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["type"], "aws_sqs_queue");
        assert_eq!(json["id"], "q1");
        assert_eq!(json["attributes"]["name"], "foo");
        assert_eq!(resource.key(), "aws_sqs_queue:q1");
    }
}
