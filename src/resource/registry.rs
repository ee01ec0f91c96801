//! Resource Catalog - Load resource type definitions from JSON
//!
//! This module loads every known resource type's schema from embedded JSON
//! files and provides lookup functions for deserializers and the CLI.

use super::ResourceType;
use crate::value::{RawValue, ValueKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/aws.json")];

/// Expected type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Bool,
    List,
    Object,
    /// Accept any non-null value
    Any,
}

impl FieldKind {
    /// Check whether a (non-null) value matches this kind
    pub fn matches(self, value: &RawValue) -> bool {
        match self {
            FieldKind::String => value.kind() == ValueKind::String,
            FieldKind::Number => value.kind() == ValueKind::Number,
            FieldKind::Bool => value.kind() == ValueKind::Bool,
            FieldKind::List => value.kind() == ValueKind::List,
            FieldKind::Object => value.kind() == ValueKind::Object,
            FieldKind::Any => !value.is_null(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Bool => "bool",
            FieldKind::List => "list",
            FieldKind::Object => "object",
            FieldKind::Any => "any",
        }
    }
}

/// Field definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// The string holds a JSON document that is normalized before comparison
    #[serde(default)]
    pub json_document: bool,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    pub service: String,
    /// Resource type that must be enumerated to list this one
    #[serde(default)]
    pub parent: Option<String>,
    pub id_field: String,
    pub fields: Vec<FieldDef>,
}

impl ResourceDef {
    pub fn parent_type(&self) -> Option<ResourceType> {
        self.parent.as_deref().map(ResourceType::from)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceCatalog {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Catalog loaded from JSON. Read-only after first access.
static CATALOG: OnceLock<ResourceCatalog> = OnceLock::new();

/// Get the resource catalog (loads from embedded JSON on first access)
pub fn get_catalog() -> &'static ResourceCatalog {
    CATALOG.get_or_init(|| {
        let mut final_catalog = ResourceCatalog {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceCatalog = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_catalog.resources.extend(partial.resources);
        }

        final_catalog
    })
}

/// Get a resource definition by type
pub fn get_resource_def(resource_type: &ResourceType) -> Option<&'static ResourceDef> {
    get_catalog().resources.get(resource_type.as_str())
}

/// Get all resource types, sorted
pub fn get_all_resource_types() -> Vec<ResourceType> {
    let mut types: Vec<ResourceType> = get_catalog()
        .resources
        .keys()
        .map(|s| ResourceType::from(s.as_str()))
        .collect();
    types.sort();
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{
        AWS_S3_BUCKET, AWS_S3_BUCKET_ANALYTICS_CONFIGURATION, AWS_SQS_QUEUE, AWS_SQS_QUEUE_POLICY,
    };

    #[test]
    fn test_catalog_loads_successfully() {
        let catalog = get_catalog();
        assert!(!catalog.resources.is_empty(), "Catalog should have resources");
    }

    #[test]
    fn test_known_types_exist() {
        for ty in [
            AWS_S3_BUCKET,
            AWS_S3_BUCKET_ANALYTICS_CONFIGURATION,
            AWS_SQS_QUEUE,
            AWS_SQS_QUEUE_POLICY,
        ] {
            assert!(get_resource_def(&ty).is_some(), "{} should exist", ty);
        }
    }

    #[test]
    fn test_parents_are_declared() {
        let analytics = get_resource_def(&AWS_S3_BUCKET_ANALYTICS_CONFIGURATION).unwrap();
        assert_eq!(analytics.parent_type(), Some(AWS_S3_BUCKET));

        let policy = get_resource_def(&AWS_SQS_QUEUE_POLICY).unwrap();
        assert_eq!(policy.parent_type(), Some(AWS_SQS_QUEUE));

        let queue = get_resource_def(&AWS_SQS_QUEUE).unwrap();
        assert_eq!(queue.parent_type(), None);
    }

    #[test]
    fn test_id_field_is_a_required_string() {
        for (name, def) in &get_catalog().resources {
            let id = def
                .field(&def.id_field)
                .unwrap_or_else(|| panic!("{} has no id field definition", name));
            assert!(id.required, "{} id field should be required", name);
            assert_eq!(id.kind, FieldKind::String);
        }
    }

    #[test]
    fn test_all_types_sorted() {
        let types = get_all_resource_types();
        let mut sorted = types.clone();
        sorted.sort();
        assert_eq!(types, sorted);
        assert!(types.contains(&AWS_SQS_QUEUE));
    }

    #[test]
    fn test_field_kind_matches() {
        assert!(FieldKind::String.matches(&RawValue::from("x")));
        assert!(!FieldKind::String.matches(&RawValue::from(1)));
        assert!(FieldKind::Any.matches(&RawValue::from(false)));
        assert!(!FieldKind::Any.matches(&RawValue::Null));
    }
}
