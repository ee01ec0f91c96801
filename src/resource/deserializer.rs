//! Resource Deserializer
//!
//! Maps provider values onto canonical [`Resource`] records, checking each
//! field against the resource type's schema from the catalog.

use super::registry::{get_resource_def, ResourceDef};
use super::{Resource, ResourceId, ResourceType};
use crate::error::DeserializeError;
use crate::value::RawValue;
use std::collections::BTreeMap;

/// Converts provider values of one resource type into canonical resources
pub trait Deserializer: Send + Sync {
    fn resource_type(&self) -> &ResourceType;

    /// Deserialize a batch of values. Inputs are never modified.
    fn deserialize(&self, values: &[RawValue]) -> Result<Vec<Resource>, DeserializeError>;
}

/// Deserializer driven by a [`ResourceDef`] schema
///
/// - required fields must be present and non-null
/// - optional fields that are absent or null are left out
/// - values must match the declared field kind, no coercion
/// - JSON document strings are normalized (keys sorted, whitespace removed)
/// - fields outside the schema are dropped
#[derive(Debug, Clone)]
pub struct SchemaDeserializer {
    resource_type: ResourceType,
    def: ResourceDef,
}

impl SchemaDeserializer {
    /// Create a deserializer from the embedded catalog
    pub fn new(resource_type: ResourceType) -> Result<Self, DeserializeError> {
        let def = get_resource_def(&resource_type)
            .ok_or_else(|| DeserializeError::UnknownType(resource_type.clone()))?;
        Ok(Self::with_def(resource_type, def.clone()))
    }

    pub fn with_def(resource_type: ResourceType, def: ResourceDef) -> Self {
        Self { resource_type, def }
    }

    fn deserialize_one(&self, value: &RawValue) -> Result<Resource, DeserializeError> {
        let Some(object) = value.as_object() else {
            return Err(DeserializeError::NotAnObject {
                resource_type: self.resource_type.clone(),
                found: value.kind(),
            });
        };

        let mut attributes = BTreeMap::new();
        for field in &self.def.fields {
            let present = object.get(&field.name).filter(|v| !v.is_null());
            let Some(field_value) = present else {
                if field.required {
                    return Err(DeserializeError::MissingField {
                        resource_type: self.resource_type.clone(),
                        field: field.name.clone(),
                    });
                }
                continue;
            };

            if !field.kind.matches(field_value) {
                return Err(DeserializeError::UnexpectedType {
                    resource_type: self.resource_type.clone(),
                    field: field.name.clone(),
                    expected: field.kind.name(),
                    found: field_value.kind(),
                });
            }

            let field_value = if field.json_document {
                self.normalize_document(&field.name, field_value)?
            } else {
                field_value.clone()
            };
            attributes.insert(field.name.clone(), field_value);
        }

        let id = attributes
            .get(&self.def.id_field)
            .and_then(RawValue::as_str)
            .map(ResourceId::from)
            .ok_or_else(|| DeserializeError::MissingField {
                resource_type: self.resource_type.clone(),
                field: self.def.id_field.clone(),
            })?;

        Ok(Resource::new(self.resource_type.clone(), id, attributes))
    }

    /// Re-serialize a JSON document string in canonical form
    ///
    /// Empty strings are kept as-is: providers report an unset policy as "".
    fn normalize_document(&self, field: &str, value: &RawValue) -> Result<RawValue, DeserializeError> {
        let Some(text) = value.as_str() else {
            return Ok(value.clone());
        };
        if text.trim().is_empty() {
            return Ok(RawValue::from(""));
        }

        let document: serde_json::Value =
            serde_json::from_str(text).map_err(|e| DeserializeError::InvalidDocument {
                resource_type: self.resource_type.clone(),
                field: field.to_string(),
                message: e.to_string(),
            })?;
        let canonical =
            serde_json::to_string(&document).map_err(|e| DeserializeError::InvalidDocument {
                resource_type: self.resource_type.clone(),
                field: field.to_string(),
                message: e.to_string(),
            })?;
        Ok(RawValue::from(canonical))
    }
}

impl Deserializer for SchemaDeserializer {
    fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    fn deserialize(&self, values: &[RawValue]) -> Result<Vec<Resource>, DeserializeError> {
        let mut resources = values
            .iter()
            .map(|value| self.deserialize_one(value))
            .collect::<Result<Vec<_>, _>>()?;
        // Runner output has no order; sort for stable output
        resources.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(resources)
    }
}
