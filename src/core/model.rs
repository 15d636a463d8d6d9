//! Intermediate model handed to downstream document builders.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::core::schema::SchemaModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertySource {
    Decorator,
    Factory,
    Shape,
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventSource {
    Documentation,
    Callback,
    Dispatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub name: String,
    pub external_name: String,
    pub schema: SchemaModel,
    pub required: bool,
    pub source_kind: PropertySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDescriptor {
    pub name: String,
    /// Constructor of the event value, e.g. `CustomEvent`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_schema: Option<SchemaModel>,
    pub source_kind: EventSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bubbles: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub tag_name: String,
    /// Name of the implementing declaration.
    pub implementation_ref: String,
    pub module_path: String,
    pub properties: Vec<PropertyDescriptor>,
    pub events: Vec<EventDescriptor>,
}

impl ComponentDefinition {
    /// Object schema of the component's properties, keyed by field name.
    #[cfg(test)]
    pub fn props_schema(&self) -> SchemaModel {
        let mut object = crate::core::schema::ObjectSchema::default();
        for property in &self.properties {
            object.insert(property.name.clone(), property.schema.clone(), property.required);
        }
        SchemaModel::Object(object)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationConfig {
    pub remote_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposes: Option<IndexMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub bundler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federation: Option<FederationConfig>,
}

impl RuntimeConfig {
    pub fn unknown() -> Self {
        Self {
            bundler: "unknown".to_string(),
            federation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntermediateModel {
    pub runtime: RuntimeConfig,
    pub components: Vec<ComponentDefinition>,
}
