//! Canonical JSON-Schema-like value shapes.
//!
//! A [`SchemaModel`] is a finite tree built bottom-up; it never refers back
//! to the declaration it was produced from. Serialization yields the subset of
//! JSON Schema that downstream document builders consume:
//!
//! | model                     | JSON                                    |
//! |---------------------------|-----------------------------------------|
//! | `Primitive(String)`       | `{"type": "string"}`                    |
//! | `Primitive` + date format | `{"type": "string", "format": "date-time"}` |
//! | `MultiType`               | `{"type": ["string", "number"]}`        |
//! | `Enum`                    | `{"type": "string", "enum": ["a", "b"]}` |
//! | `Object`                  | `{"type": "object", "properties": .., "required": ..}` |
//! | `Array`                   | `{"type": "array", "items": ..}`        |
//! | `Alternatives`            | `{"anyOf": [..]}`                       |
//! | `Unconstrained`           | `{}`                                    |

pub mod resolver;

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StringFormat {
    #[serde(rename = "date-time")]
    DateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl LiteralValue {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            LiteralValue::String(_) => PrimitiveKind::String,
            LiteralValue::Number(_) => PrimitiveKind::Number,
            LiteralValue::Boolean(_) => PrimitiveKind::Boolean,
        }
    }
}

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LiteralValue::String(s) => serializer.serialize_str(s),
            LiteralValue::Boolean(b) => serializer.serialize_bool(*b),
            // Integral values print without a trailing `.0`.
            LiteralValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serializer.serialize_i64(*n as i64)
            }
            LiteralValue::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, SchemaModel>,
    pub required: Vec<String>,
}

impl ObjectSchema {
    /// Add or replace a property, keeping `required` consistent.
    pub fn insert(&mut self, name: String, schema: SchemaModel, required: bool) {
        self.required.retain(|r| r != &name);
        if required {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
    }

    /// Merge another object's members over this one.
    pub fn merge(&mut self, other: ObjectSchema) {
        for (name, schema) in other.properties {
            let required = other.required.contains(&name);
            self.insert(name, schema, required);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SchemaModel {
    Primitive {
        kind: PrimitiveKind,
        format: Option<StringFormat>,
    },
    MultiType(Vec<PrimitiveKind>),
    Enum {
        kind: PrimitiveKind,
        values: Vec<LiteralValue>,
    },
    Object(ObjectSchema),
    Array(Box<SchemaModel>),
    Alternatives(Vec<SchemaModel>),
    #[default]
    Unconstrained,
}

impl SchemaModel {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        SchemaModel::Primitive { kind, format: None }
    }

    pub fn string() -> Self {
        Self::primitive(PrimitiveKind::String)
    }

    pub fn number() -> Self {
        Self::primitive(PrimitiveKind::Number)
    }

    pub fn boolean() -> Self {
        Self::primitive(PrimitiveKind::Boolean)
    }

    pub fn null() -> Self {
        Self::primitive(PrimitiveKind::Null)
    }

    pub fn date_time() -> Self {
        SchemaModel::Primitive {
            kind: PrimitiveKind::String,
            format: Some(StringFormat::DateTime),
        }
    }

    pub fn array(items: SchemaModel) -> Self {
        SchemaModel::Array(Box::new(items))
    }

    pub fn bare_object() -> Self {
        SchemaModel::Object(ObjectSchema::default())
    }

    pub fn literal(value: LiteralValue) -> Self {
        SchemaModel::Enum {
            kind: value.kind(),
            values: vec![value],
        }
    }

}

impl Serialize for SchemaModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            SchemaModel::Primitive { kind, format } => {
                map.serialize_entry("type", kind)?;
                if let Some(format) = format {
                    map.serialize_entry("format", format)?;
                }
            }
            SchemaModel::MultiType(kinds) => map.serialize_entry("type", kinds)?,
            SchemaModel::Enum { kind, values } => {
                map.serialize_entry("type", kind)?;
                map.serialize_entry("enum", values)?;
            }
            SchemaModel::Object(object) => {
                map.serialize_entry("type", "object")?;
                if !object.properties.is_empty() {
                    map.serialize_entry("properties", &object.properties)?;
                }
                if !object.required.is_empty() {
                    map.serialize_entry("required", &object.required)?;
                }
            }
            SchemaModel::Array(items) => {
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items)?;
            }
            SchemaModel::Alternatives(members) => map.serialize_entry("anyOf", members)?,
            SchemaModel::Unconstrained => {}
        }
        map.end()
    }
}
