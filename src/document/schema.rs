//! Schema nodes
//!
//! A schema is either a `$ref` to a named component or an inline node with
//! its own properties, items and composition branches.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::SCHEMA_REF_PREFIX;

/// `type` keyword: a single name (3.0) or a list of names (3.1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaType {
    /// Does the type list include `name`?
    pub fn is(&self, name: &str) -> bool {
        match self {
            Self::Single(t) => t == name,
            Self::Multiple(ts) => ts.iter().any(|t| t == name),
        }
    }

    /// Type names other than `null`
    pub fn non_null(&self) -> Vec<&str> {
        match self {
            Self::Single(t) => vec![t.as_str()],
            Self::Multiple(ts) => ts.iter().map(String::as_str).filter(|t| *t != "null").collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub mapping: IndexMap<String, String>,
}

/// `additionalProperties`: a flag or a value schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

impl AdditionalProperties {
    /// `true` or `{}`: any value is accepted
    pub fn is_free_form(&self) -> bool {
        match self {
            Self::Allowed(allowed) => *allowed,
            Self::Schema(schema) => schema.is_empty(),
        }
    }
}

// =============================================================================
// Enum values
// =============================================================================

/// One entry of an `enum` list, tagged by JSON kind when the document loads
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<EnumValue>),
    Object(serde_json::Map<String, serde_json::Value>),
}

/// Coarse kind of an enum value, for mixed-type detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnumKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl EnumValue {
    pub fn kind(&self) -> EnumKind {
        match self {
            Self::Null => EnumKind::Null,
            Self::Bool(_) => EnumKind::Bool,
            Self::Number(_) => EnumKind::Number,
            Self::String(_) => EnumKind::String,
            Self::Array(_) => EnumKind::Array,
            Self::Object(_) => EnumKind::Object,
        }
    }
}

impl From<serde_json::Value> for EnumValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(EnumValue::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(map),
        }
    }
}

impl From<&EnumValue> for serde_json::Value {
    fn from(value: &EnumValue) -> Self {
        match value {
            EnumValue::Null => serde_json::Value::Null,
            EnumValue::Bool(b) => serde_json::Value::Bool(*b),
            EnumValue::Number(n) => serde_json::Value::Number(n.clone()),
            EnumValue::String(s) => serde_json::Value::String(s.clone()),
            EnumValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            EnumValue::Object(map) => serde_json::Value::Object(map.clone()),
        }
    }
}

impl<'de> Deserialize<'de> for EnumValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(EnumValue::from)
    }
}

impl Serialize for EnumValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::Value::from(self).serialize(serializer)
    }
}

// =============================================================================
// Schema
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    /// `None` when the keyword is absent, `Some(vec![])` for `enum: []`
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<EnumValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

impl Schema {
    /// Reference node pointing at `target`
    pub fn reference_to(target: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", SCHEMA_REF_PREFIX, target)),
            ..Default::default()
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Target identifier of a reference node: the component name for local
    /// refs, the raw ref string otherwise
    pub fn reference_target(&self) -> Option<&str> {
        let reference = self.reference.as_deref()?;
        Some(reference.strip_prefix(SCHEMA_REF_PREFIX).unwrap_or(reference))
    }

    /// Is this a `#/components/schemas/...` reference?
    pub fn is_local_reference(&self) -> bool {
        self.reference
            .as_deref()
            .map(|r| r.starts_with(SCHEMA_REF_PREFIX))
            .unwrap_or(false)
    }

    pub fn is_type(&self, name: &str) -> bool {
        self.schema_type.as_ref().map(|t| t.is(name)).unwrap_or(false)
    }

    /// Object-shaped: typed `object`, or untyped with properties
    pub fn is_object_like(&self) -> bool {
        self.is_type("object") || (self.schema_type.is_none() && !self.properties.is_empty())
    }

    pub fn has_composition(&self) -> bool {
        !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty()
    }

    /// Carries no structural information at all (`{}`)
    pub fn is_empty(&self) -> bool {
        self.reference.is_none()
            && self.schema_type.is_none()
            && self.format.is_none()
            && self.properties.is_empty()
            && self.items.is_none()
            && !self.has_composition()
            && self.enum_values.is_none()
            && self.additional_properties.is_none()
            && self.discriminator.is_none()
    }

    pub fn is_binary_string(&self) -> bool {
        self.is_type("string")
            && matches!(self.format.as_deref(), Some("binary") | Some("byte"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_values_are_tagged() {
        let schema: Schema = serde_json::from_value(json!({
            "enum": ["a", 1, true, null, [1, 2]]
        }))
        .unwrap();
        let kinds: Vec<_> = schema.enum_values.unwrap().iter().map(EnumValue::kind).collect();
        assert_eq!(
            kinds,
            vec![EnumKind::String, EnumKind::Number, EnumKind::Bool, EnumKind::Null, EnumKind::Array]
        );
    }

    #[test]
    fn test_absent_vs_empty_enum() {
        let absent: Schema = serde_json::from_value(json!({ "type": "string" })).unwrap();
        let empty: Schema = serde_json::from_value(json!({ "enum": [] })).unwrap();
        assert!(absent.enum_values.is_none());
        assert_eq!(empty.enum_values, Some(vec![]));
    }

    #[test]
    fn test_reference_target() {
        let local = Schema::reference_to("Pet");
        assert_eq!(local.reference_target(), Some("Pet"));
        assert!(local.is_local_reference());

        let external: Schema =
            serde_json::from_value(json!({ "$ref": "other.yaml#/Pet" })).unwrap();
        assert_eq!(external.reference_target(), Some("other.yaml#/Pet"));
        assert!(!external.is_local_reference());
    }

    #[test]
    fn test_type_list() {
        let schema: Schema = serde_json::from_value(json!({ "type": ["string", "null"] })).unwrap();
        assert!(schema.is_type("string"));
        assert!(schema.is_type("null"));
        assert_eq!(schema.schema_type.unwrap().non_null(), vec!["string"]);
    }

    #[test]
    fn test_additional_properties_forms() {
        let flag: Schema =
            serde_json::from_value(json!({ "additionalProperties": true })).unwrap();
        let nested: Schema =
            serde_json::from_value(json!({ "additionalProperties": { "type": "string" } })).unwrap();
        assert!(flag.additional_properties.unwrap().is_free_form());
        assert!(!nested.additional_properties.unwrap().is_free_form());
    }

    #[test]
    fn test_empty_schema() {
        assert!(Schema::default().is_empty());
        assert!(!Schema::reference_to("Pet").is_empty());
    }
}
