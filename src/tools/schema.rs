//! Structural schemas and argument validation.
//!
//! Each tool declares an [`ObjectSchema`] describing the shape of its
//! arguments. Incoming argument payloads are checked against that schema
//! before any handler runs; on success the payload is projected onto a
//! concrete argument struct via [`ValidatedArguments::parse`], so handler
//! code never touches untyped JSON.
//!
//! Validation is forward-compatible: fields the schema does not know about
//! are ignored rather than rejected.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::tools::error::ToolError;

/// The primitive types a schema field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A JSON string.
    String,
    /// A JSON integer (no fractional part).
    Integer,
    /// Any JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
}

impl FieldType {
    /// The JSON Schema type keyword for this field type.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Checks whether `value` conforms to this type.
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }

    /// A short name for `value`'s actual JSON type, for error messages.
    fn name_of(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

/// One declared field of an object schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Declared type.
    pub ty: FieldType,
    /// Human-readable description, surfaced in discovery.
    pub description: Option<String>,
    /// Whether the field must be present.
    pub required: bool,
    /// Value substituted when an optional field is omitted.
    pub default: Option<Value>,
}

/// A structural schema for a tool's argument object.
///
/// Field declaration order is preserved and reproduced byte-for-byte in the
/// discovery response.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: IndexMap<String, FieldSpec>,
}

impl ObjectSchema {
    /// Creates an empty schema (a tool taking no arguments).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a required field.
    #[must_use]
    pub fn required(mut self, name: &str, ty: FieldType, description: &str) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldSpec {
                ty,
                description: Some(description.to_string()),
                required: true,
                default: None,
            },
        );
        self
    }

    /// Declares an optional field without a default.
    #[must_use]
    pub fn optional(mut self, name: &str, ty: FieldType, description: &str) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldSpec {
                ty,
                description: Some(description.to_string()),
                required: false,
                default: None,
            },
        );
        self
    }

    /// Declares an optional field with a default applied when omitted.
    #[must_use]
    pub fn with_default(
        mut self,
        name: &str,
        ty: FieldType,
        description: &str,
        default: Value,
    ) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldSpec {
                ty,
                description: Some(description.to_string()),
                required: false,
                default: Some(default),
            },
        );
        self
    }

    /// Renders this schema as a JSON Schema object for discovery.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for (name, spec) in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".to_string(), json!(spec.ty.keyword()));
            if let Some(desc) = &spec.description {
                prop.insert("description".to_string(), json!(desc));
            }
            if let Some(default) = &spec.default {
                prop.insert("default".to_string(), default.clone());
            }
            properties.insert(name.clone(), Value::Object(prop));

            if spec.required {
                required.push(json!(name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Validates an untyped argument payload against this schema.
    ///
    /// Every violation is collected, not just the first: the resulting
    /// `InvalidParams` message names each offending field. Unknown fields
    /// are ignored. Defaults are applied for omitted optional fields.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidParams`] if the payload is not an object,
    /// a required field is missing, or any field has the wrong type.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedArguments, ToolError> {
        let Some(object) = raw.as_object() else {
            return Err(ToolError::InvalidParams(format!(
                "arguments must be an object, got {}",
                FieldType::name_of(raw)
            )));
        };

        let mut violations: Vec<String> = Vec::new();
        let mut validated = Map::new();

        for (name, spec) in &self.fields {
            match object.get(name) {
                Some(value) if spec.ty.matches(value) => {
                    validated.insert(name.clone(), value.clone());
                }
                Some(value) => {
                    violations.push(format!(
                        "{name}: expected {}, got {}",
                        spec.ty.keyword(),
                        FieldType::name_of(value)
                    ));
                }
                None if spec.required => {
                    violations.push(format!("{name}: required field is missing"));
                }
                None => {
                    if let Some(default) = &spec.default {
                        validated.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(ValidatedArguments(validated))
        } else {
            Err(ToolError::InvalidParams(violations.join("; ")))
        }
    }
}

/// A schema-conformant argument payload for one specific tool.
///
/// Created only by [`ObjectSchema::validate`]; holds exactly the declared
/// fields (unknown input fields dropped, defaults filled in).
#[derive(Debug, Clone)]
pub struct ValidatedArguments(Map<String, Value>);

impl ValidatedArguments {
    /// Projects the validated payload onto a concrete argument struct.
    ///
    /// Schema conformance makes this infallible for a correctly declared
    /// argument struct; a mismatch between schema and struct is a server
    /// bug and surfaces as a handler failure.
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error if the projection fails.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    /// The validated payload as a JSON value.
    #[must_use]
    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
