// Schema descriptors for structured LLM output.
//
// A SchemaDescriptor is what we hand to a provider: field names, types and a
// natural-language description of each field's intent. `coerce` is the pure
// half of structured extraction — it turns whatever JSON the provider sent
// back into a typed instance, or explains why it can't.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use super::error::ExtractionError;

/// JSON type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Boolean,
    String,
}

impl FieldKind {
    fn json_type(self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::String => "string",
        }
    }
}

/// One field of a structured-output schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

/// A named schema sent to the provider. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl SchemaDescriptor {
    /// JSON Schema for the object, as used in function-calling parameters.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(
                field.name.to_string(),
                json!({
                    "type": field.kind.json_type(),
                    "description": field.description,
                }),
            );
        }
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A type that can be requested from an LLM as structured output.
pub trait StructuredOutput: DeserializeOwned {
    fn schema() -> SchemaDescriptor;
}

/// Coerce raw provider output into an instance of `T`.
///
/// Accepts an object, or a string holding an object (some backends
/// double-encode tool-call arguments). Booleans sent as "true"/"false"
/// strings are accepted. Fields outside the schema are ignored.
pub fn coerce<T: StructuredOutput>(raw: Value) -> Result<T, ExtractionError> {
    let schema = T::schema();

    let raw = match raw {
        Value::String(text) => serde_json::from_str::<Value>(text.trim())
            .map_err(|e| ExtractionError::Malformed(format!("not JSON: {e}")))?,
        other => other,
    };

    let Value::Object(object) = raw else {
        return Err(ExtractionError::Malformed(format!(
            "expected an object for `{}`",
            schema.name
        )));
    };

    let mut clean = Map::new();
    for field in &schema.fields {
        let value = match object.get(field.name) {
            None | Some(Value::Null) => {
                return Err(ExtractionError::MissingField(field.name.to_string()))
            }
            Some(v) => v,
        };
        clean.insert(field.name.to_string(), coerce_field(field, value)?);
    }

    serde_json::from_value(Value::Object(clean))
        .map_err(|e| ExtractionError::Malformed(e.to_string()))
}

fn coerce_field(field: &FieldSpec, value: &Value) -> Result<Value, ExtractionError> {
    let mismatch = || {
        ExtractionError::Malformed(format!(
            "field `{}` should be a {}, got {value}",
            field.name,
            field.kind.json_type()
        ))
    };

    match (field.kind, value) {
        (FieldKind::Boolean, Value::Bool(_)) | (FieldKind::String, Value::String(_)) => {
            Ok(value.clone())
        }
        (FieldKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(mismatch()),
        },
        _ => Err(mismatch()),
    }
}
