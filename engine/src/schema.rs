//! Draft schemas and validation.
//!
//! A schema lists the fields a draft must carry before it is proposed to the
//! remote. Rules run against the serialized JSON form of the draft, so every
//! record type shares one checker and field names match the wire payload.

use crate::{error::Result, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of value a draft field holds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text. Blank text does not satisfy a required field.
    Text,
    /// Whole number, such as a quantity.
    Integer,
    /// Any number, such as a price.
    Number,
}

impl FieldType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::Text => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
        }
    }
}

/// One field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
}

impl FieldDef {
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    /// Check this field in a draft object.
    pub fn check(&self, draft: &Map<String, Value>) -> Result<()> {
        let value = match draft.get(&self.name) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) if text.trim().is_empty() => None,
            Some(value) => Some(value),
        };

        match value {
            None if self.required => Err(Error::MissingRequiredField(self.name.clone())),
            Some(value) if !self.field_type.accepts(value) => Err(Error::TypeMismatch {
                field: self.name.clone(),
                expected: self.field_type.label().to_string(),
                got: describe(value).to_string(),
            }),
            _ => Ok(()),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field rules for one draft type, checked in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSchema {
    pub fields: Vec<FieldDef>,
}

impl DraftSchema {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    /// Validate a serializable draft, reporting the first failing field.
    pub fn validate<D: Serialize>(&self, draft: &D) -> Result<()> {
        let value = serde_json::to_value(draft).map_err(|e| Error::Validation(e.to_string()))?;
        let Value::Object(object) = value else {
            return Err(Error::Validation("draft must be an object".into()));
        };

        self.fields.iter().try_for_each(|field| field.check(&object))
    }
}
