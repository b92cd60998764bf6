//! Declarative argument schemas for tools.
//!
//! A tool declares its parameters once as an [`ArgSchema`]. The same value
//! renders the JSON Schema advertised in `tools/list` and validates the raw
//! arguments of every `tools/call` before the handler sees them.

use std::fmt;

use rmcp::model::JsonObject;
use serde::Serialize;
use serde_json::{Value, json};

/// JSON type a parameter must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Number,
    String,
}

impl ArgKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Number => value.is_number(),
            Self::String => value.is_string(),
        }
    }
}

/// One required, named parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
}

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgViolation {
    pub field: String,
    pub expected: &'static str,
    pub received: &'static str,
}

impl fmt::Display for ArgViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, received {}",
            self.field, self.expected, self.received
        )
    }
}

/// Ordered set of required parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgSchema {
    params: Vec<ArgSpec>,
}

impl ArgSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(self, name: &'static str) -> Self {
        self.param(name, ArgKind::Number)
    }

    pub fn string(self, name: &'static str) -> Self {
        self.param(name, ArgKind::String)
    }

    fn param(mut self, name: &'static str, kind: ArgKind) -> Self {
        self.params.push(ArgSpec { name, kind });
        self
    }

    /// Render as a JSON Schema object.
    pub fn to_json_schema(&self) -> JsonObject {
        let mut properties = serde_json::Map::new();
        for spec in &self.params {
            properties.insert(
                spec.name.to_string(),
                json!({ "type": spec.kind.json_type() }),
            );
        }
        let required: Vec<&str> = self.params.iter().map(|p| p.name).collect();

        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), json!(required));
        schema
    }

    /// Check `args` against the declared parameters.
    ///
    /// Every violated field is reported, in declaration order. Keys that are
    /// not declared are ignored.
    pub fn validate(&self, args: &JsonObject) -> Result<(), Vec<ArgViolation>> {
        let violations: Vec<ArgViolation> = self
            .params
            .iter()
            .filter_map(|spec| {
                let received = match args.get(spec.name) {
                    None => "nothing",
                    Some(value) if spec.kind.accepts(value) => return None,
                    Some(value) => json_type_name(value),
                };
                Some(ArgViolation {
                    field: spec.name.to_string(),
                    expected: spec.kind.json_type(),
                    received,
                })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
