//! JSON records and schema configuration files.
//!
//! Lets the query language run over `serde_json` objects whose queryable
//! fields are described in a configuration file:
//!
//! ```json
//! {
//!   "entity": "media",
//!   "default_field": "title",
//!   "fields": [
//!     { "name": "title", "type": "string" },
//!     { "name": "rating", "type": "int" },
//!     { "name": "length", "type": "duration" },
//!     { "name": "genre", "type": "enum", "variants": ["Jazz", "Rock"] },
//!     { "name": "file_path", "queryable": false }
//!   ]
//! }
//! ```

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    schema::{EntitySchema, FieldDeclaration, SchemaDeclaration, SchemaError, TypeClass, build_schema},
    value::{Value, format_duration, parse_duration, parse_literal},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read schema file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Schema of a JSON record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    pub entity: String,

    /// Field compared against bare literals, by field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_field: Option<String>,

    pub fields: Vec<FieldConfig>,
}

/// One object key of a JSON record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    /// Object key
    pub name: String,

    /// Name users type, defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_name: Option<String>,

    #[serde(rename = "type", default = "default_type_class")]
    pub type_class: TypeClass,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,

    #[serde(default = "enabled")]
    pub queryable: bool,

    #[serde(default = "enabled")]
    pub readable: bool,
}

fn default_type_class() -> TypeClass {
    TypeClass::String
}

fn enabled() -> bool {
    true
}

impl SchemaConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn declaration(&self) -> SchemaDeclaration<serde_json::Value> {
        let mut declaration = SchemaDeclaration::new(self.entity.as_str());
        for field in &self.fields {
            let mut decl = FieldDeclaration::new(field.name.as_str(), field.type_class)
                .variants(field.variants.iter().cloned());
            if let Some(query_name) = &field.query_name {
                decl = decl.query_name(query_name.as_str());
            }
            // Fields with nothing to read can only be hidden.
            if !field.queryable || !field.readable {
                decl = decl.hidden();
            }
            if field.readable {
                let key = field.name.clone();
                let class = field.type_class;
                let variants = field.variants.clone();
                decl = decl.read(move |record: &serde_json::Value| {
                    record
                        .get(&key)
                        .map_or(Value::Null, |v| from_json(v, class, &variants))
                });
            }
            declaration = declaration.field(decl);
        }
        if let Some(default) = &self.default_field {
            declaration = declaration.default_field(default.as_str());
        }
        declaration
    }

    pub fn build(&self) -> Result<EntitySchema<serde_json::Value>, SchemaError> {
        schema_from_config(self)
    }
}

pub fn schema_from_config(config: &SchemaConfig) -> Result<EntitySchema<serde_json::Value>, SchemaError> {
    build_schema(config.declaration())
}

/// Load a schema configuration file and build the schema.
pub fn schema_from_file<P: AsRef<Path>>(path: P) -> Result<EntitySchema<serde_json::Value>, ConfigError> {
    Ok(SchemaConfig::from_json_file(path)?.build()?)
}

/// Integers, including floats with no fractional part such as `5.0`.
fn int_from_json(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    // i64::MAX rounds up to 2^63 as f64, so the upper bound is exclusive.
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

/// Convert a JSON value into a field value of the given type class.
///
/// Values that do not fit the type class read as null.
pub fn from_json(v: &serde_json::Value, class: TypeClass, variants: &[String]) -> Value {
    use serde_json::Value as Json;

    match (class, v) {
        (_, Json::Null) => Value::Null,
        (TypeClass::Int, Json::Number(n)) => int_from_json(n).map_or(Value::Null, Value::Integer),
        (TypeClass::Float, Json::Number(n)) => n.as_f64().map_or(Value::Null, Value::Float),
        (TypeClass::Duration, v) => duration_from_json(v).map_or(Value::Null, Value::Duration),
        (TypeClass::String, Json::String(s)) => Value::String(s.clone()),
        (TypeClass::String, Json::Number(n)) => Value::String(n.to_string()),
        (TypeClass::String, Json::Bool(b)) => Value::String(b.to_string()),
        (TypeClass::Enum, Json::String(s)) => {
            // Keep undeclared names so that they still compare and sort.
            let name = variants
                .iter()
                .find(|v| v.to_lowercase() == s.to_lowercase())
                .unwrap_or(s);
            Value::Enum(name.clone())
        }
        (_, Json::String(s)) => parse_literal(class, s, variants).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Convert a field value back into JSON. Durations render as `hh:mm:ss`.
pub fn to_json(v: &Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match v {
        Value::Null => Json::Null,
        Value::Integer(n) => Json::from(*n),
        Value::Float(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Duration(d) => Json::String(format_duration(*d)),
        Value::String(s) | Value::Enum(s) => Json::String(s.clone()),
    }
}

/// Read a duration field from JSON: seconds or a duration string.
pub fn duration_from_json(v: &serde_json::Value) -> Option<Duration> {
    match v {
        serde_json::Value::Number(n) => n.as_f64().and_then(|s| Duration::try_from_secs_f64(s).ok()),
        serde_json::Value::String(s) => parse_duration(s),
        _ => None,
    }
}
