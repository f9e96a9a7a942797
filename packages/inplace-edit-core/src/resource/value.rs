//! Column types and coercion of untyped JSON values into them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::ValueError;

/// Declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Text,
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Time,
    Json,
}

impl ColumnType {
    /// Type name used in error messages and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Time => "time",
            ColumnType::Json => "json",
        }
    }

    /// Coerces a non-null JSON value into this type.
    ///
    /// Numeric and boolean columns accept their string spellings. Decimals
    /// are kept as strings so no precision is lost; temporal values are kept
    /// in the submitted spelling once they parse.
    pub fn coerce(&self, value: Value) -> Result<Value, ValueError> {
        match self {
            ColumnType::String | ColumnType::Text => match value {
                Value::String(_) => Ok(value),
                other => Err(self.mismatch(&other)),
            },
            ColumnType::Integer => match &value {
                Value::Number(n) => {
                    if n.is_i64() || n.is_u64() {
                        Ok(value)
                    } else {
                        match n.as_f64() {
                            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                                Ok(Value::from(f as i64))
                            }
                            _ => Err(self.mismatch(&value)),
                        }
                    }
                }
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| self.unparsable(s)),
                other => Err(self.mismatch(other)),
            },
            ColumnType::Float => match &value {
                Value::Number(_) => Ok(value),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| self.unparsable(s)),
                other => Err(self.mismatch(other)),
            },
            ColumnType::Decimal => match &value {
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::String(s) => {
                    let trimmed = s.trim();
                    match trimmed.parse::<f64>() {
                        Ok(f) if f.is_finite() => Ok(Value::String(trimmed.to_string())),
                        _ => Err(self.unparsable(s)),
                    }
                }
                other => Err(self.mismatch(other)),
            },
            ColumnType::Boolean => match &value {
                Value::Bool(_) => Ok(value),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(self.unparsable(s)),
                },
                other => Err(self.mismatch(other)),
            },
            ColumnType::Date => self.parse_temporal(value, |s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
            }),
            ColumnType::DateTime => self.parse_temporal(value, |s| {
                DateTime::parse_from_rfc3339(s).is_ok()
                    || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
                    || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
            }),
            ColumnType::Time => self.parse_temporal(value, |s| {
                NaiveTime::parse_from_str(s, "%H:%M:%S%.f").is_ok()
                    || NaiveTime::parse_from_str(s, "%H:%M").is_ok()
            }),
            ColumnType::Json => Ok(value),
        }
    }

    fn parse_temporal(
        &self,
        value: Value,
        valid: impl Fn(&str) -> bool,
    ) -> Result<Value, ValueError> {
        match &value {
            Value::String(s) if valid(s.trim()) => Ok(Value::String(s.trim().to_string())),
            Value::String(s) => Err(self.unparsable(s)),
            other => Err(self.mismatch(other)),
        }
    }

    fn mismatch(&self, got: &Value) -> ValueError {
        ValueError::TypeMismatch {
            expected: self.as_str().to_string(),
            got: json_kind(got).to_string(),
        }
    }

    fn unparsable(&self, value: &str) -> ValueError {
        ValueError::Unparsable {
            value: value.to_string(),
            expected: self.as_str().to_string(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Canonical string key for a primary key value.
///
/// Strings map to themselves, everything else to its JSON text. `42` and
/// `"42"` therefore share the key `"42"` and address the same record.
pub fn record_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
