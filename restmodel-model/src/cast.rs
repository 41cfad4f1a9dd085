//! Attribute casts.
//!
//! A [`Cast`] transforms a raw value before it is stored on an entity. Casts
//! are registered per entity type in a [`Casts`] map and run on every write
//! through `set`, never on reads.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;

/// Errors raised by a cast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("cannot cast {found} to {expected}")]
    Unsupported {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid {expected} value: {value}")]
    Invalid {
        expected: &'static str,
        value: String,
    },

    #[error("{0}")]
    Custom(String),
}

/// A pure value transformation applied to an attribute on write.
pub trait Cast: Send + Sync {
    fn cast(&self, value: Value) -> Result<Value, CastError>;
}

/// Adapts a closure into a [`Cast`].
pub struct CastFn<F>(pub F);

impl<F> Cast for CastFn<F>
where
    F: Fn(Value) -> Result<Value, CastError> + Send + Sync,
{
    fn cast(&self, value: Value) -> Result<Value, CastError> {
        (self.0)(value)
    }
}

/// Casts scalars to strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCast;

impl Cast for StringCast {
    fn cast(&self, value: Value) -> Result<Value, CastError> {
        match value {
            Value::Null | Value::String(_) => Ok(value),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(unsupported("string", &other)),
        }
    }
}

/// Casts numbers, numeric strings and booleans to integers. Fractions are truncated.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCast;

impl Cast for IntegerCast {
    fn cast(&self, value: Value) -> Result<Value, CastError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Bool(b) => Ok(Value::from(i64::from(b))),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::Number(n)),
            Value::Number(n) => n
                .as_f64()
                .and_then(truncate)
                .map(Value::from)
                .ok_or_else(|| invalid("integer", &Value::Number(n))),
            Value::String(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .map(Value::from)
                    .or_else(|_| trimmed.parse::<u64>().map(Value::from))
                    .ok()
                    .or_else(|| {
                        trimmed
                            .parse::<f64>()
                            .ok()
                            .and_then(truncate)
                            .map(Value::from)
                    })
                    .ok_or_else(|| invalid("integer", &Value::String(s.clone())))
            }
            other => Err(unsupported("integer", &other)),
        }
    }
}

/// Casts numbers, numeric strings and booleans to floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatCast;

impl Cast for FloatCast {
    fn cast(&self, value: Value) -> Result<Value, CastError> {
        let parsed = match &value {
            Value::Null => return Ok(Value::Null),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            other => return Err(unsupported("float", other)),
        };

        parsed
            .map(Value::from)
            .ok_or_else(|| invalid("float", &value))
    }
}

/// Casts booleans, numbers and the usual truthy/falsy strings to booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCast;

impl Cast for BooleanCast {
    fn cast(&self, value: Value) -> Result<Value, CastError> {
        match &value {
            Value::Null | Value::Bool(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "off" | "" => Ok(Value::Bool(false)),
                _ => Err(invalid("boolean", &value)),
            },
            other => Err(unsupported("boolean", other)),
        }
    }
}

/// Normalises RFC 3339 strings and unix timestamps (seconds) to UTC RFC 3339.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeCast;

impl Cast for DateTimeCast {
    fn cast(&self, value: Value) -> Result<Value, CastError> {
        let parsed = match &value {
            Value::Null => return Ok(Value::Null),
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            other => return Err(unsupported("datetime", other)),
        };

        parsed
            .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            .ok_or_else(|| invalid("datetime", &value))
    }
}

/// Per-entity-type mapping from attribute key to cast.
#[derive(Clone, Default)]
pub struct Casts {
    casts: HashMap<String, Arc<dyn Cast>>,
}

impl Casts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration.
    pub fn with(mut self, key: impl Into<String>, cast: impl Cast + 'static) -> Self {
        self.insert(key, cast);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, cast: impl Cast + 'static) {
        self.casts.insert(key.into(), Arc::new(cast));
    }

    /// Returns the cast registered for `key`.
    pub fn get(&self, key: &str) -> Option<&dyn Cast> {
        self.casts.get(key).map(|cast| cast.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.casts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.casts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.casts.is_empty()
    }
}

impl fmt::Debug for Casts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.casts.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Casts").field("keys", &keys).finish()
    }
}

/// Truncates toward zero. `None` when the result does not fit an `i64`.
fn truncate(f: f64) -> Option<i64> {
    let truncated = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    (truncated >= i64::MIN as f64 && truncated < i64::MAX as f64).then_some(truncated as i64)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn unsupported(expected: &'static str, value: &Value) -> CastError {
    CastError::Unsupported {
        expected,
        found: kind_of(value),
    }
}

fn invalid(expected: &'static str, value: &Value) -> CastError {
    CastError::Invalid {
        expected,
        value: value.to_string(),
    }
}
