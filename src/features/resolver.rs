//! Vector Resolver - payload -> ordered feature vector
//!
//! For every schema slot, in schema order:
//! 1. the canonical key, if present in the payload
//! 2. else the first alias (registry order) present in the payload
//! 3. else the slot is defaulted to `0.0` and reported as missing
//!
//! The chosen value must coerce to a finite number or the whole resolution
//! fails. Keys that match neither a slot nor an alias are ignored.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use super::{AliasRegistry, FeatureSchema};

/// Value used for slots the payload does not supply
pub const MISSING_DEFAULT: f64 = 0.0;

// ============================================================================
// INPUT
// ============================================================================

/// One payload value, tagged so coercion failure is an explicit case
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Number(f64),
    Text(String),
    Null,
    /// Booleans, arrays, objects
    Other(Value),
}

impl InputValue {
    /// Numeric view of the value, `None` when it is not a finite number
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            InputValue::Number(n) => *n,
            InputValue::Text(s) => s.trim().parse::<f64>().ok()?,
            InputValue::Null | InputValue::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<Value> for InputValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(f) => InputValue::Number(f),
                None => InputValue::Other(Value::Number(n)),
            },
            Value::String(s) => InputValue::Text(s),
            Value::Null => InputValue::Null,
            other => InputValue::Other(other),
        }
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Number(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Number(n) => write!(f, "{}", n),
            InputValue::Text(s) => f.write_str(s),
            InputValue::Null => f.write_str("null"),
            InputValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Request payload: key -> value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputPayload {
    values: HashMap<String, InputValue>,
}

impl InputPayload {
    /// `None` unless `value` is a JSON object
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map.into_iter().map(|(k, v)| (k, InputValue::from(v))).collect()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&InputValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<K, V> FromIterator<(K, V)> for InputPayload
where
    K: Into<String>,
    V: Into<InputValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Ordered vector plus the slots that were defaulted
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Positionally aligned to the schema
    pub vector: Vec<f64>,
    /// Defaulted identifiers, in schema order
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    #[error("Feature '{feature}' has non-numeric value: {raw}")]
    NonNumericFeature { feature: String, raw: InputValue },
}

// ============================================================================
// RESOLVER
// ============================================================================

pub struct VectorResolver<'a> {
    schema: &'a FeatureSchema,
    aliases: &'a AliasRegistry,
}

impl<'a> VectorResolver<'a> {
    pub fn new(schema: &'a FeatureSchema, aliases: &'a AliasRegistry) -> Self {
        Self { schema, aliases }
    }

    pub fn resolve(&self, payload: &InputPayload) -> Result<Resolution, ResolveError> {
        let mut vector = Vec::with_capacity(self.schema.len());
        let mut missing = Vec::new();

        for feature in self.schema.ordered() {
            match self.lookup(feature, payload) {
                Some(raw) => {
                    let value = raw.coerce().ok_or_else(|| ResolveError::NonNumericFeature {
                        feature: feature.clone(),
                        raw: raw.clone(),
                    })?;
                    vector.push(value);
                }
                None => {
                    missing.push(feature.clone());
                    vector.push(MISSING_DEFAULT);
                }
            }
        }

        Ok(Resolution { vector, missing })
    }

    /// Canonical key wins over any alias
    fn lookup<'p>(&self, feature: &str, payload: &'p InputPayload) -> Option<&'p InputValue> {
        payload.get(feature).or_else(|| {
            self.aliases
                .aliases_for(feature)
                .iter()
                .find_map(|alias| payload.get(alias))
        })
    }
}
