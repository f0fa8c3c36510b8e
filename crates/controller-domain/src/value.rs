use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A recursive, tagged-variant value tree.
///
/// Replaces the untyped nested mappings (`spec`, schema, deployed-value
/// trees) that flow through the Parameter Client and Overlay Engine.
/// Traversal is total: every variant is matched explicitly, there is no
/// `Any`/`serde_json::Value` escape hatch once a tree has been converted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn object() -> Self {
        Value::Object(BTreeMap::new())
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Looks up a key on an `Object` variant; `None` for any other shape.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|m| m.get(key))
    }

    /// Deep copy. `Value` is plain-data and `Clone`, so this is just
    /// `clone()` — named explicitly because callers (Parameter Client)
    /// rely on the no-aliasing guarantee, not merely on `Clone` existing.
    pub fn deep_clone(&self) -> Value {
        self.clone()
    }

    /// Shallow overlay: every top-level key in `donor` overwrites the
    /// same key in `self` (inserted if absent). Non-`Object` operands
    /// are replaced wholesale by the donor.
    pub fn shallow_merge(&self, donor: &Value) -> Value {
        match (self, donor) {
            (Value::Object(base), Value::Object(over)) => {
                let mut merged = base.clone();
                for (k, v) in over {
                    merged.insert(k.clone(), v.clone());
                }
                Value::Object(merged)
            }
            _ => donor.clone(),
        }
    }

    /// Recursive overlay: like `shallow_merge` but descends into nested
    /// `Object`s instead of replacing them wholesale.
    pub fn recursive_merge(&self, donor: &Value) -> Value {
        match (self, donor) {
            (Value::Object(base), Value::Object(over)) => {
                let mut merged = base.clone();
                for (k, v) in over {
                    let next = match merged.get(k) {
                        Some(existing) => existing.recursive_merge(v),
                        None => v.clone(),
                    };
                    merged.insert(k.clone(), next);
                }
                Value::Object(merged)
            }
            _ => donor.clone(),
        }
    }

    pub fn from_json(v: serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(a) => Value::List(a.into_iter().map(Value::from_json).collect()),
            serde_json::Value::Object(m) => {
                Value::Object(m.into_iter().map(|(k, v)| (k, Value::from_json(v))).collect())
            }
        }
    }

    pub fn from_yaml(v: serde_yaml::Value) -> Value {
        match v {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(a) => Value::List(a.into_iter().map(Value::from_yaml).collect()),
            serde_yaml::Value::Mapping(m) => Value::Object(
                m.into_iter()
                    .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), Value::from_yaml(v))))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(t) => Value::from_yaml(t.value),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::json!(n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(l) => serde_json::Value::Array(l.iter().map(Value::to_json).collect()),
            Value::Object(m) => {
                serde_json::Value::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
        }
    }
}

/// Structural equality: numeric representation is not preserved, only the
/// numeric value (`1` and `1.0` compare equal).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}
