//! Variable values and the bindings a template is expanded against.

use crate::error::Result;
use crate::name::Name;
use std::collections::HashMap;

/// The value bound to a template variable.
///
/// Associative values are an ordered list of pairs rather than a map, so
/// insertion order is kept and keys may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Absent,
    Scalar(String),
    List(Vec<String>),
    AssocList(Vec<(String, String)>),
}

static ABSENT: Value = Value::Absent;

impl Value {
    pub fn scalar(value: impl ToString) -> Self {
        Value::Scalar(value.to_string())
    }

    /// Undefined for expansion purposes: absent, or a list with no members.
    pub fn is_undefined(&self) -> bool {
        match self {
            Value::Absent => true,
            Value::Scalar(_) => false,
            Value::List(items) => items.is_empty(),
            Value::AssocList(pairs) => pairs.is_empty(),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn from_json(json: &serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Absent,
            Json::String(s) => Value::Scalar(s.clone()),
            Json::Bool(b) => Value::scalar(b),
            Json::Number(n) => Value::scalar(n),
            Json::Object(map) => Value::AssocList(
                map.iter()
                    .map(|(k, v)| (k.clone(), json_scalar(v)))
                    .collect(),
            ),
            Json::Array(items) => {
                let pairs: Option<Vec<(String, String)>> = items
                    .iter()
                    .map(|item| match item.as_array().map(Vec::as_slice) {
                        Some([k, v]) => Some((json_scalar(k), json_scalar(v))),
                        _ => None,
                    })
                    .collect();
                match pairs {
                    Some(pairs) if !pairs.is_empty() => Value::AssocList(pairs),
                    _ => Value::List(items.iter().map(json_scalar).collect()),
                }
            }
        }
    }
}

fn json_scalar(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::List(items.into_iter().map(String::from).collect())
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Value {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Value::AssocList(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Variable name to value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    vars: HashMap<Name, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Name, value: impl Into<Value>) -> Option<Value> {
        self.vars.insert(name, value.into())
    }

    /// Validates `name` before binding it.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let name = Name::new(name)?;
        self.vars.insert(name, value.into());
        Ok(())
    }

    pub fn get(&self, name: &Name) -> &Value {
        self.vars.get(name).unwrap_or(&ABSENT)
    }

    /// Scalar lookup by raw name; `None` when unbound or not a scalar.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .and_then(|(_, v)| v.as_scalar())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> {
        self.vars.iter()
    }

    /// Reads bindings from a JSON object; anything else yields no bindings.
    /// Keys that are not valid names are rejected.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let mut bindings = Self::new();
        if let Some(map) = json.as_object() {
            for (key, value) in map {
                bindings.set(key, Value::from_json(value))?;
            }
        }
        Ok(bindings)
    }

    /// Renders the bindings as a JSON object with names in sorted order.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        let mut entries: Vec<_> = self.vars.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let map = entries
            .into_iter()
            .map(|(name, value)| {
                let json = match value {
                    Value::Absent => Json::Null,
                    Value::Scalar(s) => Json::String(s.clone()),
                    Value::List(items) => {
                        Json::Array(items.iter().cloned().map(Json::String).collect())
                    }
                    Value::AssocList(pairs) => Json::Object(
                        pairs
                            .iter()
                            .map(|(k, v)| (k.clone(), Json::String(v.clone())))
                            .collect(),
                    ),
                };
                (name.to_string(), json)
            })
            .collect();
        Json::Object(map)
    }
}

impl FromIterator<(Name, Value)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (Name, Value)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}
