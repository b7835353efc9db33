use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize, Serializer};

/// A slot value held by a `LocalStateStore`.
///
/// `Undefined` is what a read of a missing key yields; it serializes as
/// `null`; deserializing `null` always yields `Null`, which is tried first.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    #[default]
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Record(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// `Null` or `Undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Record field lookup; `Undefined` when missing or not a record.
    pub fn field(&self, name: &str) -> Value {
        match self {
            Value::Record(map) => map.get(name).cloned().unwrap_or_default(),
            _ => Value::Undefined,
        }
    }

    pub fn record<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Record(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Record(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Immutable view of every slot at one store version.
///
/// Cloning is cheap; the store copies on its next write instead.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub(crate) slots: Rc<BTreeMap<String, Value>>,
    pub(crate) version: u64,
}

impl Snapshot {
    pub fn get(&self, key: &str) -> Value {
        self.slots.get(key).cloned().unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slots.as_ref().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from(5).as_i64(), Some(5));
        assert_eq!(Value::from(5).as_f64(), Some(5.0));
        assert_eq!(Value::from("ab").as_str(), Some("ab"));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert!(Value::default().is_undefined());
        assert!(Value::from(None::<i64>).is_nullish());
    }

    #[test]
    fn test_record_field() {
        let user = Value::record([("name", "Ada"), ("email", "ada@example.com")]);
        assert_eq!(user.field("name"), Value::from("Ada"));
        assert!(user.field("phone").is_undefined());
        assert!(Value::from(3).field("name").is_undefined());
    }

    #[test]
    fn test_value_json() {
        let v: Value = serde_json::from_str(r#"{"id": 1, "tags": ["a"], "x": null}"#).unwrap();
        assert_eq!(v.field("id"), Value::Int(1));
        assert_eq!(v.field("tags"), Value::List(vec![Value::from("a")]));
        assert_eq!(v.field("x"), Value::Null);

        assert_eq!(serde_json::to_string(&Value::Undefined).unwrap(), "null");
    }

    #[test]
    fn test_value_display() {
        let v = Value::record([("a", Value::from(1)), ("b", Value::List(vec![true.into()]))]);
        assert_eq!(v.to_string(), "{a: 1, b: [true]}");
    }
}
