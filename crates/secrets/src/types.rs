//! Typed secret values
//!
//! The secret service returns untyped JSON. This module closes that over a
//! fixed set of variants and pins down how each one is rendered into a
//! `.env` line:
//!
//! | variant  | rendered as                 |
//! |----------|-----------------------------|
//! | `String` | the string, verbatim        |
//! | `Number` | JSON number text (`42`)     |
//! | `Bool`   | `true` / `false`            |
//! | `Null`   | empty string                |
//! | `List`   | compact JSON (`["a","b"]`)  |
//! | `Map`    | compact JSON (`{"k":"v"}`)  |

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A single value inside a [`SecretDocument`].
#[derive(Debug, Clone, PartialEq)]
pub enum SecretValue {
    /// JSON `null`
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number, kept in its original textual precision
    Number(Number),
    /// JSON string
    String(String),
    /// JSON array
    List(Vec<SecretValue>),
    /// Nested JSON object
    Map(BTreeMap<String, SecretValue>),
}

impl SecretValue {
    /// Whether the value is a scalar that renders without JSON encoding.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Map(_))
    }
}

impl From<Value> for SecretValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&SecretValue> for Value {
    fn from(value: &SecretValue) -> Self {
        match value {
            SecretValue::Null => Self::Null,
            SecretValue::Bool(b) => Self::Bool(*b),
            SecretValue::Number(n) => Self::Number(n.clone()),
            SecretValue::String(s) => Self::String(s.clone()),
            SecretValue::List(items) => Self::Array(items.iter().map(Self::from).collect()),
            SecretValue::Map(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for SecretValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for SecretValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Renders the value the way it is written into a `.env` file.
impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::List(_) | Self::Map(_) => write!(f, "{}", Value::from(self)),
        }
    }
}

/// The unwrapped key/value content of one secret.
///
/// Keys are kept exactly as the service returned them. Iteration is in key
/// order, which keeps written files stable between runs; callers should not
/// rely on any particular order.
#[derive(Clone, Default, PartialEq)]
pub struct SecretDocument {
    entries: BTreeMap<String, SecretValue>,
}

impl SecretDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the previous value for the key if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<SecretValue>,
    ) -> Option<SecretValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Get a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SecretValue> {
        self.entries.get(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the document has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SecretValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Map<String, Value>> for SecretDocument {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(k, v)| (k, SecretValue::from(v)))
            .collect()
    }
}

impl FromIterator<(String, SecretValue)> for SecretDocument {
    fn from_iter<I: IntoIterator<Item = (String, SecretValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// Values stay out of debug output; only the shape is shown.
impl fmt::Debug for SecretDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDocument")
            .field("count", &self.entries.len())
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_scalars() {
        assert_eq!(SecretValue::from("abc").to_string(), "abc");
        assert_eq!(SecretValue::from(42_i64).to_string(), "42");
        assert_eq!(SecretValue::from(true).to_string(), "true");
        assert_eq!(SecretValue::Null.to_string(), "");
    }

    #[test]
    fn test_display_float_keeps_json_text() {
        let value = SecretValue::from(json!(1.5));
        assert_eq!(value.to_string(), "1.5");
    }

    #[test]
    fn test_display_nested_as_compact_json() {
        let value = SecretValue::from(json!({"host": "db", "port": 5432}));
        assert_eq!(value.to_string(), r#"{"host":"db","port":5432}"#);

        let list = SecretValue::from(json!(["a", 1, null]));
        assert_eq!(list.to_string(), r#"["a",1,null]"#);
    }

    #[test]
    fn test_string_is_not_quoted() {
        let value = SecretValue::from(json!("has \"quotes\" and spaces"));
        assert_eq!(value.to_string(), "has \"quotes\" and spaces");
    }

    #[test]
    fn test_is_scalar() {
        assert!(SecretValue::from("x").is_scalar());
        assert!(SecretValue::Null.is_scalar());
        assert!(!SecretValue::from(json!([1])).is_scalar());
        assert!(!SecretValue::from(json!({"a": 1})).is_scalar());
    }

    #[test]
    fn test_document_from_json_map_keeps_keys() {
        let Value::Object(map) = json!({
            "API_KEY": "secret",
            "lower_case": 7,
            "Mixed-Key": false,
        }) else {
            panic!("expected object");
        };

        let doc = SecretDocument::from(map);
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get("API_KEY"), Some(&SecretValue::from("secret")));
        assert_eq!(doc.get("lower_case"), Some(&SecretValue::from(7_i64)));
        assert_eq!(doc.get("Mixed-Key"), Some(&SecretValue::from(false)));
    }

    #[test]
    fn test_document_insert_replaces() {
        let mut doc = SecretDocument::new();
        assert!(doc.insert("A", "1").is_none());
        let previous = doc.insert("A", "2");
        assert_eq!(previous, Some(SecretValue::from("1")));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_document_debug_hides_values() {
        let mut doc = SecretDocument::new();
        doc.insert("TOKEN", "super-secret-value");
        let debug = format!("{doc:?}");
        assert!(debug.contains("TOKEN"));
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_empty_document() {
        let doc = SecretDocument::new();
        assert!(doc.is_empty());
        assert_eq!(doc.keys().count(), 0);
    }
}
