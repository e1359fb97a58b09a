//! Scalar values and ordered records.
//!
//! Every persisted row, regardless of where it came from (SQLite, a JSON form
//! submission, a spreadsheet import), is adapted into a [`Record`] at the
//! boundary. Business logic only ever reads rows through the [`FieldLookup`]
//! trait, so it never has to care about the source's shape.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Value
// ============================================================================

/// A nullable scalar stored in a record field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL `NULL` or an absent form field.
    #[default]
    Null,
    /// Integer (also used for boolean flags: 0 / 1).
    Integer(i64),
    /// Floating point.
    Real(f64),
    /// Text.
    Text(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text if this is a [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view. Text holding an integer literal is accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float view. Integers widen; text holding a number is accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null => None,
        }
    }

    /// Stringify the value. `Null` becomes the empty string.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Integer(i) => Cow::Owned(i.to_string()),
            Self::Real(f) => Cow::Owned(f.to_string()),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }

    /// `Null`, or a value whose string form is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Integer(_) | Self::Real(_) => false,
        }
    }

    /// Interpret the value as a boolean flag.
    ///
    /// Numbers are true when non-zero. Text accepts the checkbox and yes/no
    /// spellings used by the admin forms (`on`, `true`, `1`, `si`, `sí`, `yes`).
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Integer(i) => *i != 0,
            Self::Real(f) => *f != 0.0,
            Self::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "1" | "on" | "true" | "yes" | "si" | "sí"
            ),
        }
    }

    /// Convert a JSON value. Booleans become 0/1; arrays and objects are kept
    /// as their JSON text (columns such as `tags` store JSON strings).
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Integer(i64::from(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map(Self::Real).unwrap_or(Self::Null),
            },
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Real(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Real(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Integer(i64::from(b))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Self::Null)
    }
}

// ============================================================================
// FieldLookup
// ============================================================================

/// Ordered key → value lookup with an existence check.
///
/// The single interface through which rows are read. Implement it for any
/// data source instead of branching on the source's type in business logic.
pub trait FieldLookup {
    /// Look up a field. `None` means the key does not exist at all;
    /// `Some(&Value::Null)` means it exists and is null.
    fn field(&self, name: &str) -> Option<&Value>;

    /// Whether the key exists (regardless of its value).
    fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

impl<T: FieldLookup + ?Sized> FieldLookup for &T {
    fn field(&self, name: &str) -> Option<&Value> {
        (**self).field(name)
    }
}

impl FieldLookup for HashMap<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl FieldLookup for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

// ============================================================================
// Record
// ============================================================================

/// One row: an insertion-ordered mapping of field name to [`Value`].
///
/// Serializes as a JSON object whose keys keep the row's column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ```
    /// use farmavet_core::{Record, Value};
    ///
    /// let r = Record::new().with("titulo", "Hola").with("orden", 2_i64);
    /// assert_eq!(r.get("titulo"), Some(&Value::from("Hola")));
    /// assert_eq!(r.len(), 2);
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(pos).1)
    }

    /// Look up a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Text view of a field, if it holds text.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Integer view of a field.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Whether the key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a record from a JSON object, keeping the object's key order.
    pub fn from_json_object(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        map.iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect()
    }
}

impl FieldLookup for Record {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Record::from_json_object(&map))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Value tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_value_blankness() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(Value::from("  \t\n").is_blank());
        assert!(!Value::from("x").is_blank());
        assert!(!Value::Integer(0).is_blank());
        assert!(!Value::Real(0.0).is_blank());
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Integer(42).to_text(), "42");
        assert_eq!(Value::Real(0.5).to_text(), "0.5");
        assert_eq!(Value::from("hola").to_text(), "hola");
    }

    #[test]
    fn test_value_truthiness() {
        assert!(Value::Integer(1).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(Value::from("on").is_truthy());
        assert!(Value::from("Sí").is_truthy());
        assert!(!Value::from("no").is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn test_value_numeric_views() {
        assert_eq!(Value::from(" 12 ").as_i64(), Some(12));
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("abc").as_f64(), None);
        assert_eq!(Value::Null.as_i64(), None);
    }

    #[test]
    fn test_value_from_json() {
        assert_eq!(Value::from_json(&serde_json::json!(true)), Value::Integer(1));
        assert_eq!(Value::from_json(&serde_json::json!(7)), Value::Integer(7));
        assert_eq!(Value::from_json(&serde_json::json!(1.5)), Value::Real(1.5));
        assert_eq!(Value::from_json(&serde_json::json!(null)), Value::Null);
        assert_eq!(
            Value::from_json(&serde_json::json!(["a", "b"])),
            Value::from(r#"["a","b"]"#)
        );
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    // ------------------------------------------------------------------------
    // Record tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_record_insert_replaces_in_place() {
        let mut r = Record::new().with("a", 1_i64).with("b", 2_i64);
        r.insert("a", 10_i64);
        let keys: Vec<&str> = r.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(r.get_i64("a"), Some(10));
    }

    #[test]
    fn test_record_remove() {
        let mut r = Record::new().with("a", "x");
        assert_eq!(r.remove("a"), Some(Value::from("x")));
        assert!(r.is_empty());
        assert_eq!(r.remove("a"), None);
    }

    #[test]
    fn test_record_null_field_exists() {
        let r = Record::new().with("titulo_en", Value::Null);
        assert!(r.has_field("titulo_en"));
        assert!(!r.has_field("titulo"));
    }

    #[test]
    fn test_record_serializes_in_column_order() {
        let r = Record::new()
            .with("zeta", 1_i64)
            .with("alfa", "a")
            .with("nulo", Value::Null);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alfa":"a","nulo":null}"#);
    }

    #[test]
    fn test_record_deserialize_from_json_object() {
        let r: Record = serde_json::from_str(r#"{"titulo":"Hola","activo":true}"#).unwrap();
        assert_eq!(r.get_str("titulo"), Some("Hola"));
        assert_eq!(r.get_i64("activo"), Some(1));
    }

    #[test]
    fn test_hashmap_field_lookup() {
        let mut map = HashMap::new();
        map.insert("nombre".to_string(), Value::from("HPLC"));
        assert_eq!(map.field("nombre"), Some(&Value::from("HPLC")));
        assert!(!map.has_field("otro"));
    }
}
