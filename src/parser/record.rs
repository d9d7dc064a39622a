//! Typed values and insertion-ordered records.
//!
//! Every parsed field is an explicit [`Value`] variant; coercion from text
//! happens exactly once, in the tokenizer, and never at the storage layer.
//! Records preserve field insertion order so that parsing identical input
//! twice serializes to byte-identical JSON.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A parsed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    Bool(bool),
    Map(Record),
    Seq(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Value::Map(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// String constructor, for call-site brevity.
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Num(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Map(_) => write!(f, "{{..}}"),
            Value::Seq(s) => write!(f, "[{} items]", s.len()),
        }
    }
}

/// An insertion-ordered mapping from field name to [`Value`].
///
/// Records are small (tens of fields), so lookups are linear scans; what
/// matters is that iteration order is the order fields were first stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a field, replacing any existing value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Store a field, promoting repeated keys to a sequence.
    ///
    /// A second value under the same key turns the field into a
    /// `Seq([first, second])`; further values extend the sequence.
    pub fn store(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(Value::Seq(seq)) => seq.push(value),
            Some(existing) => {
                let first = existing.clone();
                *existing = Value::Seq(vec![first, value]);
            }
            None => self.fields.push((key, value)),
        }
    }

    /// Append free text to a string field, space-joined.
    pub fn append_text(&mut self, key: &str, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.get_mut(key) {
            Some(Value::Str(existing)) => {
                if !existing.is_empty() {
                    existing.push(' ');
                }
                existing.push_str(text);
            }
            Some(_) | None => self.set(key, Value::str(text)),
        }
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    /// The record's `name` field, if present.
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Whether the record has a non-empty description.
    pub fn has_description(&self) -> bool {
        matches!(self.get("description"), Some(Value::Str(s)) if !s.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Str(s) => serializer.serialize_str(s),
            Value::Num(n) => {
                // Whole numbers serialize as integers so counts and
                // coordinates round-trip the way consumers expect.
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 9e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Map(r) => r.serialize(serializer),
            Value::Seq(s) => {
                let mut seq = serializer.serialize_seq(Some(s.len()))?;
                for v in s {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
