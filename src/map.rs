//! Ordered node properties.
//!
//! [`Properties`] wraps an [`IndexMap`] so properties iterate, and are written
//! back, in the order they first appeared. Assigning a key again replaces its
//! value but keeps its original position, which is how a document like
//! `node a=1 b=2 a=3` resolves.
//!
//! ```rust
//! use kdl_relaxed::{Properties, Value};
//!
//! let mut props = Properties::new();
//! props.insert("a", Value::from(1));
//! props.insert("b", Value::from(2));
//! props.insert("a", Value::from(3));
//!
//! let entries: Vec<_> = props.iter().map(|(k, v)| (k.as_str(), v.as_i64())).collect();
//! assert_eq!(entries, [("a", Some(3)), ("b", Some(2))]);
//! ```

use crate::value::{append_identifier, Format, Value};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Insertion-ordered property map with unique keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties(IndexMap<String, Value>);

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Properties(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Properties(IndexMap::with_capacity(capacity))
    }

    /// Sets `key` to `value`, returning the previous value.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key`, shifting later properties down to keep their order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the properties in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Appends each property as ` key=value`, keys bare where possible.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_relaxed::{Format, Properties, Value};
    ///
    /// let mut props = Properties::new();
    /// props.insert("name", Value::from("Bob"));
    /// props.insert("two words", Value::from(0.5));
    ///
    /// let mut out = String::new();
    /// props.append_to(&mut out, Format::Formatted);
    /// assert_eq!(out, " name=\"Bob\" \"two words\"=0.5");
    /// ```
    pub fn append_to(&self, out: &mut String, format: Format) {
        for (key, value) in &self.0 {
            out.push(' ');
            append_identifier(out, key);
            out.push('=');
            value.append_to(out, format);
        }
    }
}

impl From<HashMap<String, Value>> for Properties {
    fn from(map: HashMap<String, Value>) -> Self {
        Properties(map.into_iter().collect())
    }
}

impl From<Properties> for HashMap<String, Value> {
    fn from(props: Properties) -> Self {
        props.0.into_iter().collect()
    }
}

impl IntoIterator for Properties {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Properties {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Properties(IndexMap::from_iter(iter))
    }
}

impl Serialize for Properties {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
