//! Keyed records and ordered sequences, the two traversable containers.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::Value;

/// Key under which a traversable container stores a value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Name(Arc<str>),
    Index(usize),
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Name(name) => write!(f, "{}", name),
            PropertyKey::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A stored property. Hidden (non-enumerable) properties are skipped by
/// enumeration and therefore by duplication.
#[derive(Clone, Debug)]
pub struct Property {
    pub value: Value,
    pub enumerable: bool,
}

/// Insertion-ordered property storage shared by records and callables.
#[derive(Clone, Debug, Default)]
pub struct PropertyMap {
    entries: IndexMap<Arc<str>, Property>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|property| &property.value)
    }

    /// Assign a value. New keys are enumerable; existing keys keep their flag.
    pub fn insert(&mut self, key: impl Into<Arc<str>>, value: Value) {
        let key = key.into();
        match self.entries.get_mut(&key) {
            Some(property) => property.value = value,
            None => {
                self.entries.insert(key, Property { value, enumerable: true });
            }
        }
    }

    pub fn define(&mut self, key: impl Into<Arc<str>>, value: Value, enumerable: bool) {
        self.entries.insert(key.into(), Property { value, enumerable });
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key).map(|property| property.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_enumerable(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|property| property.enumerable)
    }

    /// All own properties, hidden ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn enumerable_keys(&self) -> Vec<Arc<str>> {
        self.entries
            .iter()
            .filter(|(_, property)| property.enumerable)
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn enumerable_entries(&self) -> Vec<(Arc<str>, Value)> {
        self.entries
            .iter()
            .filter(|(_, property)| property.enumerable)
            .map(|(key, property)| (key.clone(), property.value.clone()))
            .collect()
    }
}

/// A plain keyed record.
#[derive(Clone, Default)]
pub struct Record(Arc<RwLock<PropertyMap>>);

heap_handle!(Record);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(fields: impl IntoIterator<Item = (impl Into<Arc<str>>, Value)>) -> Self {
        let mut map = PropertyMap::new();
        for (key, value) in fields {
            map.insert(key, value);
        }
        Self(Arc::new(RwLock::new(map)))
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<Arc<str>>, value: Value) {
        self.0.write().insert(key, value);
    }

    /// Store a property that enumeration (and duplication) does not see.
    pub fn define_hidden(&self, key: impl Into<Arc<str>>, value: Value) {
        self.0.write().define(key, value, false);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    /// Own enumerable keys in enumeration order.
    pub fn keys(&self) -> Vec<Arc<str>> {
        self.0.read().enumerable_keys()
    }

    /// Snapshot of own enumerable entries. The lock is released on return,
    /// so callers may recurse into values that point back at this record.
    pub fn entries(&self) -> Vec<(Arc<str>, Value)> {
        self.0.read().enumerable_entries()
    }

    /// Number of own enumerable properties.
    pub fn len(&self) -> usize {
        self.0.read().enumerable_keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("keys", &self.keys())
            .finish()
    }
}

/// An ordered sequence of values.
#[derive(Clone, Default)]
pub struct Sequence(Arc<RwLock<Vec<Value>>>);

heap_handle!(Sequence);

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(items: impl IntoIterator<Item = Value>) -> Self {
        Self(Arc::new(RwLock::new(items.into_iter().collect())))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Store at `index`, padding any gap with `Undefined`.
    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.0.write();
        if index >= items.len() {
            items.resize(index + 1, Value::Undefined);
        }
        items[index] = value;
    }

    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    /// Snapshot of the elements in order.
    pub fn values(&self) -> Vec<Value> {
        self.0.read().clone()
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_properties_are_not_enumerated() {
        let record = Record::from_entries([("a", Value::from(1))]);
        record.define_hidden("secret", Value::from("x"));

        assert_eq!(record.len(), 1);
        assert!(record.contains_key("secret"));
        let keys: Vec<_> = record.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a"]);
    }

    #[test]
    fn reassignment_keeps_position_and_flag() {
        let mut map = PropertyMap::new();
        map.insert("a", Value::from(1));
        map.define("b", Value::from(2), false);
        map.insert("b", Value::from(3));
        map.insert("a", Value::from(4));

        assert!(!map.is_enumerable("b"));
        assert_eq!(map.get("b").and_then(Value::as_number), Some(3.0));
        assert_eq!(map.enumerable_keys().len(), 1);
    }

    #[test]
    fn sequence_set_pads_with_undefined() {
        let sequence = Sequence::new();
        sequence.set(2, Value::from(true));

        assert_eq!(sequence.len(), 3);
        assert!(matches!(sequence.get(0), Some(Value::Undefined)));
        assert_eq!(sequence.get(2).and_then(|v| v.as_bool()), Some(true));
    }
}
