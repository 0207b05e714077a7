//! Hash maps, hash sets and their weak counterparts.
//!
//! Keys compare with SameValueZero: primitives by content (`NaN` equals
//! `NaN`, `0` equals `-0`), heap values by identity.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use parking_lot::RwLock;

use super::Value;

/// A [`Value`] usable as a hash key.
#[derive(Clone, Debug)]
pub struct ValueKey(pub Value);

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.same_value_zero(&other.0)
    }
}

impl Eq for ValueKey {}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Undefined => 0u8.hash(state),
            Value::Null => 1u8.hash(state),
            Value::Bool(b) => {
                2u8.hash(state);
                b.hash(state);
            }
            Value::Number(n) => {
                3u8.hash(state);
                // fold -0 into +0 to agree with SameValueZero
                let n = if *n == 0.0 { 0.0 } else { *n };
                OrderedFloat(n).hash(state);
            }
            Value::Text(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            heap => {
                5u8.hash(state);
                heap.heap_addr().hash(state);
            }
        }
    }
}

/// Weak reference to a heap value, remembered together with its address.
#[derive(Clone)]
pub struct WeakRef {
    addr: usize,
    handle: Weak<dyn Any + Send + Sync>,
}

impl WeakRef {
    pub(crate) fn new<T: Any + Send + Sync>(strong: &Arc<T>) -> Self {
        let handle: Weak<T> = Arc::downgrade(strong);
        let handle: Weak<dyn Any + Send + Sync> = handle;
        Self {
            addr: Arc::as_ptr(strong) as *const () as usize,
            handle,
        }
    }

    pub fn addr(&self) -> usize {
        self.addr
    }

    pub fn is_alive(&self) -> bool {
        self.handle.strong_count() > 0
    }
}

impl fmt::Debug for WeakRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRef")
            .field("addr", &format_args!("{:#x}", self.addr))
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Insertion-ordered hash map.
#[derive(Clone, Default)]
pub struct MapValue(Arc<RwLock<IndexMap<ValueKey, Value>>>);

heap_handle!(MapValue);

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self(Arc::new(RwLock::new(
            entries
                .into_iter()
                .map(|(key, value)| (ValueKey(key), value))
                .collect(),
        )))
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.0.read().get(&ValueKey(key.clone())).cloned()
    }

    pub fn set(&self, key: Value, value: Value) {
        self.0.write().insert(ValueKey(key), value);
    }

    pub fn has(&self, key: &Value) -> bool {
        self.0.read().contains_key(&ValueKey(key.clone()))
    }

    pub fn delete(&self, key: &Value) -> bool {
        self.0.write().shift_remove(&ValueKey(key.clone())).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0
            .read()
            .iter()
            .map(|(key, value)| (key.0.clone(), value.clone()))
            .collect()
    }

    /// A new map holding the very same key and value handles.
    pub(crate) fn shallow_copy(&self) -> MapValue {
        Self(Arc::new(RwLock::new(self.0.read().clone())))
    }
}

impl fmt::Debug for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapValue").field("len", &self.len()).finish()
    }
}

/// Insertion-ordered hash set.
#[derive(Clone, Default)]
pub struct SetValue(Arc<RwLock<IndexSet<ValueKey>>>);

heap_handle!(SetValue);

impl SetValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self(Arc::new(RwLock::new(values.into_iter().map(ValueKey).collect())))
    }

    pub fn add(&self, value: Value) {
        self.0.write().insert(ValueKey(value));
    }

    pub fn has(&self, value: &Value) -> bool {
        self.0.read().contains(&ValueKey(value.clone()))
    }

    pub fn delete(&self, value: &Value) -> bool {
        self.0.write().shift_remove(&ValueKey(value.clone()))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn values(&self) -> Vec<Value> {
        self.0.read().iter().map(|key| key.0.clone()).collect()
    }

    pub(crate) fn shallow_copy(&self) -> SetValue {
        Self(Arc::new(RwLock::new(self.0.read().clone())))
    }
}

impl fmt::Debug for SetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetValue").field("len", &self.len()).finish()
    }
}

/// Map keyed by heap identity that does not keep its keys alive.
/// Its entries cannot be enumerated.
#[derive(Clone, Default)]
pub struct WeakMapValue(Arc<RwLock<HashMap<usize, (WeakRef, Value)>>>);

heap_handle!(WeakMapValue);

impl WeakMapValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` (and stores nothing) when `key` is a primitive.
    pub fn set(&self, key: &Value, value: Value) -> bool {
        let Some(weak) = key.downgrade() else {
            return false;
        };
        let mut entries = self.0.write();
        entries.retain(|_, (held, _)| held.is_alive());
        entries.insert(weak.addr(), (weak, value));
        true
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        let addr = key.heap_addr()?;
        self.0
            .read()
            .get(&addr)
            .filter(|(held, _)| held.is_alive())
            .map(|(_, value)| value.clone())
    }

    pub fn has(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    pub fn delete(&self, key: &Value) -> bool {
        key.heap_addr()
            .and_then(|addr| self.0.write().remove(&addr))
            .is_some_and(|(held, _)| held.is_alive())
    }
}

impl fmt::Debug for WeakMapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakMapValue { .. }")
    }
}

/// Set of heap identities that does not keep its members alive.
#[derive(Clone, Default)]
pub struct WeakSetValue(Arc<RwLock<HashMap<usize, WeakRef>>>);

heap_handle!(WeakSetValue);

impl WeakSetValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, value: &Value) -> bool {
        let Some(weak) = value.downgrade() else {
            return false;
        };
        let mut members = self.0.write();
        members.retain(|_, held| held.is_alive());
        members.insert(weak.addr(), weak);
        true
    }

    pub fn has(&self, value: &Value) -> bool {
        value
            .heap_addr()
            .and_then(|addr| self.0.read().get(&addr).map(WeakRef::is_alive))
            .unwrap_or(false)
    }

    pub fn delete(&self, value: &Value) -> bool {
        value
            .heap_addr()
            .and_then(|addr| self.0.write().remove(&addr))
            .is_some_and(|held| held.is_alive())
    }
}

impl fmt::Debug for WeakSetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakSetValue { .. }")
    }
}
