//! Runtime value model.
//!
//! Primitives are held inline. Everything else is a cheap `Arc` handle whose
//! identity (`Value::same_value`) is pointer identity, so cloning a `Value`
//! aliases the heap object instead of copying it. Producing an independent
//! copy is the job of [`crate::Duplicator`].

use std::fmt;
use std::sync::Arc;

use crate::category::Category;

/// Identity helpers shared by every `Arc`-backed handle.
macro_rules! heap_handle {
    ($name:ident) => {
        impl $name {
            /// Whether both handles point at the same heap object.
            pub fn ptr_eq(&self, other: &Self) -> bool {
                ::std::sync::Arc::ptr_eq(&self.0, &other.0)
            }

            pub(crate) fn addr(&self) -> usize {
                ::std::sync::Arc::as_ptr(&self.0) as *const () as usize
            }

            pub(crate) fn downgrade(&self) -> $crate::value::collections::WeakRef {
                $crate::value::collections::WeakRef::new(&self.0)
            }
        }
    };
}

pub mod buffer;
pub mod callable;
pub mod collections;
pub mod deferred;
pub mod error_object;
pub mod instant;
pub mod object;
pub mod opaque;
pub mod pattern;

pub use buffer::{BufferError, BufferKind, BufferView, NumericBuffer, RawBuffer};
pub use callable::{Behavior, Callable, CallableKind};
pub use collections::{MapValue, SetValue, ValueKey, WeakMapValue, WeakRef, WeakSetValue};
pub use deferred::{Deferred, Resolver, Settlement};
pub use error_object::ErrorObject;
pub use instant::Instant;
pub use object::{Property, PropertyKey, PropertyMap, Record, Sequence};
pub use opaque::{CompiledModule, Generator, OpaqueConstant, SerializedPayload, Symbol};
pub use pattern::{Pattern, PatternError, PatternFlags};

/// A dynamically shaped runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(Arc<str>),
    Symbol(Symbol),
    Callable(Callable),
    Error(ErrorObject),
    Pattern(Pattern),
    Instant(Instant),
    Record(Record),
    Sequence(Sequence),
    Map(MapValue),
    Set(SetValue),
    WeakMap(WeakMapValue),
    WeakSet(WeakSetValue),
    Deferred(Deferred),
    NumericBuffer(NumericBuffer),
    RawBuffer(RawBuffer),
    BufferView(BufferView),
    /// Shared namespace object such as [`OpaqueConstant::math`].
    Opaque(OpaqueConstant),
    Serialized(SerializedPayload),
    Generator(Generator),
    Module(CompiledModule),
}

impl Value {
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    pub fn text(s: impl Into<Arc<str>>) -> Self {
        Value::Text(s.into())
    }

    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    pub fn symbol(description: impl Into<Arc<str>>) -> Self {
        Value::Symbol(Symbol::new(Some(description.into())))
    }

    pub fn record(fields: impl IntoIterator<Item = (impl Into<Arc<str>>, Value)>) -> Self {
        Value::Record(Record::from_entries(fields))
    }

    pub fn sequence(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Sequence(Sequence::from_values(items))
    }

    /// The runtime category of this value. Total over every variant.
    pub fn category(&self) -> Category {
        match self {
            Value::Undefined => Category::Undefined,
            Value::Null => Category::Null,
            Value::Bool(_) => Category::Boolean,
            Value::Number(_) => Category::Number,
            Value::Text(_) => Category::Text,
            Value::Symbol(_) => Category::Symbol,
            Value::Callable(callable) => match callable.kind() {
                CallableKind::Plain => Category::Function,
                CallableKind::GeneratorFactory => Category::GeneratorFunction,
                CallableKind::Async => Category::AsyncFunction,
            },
            Value::Error(_) => Category::Error,
            Value::Pattern(_) => Category::Pattern,
            Value::Instant(_) => Category::Instant,
            Value::Record(_) => Category::Record,
            Value::Sequence(_) => Category::Sequence,
            Value::Map(_) => Category::Map,
            Value::Set(_) => Category::Set,
            Value::WeakMap(_) => Category::WeakMap,
            Value::WeakSet(_) => Category::WeakSet,
            Value::Deferred(_) => Category::Deferred,
            Value::NumericBuffer(buffer) => buffer.kind().category(),
            Value::RawBuffer(_) => Category::RawBuffer,
            Value::BufferView(_) => Category::BufferView,
            Value::Opaque(_) => Category::Opaque,
            Value::Serialized(_) => Category::Serialized,
            Value::Generator(_) => Category::Generator,
            Value::Module(_) => Category::Module,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.category().is_primitive()
    }

    /// Address of the heap object behind this handle, `None` for inline primitives.
    pub fn heap_addr(&self) -> Option<usize> {
        Some(match self {
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::Text(_) => return None,
            Value::Symbol(v) => v.addr(),
            Value::Callable(v) => v.addr(),
            Value::Error(v) => v.addr(),
            Value::Pattern(v) => v.addr(),
            Value::Instant(v) => v.addr(),
            Value::Record(v) => v.addr(),
            Value::Sequence(v) => v.addr(),
            Value::Map(v) => v.addr(),
            Value::Set(v) => v.addr(),
            Value::WeakMap(v) => v.addr(),
            Value::WeakSet(v) => v.addr(),
            Value::Deferred(v) => v.addr(),
            Value::NumericBuffer(v) => v.addr(),
            Value::RawBuffer(v) => v.addr(),
            Value::BufferView(v) => v.addr(),
            Value::Opaque(v) => v.addr(),
            Value::Serialized(v) => v.addr(),
            Value::Generator(v) => v.addr(),
            Value::Module(v) => v.addr(),
        })
    }

    /// A weak reference to the heap object, `None` for inline primitives.
    pub fn downgrade(&self) -> Option<WeakRef> {
        Some(match self {
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::Text(_) => return None,
            Value::Symbol(v) => v.downgrade(),
            Value::Callable(v) => v.downgrade(),
            Value::Error(v) => v.downgrade(),
            Value::Pattern(v) => v.downgrade(),
            Value::Instant(v) => v.downgrade(),
            Value::Record(v) => v.downgrade(),
            Value::Sequence(v) => v.downgrade(),
            Value::Map(v) => v.downgrade(),
            Value::Set(v) => v.downgrade(),
            Value::WeakMap(v) => v.downgrade(),
            Value::WeakSet(v) => v.downgrade(),
            Value::Deferred(v) => v.downgrade(),
            Value::NumericBuffer(v) => v.downgrade(),
            Value::RawBuffer(v) => v.downgrade(),
            Value::BufferView(v) => v.downgrade(),
            Value::Opaque(v) => v.downgrade(),
            Value::Serialized(v) => v.downgrade(),
            Value::Generator(v) => v.downgrade(),
            Value::Module(v) => v.downgrade(),
        })
    }

    /// Strict identity: equal primitives (NaN equals NaN, `0` and `-0` differ)
    /// or the same heap object.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                (a.is_nan() && b.is_nan()) || (a == b && a.is_sign_negative() == b.is_sign_negative())
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => match (self.heap_addr(), other.heap_addr()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Like [`Value::same_value`] but `0` and `-0` are equal. Used for map keys.
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => (a.is_nan() && b.is_nan()) || a == b,
            _ => self.same_value(other),
        }
    }

    /// Numeric coercion used when storing into numeric buffers.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(true) => 1.0,
            Value::Bool(false) | Value::Null => 0.0,
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Instant(instant) => instant.value_of(),
            _ => f64::NAN,
        }
    }

    /// Own enumerable entries of a traversable value, in enumeration order.
    pub fn own_enumerable_entries(&self) -> Option<Vec<(PropertyKey, Value)>> {
        match self {
            Value::Record(record) => Some(
                record
                    .entries()
                    .into_iter()
                    .map(|(key, value)| (PropertyKey::Name(key), value))
                    .collect(),
            ),
            Value::Sequence(sequence) => Some(
                sequence
                    .values()
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| (PropertyKey::Index(index), value))
                    .collect(),
            ),
            Value::Callable(callable) => Some(
                callable
                    .enumerable_properties()
                    .into_iter()
                    .map(|(key, value)| (PropertyKey::Name(key), value))
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    /// Field lookup on records and callables.
    pub fn get_field(&self, name: &str) -> Option<Value> {
        match self {
            Value::Record(record) => record.get(name),
            Value::Callable(callable) => callable.get_property(name),
            _ => None,
        }
    }

    /// Element lookup on sequences.
    pub fn get_index(&self, index: usize) -> Option<Value> {
        match self {
            Value::Sequence(sequence) => sequence.get(index),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s.into())
    }
}

/// Formats a number the way a script runtime prints it (`1`, `-0` as `0`, `Infinity`).
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{}", s),
            Value::Symbol(symbol) => write!(f, "{}", symbol),
            Value::Callable(callable) => write!(f, "{}", callable.source()),
            Value::Error(error) => write!(f, "{}", error),
            Value::Pattern(pattern) => write!(f, "{}", pattern),
            Value::Instant(instant) => write!(f, "{}", instant),
            other => write!(f, "[object {}]", other.category()),
        }
    }
}
