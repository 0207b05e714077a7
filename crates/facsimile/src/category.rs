use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{BufferKind, Value};

/// Runtime category of a [`Value`]. Every value belongs to exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Text,
    Number,
    Boolean,
    Null,
    Undefined,
    Symbol,
    Function,
    Error,
    Pattern,
    Instant,
    Record,
    Sequence,
    Map,
    WeakMap,
    Set,
    WeakSet,
    Opaque,
    Deferred,
    Int8Buffer,
    Uint8Buffer,
    Uint8ClampedBuffer,
    Int16Buffer,
    Uint16Buffer,
    Int32Buffer,
    Uint32Buffer,
    Float32Buffer,
    Float64Buffer,
    RawBuffer,
    BufferView,
    Serialized,
    Generator,
    GeneratorFunction,
    Module,
    AsyncFunction,
}

impl Category {
    pub const COUNT: usize = 34;

    pub const ALL: [Category; Self::COUNT] = [
        Category::Text,
        Category::Number,
        Category::Boolean,
        Category::Null,
        Category::Undefined,
        Category::Symbol,
        Category::Function,
        Category::Error,
        Category::Pattern,
        Category::Instant,
        Category::Record,
        Category::Sequence,
        Category::Map,
        Category::WeakMap,
        Category::Set,
        Category::WeakSet,
        Category::Opaque,
        Category::Deferred,
        Category::Int8Buffer,
        Category::Uint8Buffer,
        Category::Uint8ClampedBuffer,
        Category::Int16Buffer,
        Category::Uint16Buffer,
        Category::Int32Buffer,
        Category::Uint32Buffer,
        Category::Float32Buffer,
        Category::Float64Buffer,
        Category::RawBuffer,
        Category::BufferView,
        Category::Serialized,
        Category::Generator,
        Category::GeneratorFunction,
        Category::Module,
        Category::AsyncFunction,
    ];

    /// Position in [`Category::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Number => "number",
            Category::Boolean => "boolean",
            Category::Null => "null",
            Category::Undefined => "undefined",
            Category::Symbol => "symbol",
            Category::Function => "function",
            Category::Error => "error",
            Category::Pattern => "pattern",
            Category::Instant => "instant",
            Category::Record => "record",
            Category::Sequence => "sequence",
            Category::Map => "map",
            Category::WeakMap => "weak-map",
            Category::Set => "set",
            Category::WeakSet => "weak-set",
            Category::Opaque => "opaque",
            Category::Deferred => "deferred",
            Category::Int8Buffer => "int8-buffer",
            Category::Uint8Buffer => "uint8-buffer",
            Category::Uint8ClampedBuffer => "uint8-clamped-buffer",
            Category::Int16Buffer => "int16-buffer",
            Category::Uint16Buffer => "uint16-buffer",
            Category::Int32Buffer => "int32-buffer",
            Category::Uint32Buffer => "uint32-buffer",
            Category::Float32Buffer => "float32-buffer",
            Category::Float64Buffer => "float64-buffer",
            Category::RawBuffer => "raw-buffer",
            Category::BufferView => "buffer-view",
            Category::Serialized => "serialized",
            Category::Generator => "generator",
            Category::GeneratorFunction => "generator-function",
            Category::Module => "module",
            Category::AsyncFunction => "async-function",
        }
    }

    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            Category::Text
                | Category::Number
                | Category::Boolean
                | Category::Null
                | Category::Undefined
        )
    }

    /// Element type for the nine numeric buffer categories.
    pub fn buffer_kind(self) -> Option<BufferKind> {
        BufferKind::ALL.into_iter().find(|kind| kind.category() == self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification oracle: maps every value to its category.
///
/// Implementations must be total and deterministic.
pub trait Classify: Send + Sync {
    fn classify(&self, value: &Value) -> Category;
}

/// Reads the category straight off the value's variant.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeClassifier;

impl Classify for NativeClassifier {
    fn classify(&self, value: &Value) -> Category {
        value.category()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (position, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), position);
        }
    }

    #[test]
    fn names_match_serde() {
        for category in Category::ALL {
            let encoded = serde_json::to_value(category).unwrap();
            assert_eq!(encoded, serde_json::Value::String(category.name().into()));
        }
    }

    #[test]
    fn buffer_categories_know_their_kind() {
        assert_eq!(Category::Uint8ClampedBuffer.buffer_kind(), Some(BufferKind::Uint8Clamped));
        assert_eq!(Category::RawBuffer.buffer_kind(), None);
        assert_eq!(Category::ALL.iter().filter(|c| c.buffer_kind().is_some()).count(), 9);
    }
}
