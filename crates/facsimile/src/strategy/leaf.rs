//! Strategies that build their copy without walking a container's entries.

use crate::category::Category;
use crate::dispatch::Walk;
use crate::error::DuplicateError;
use crate::options::RawBufferMode;
use crate::value::{ErrorObject, Instant, RawBuffer, Value};

pub(crate) fn mismatch(expected: Category, found: &Value) -> DuplicateError {
    DuplicateError::CategoryMismatch {
        expected,
        found: found.category(),
    }
}

/// The value itself. Primitives have no identity to break, and opaque handles
/// are never looked into.
pub fn identity(_walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    Ok(value.clone())
}

/// A new callable sharing the behavior, with its enumerable properties
/// duplicated.
pub fn callable(walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    let Value::Callable(source) = value else {
        return Err(mismatch(Category::Function, value));
    };
    let copy = source.sibling();
    let result = Value::Callable(copy.clone());
    walk.remember(value, &result);
    for (key, property) in source.enumerable_properties() {
        copy.set_property(key, walk.duplicate(&property)?);
    }
    Ok(result)
}

/// Same name and message. Stack and cause are dropped.
pub fn error(_walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    match value {
        Value::Error(source) => Ok(Value::Error(ErrorObject::new(
            source.name(),
            source.message(),
        ))),
        other => Err(mismatch(Category::Error, other)),
    }
}

pub fn pattern(_walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    match value {
        Value::Pattern(source) => Ok(Value::Pattern(source.recompiled())),
        other => Err(mismatch(Category::Pattern, other)),
    }
}

pub fn instant(_walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    match value {
        Value::Instant(source) => Ok(Value::Instant(Instant::from_millis(source.value_of()))),
        other => Err(mismatch(Category::Instant, other)),
    }
}

/// A new map over the very same keys and values.
pub fn map(_walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    match value {
        Value::Map(source) => Ok(Value::Map(source.shallow_copy())),
        other => Err(mismatch(Category::Map, other)),
    }
}

pub fn set(_walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    match value {
        Value::Set(source) => Ok(Value::Set(source.shallow_copy())),
        other => Err(mismatch(Category::Set, other)),
    }
}

/// A distinct deferred settling with the source's outcome. The producer is
/// not run again.
pub fn deferred(_walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    match value {
        Value::Deferred(source) => Ok(Value::Deferred(source.derive())),
        other => Err(mismatch(Category::Deferred, other)),
    }
}

pub fn raw_buffer(walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    let Value::RawBuffer(source) = value else {
        return Err(mismatch(Category::RawBuffer, value));
    };
    let copy = match walk.options().raw_buffer {
        RawBufferMode::Zeroed => {
            // a raw buffer has no element count, so the sized copy is empty
            if !source.is_empty() {
                log::warn!(
                    "raw buffer of {} bytes duplicated as an empty buffer; contents not copied",
                    source.len()
                );
            }
            RawBuffer::zeroed(0)
        }
        RawBufferMode::ZeroedByteLength => {
            if !source.is_empty() {
                log::warn!(
                    "raw buffer of {} bytes duplicated as zero-filled; contents not copied",
                    source.len()
                );
            }
            RawBuffer::zeroed(source.len())
        }
        RawBufferMode::CopyBytes => RawBuffer::from_bytes(source.to_vec()),
    };
    Ok(Value::RawBuffer(copy))
}

/// A new view aliasing the same buffer window.
pub fn buffer_view(_walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    match value {
        Value::BufferView(source) => Ok(Value::BufferView(source.realias())),
        other => Err(mismatch(Category::BufferView, other)),
    }
}
