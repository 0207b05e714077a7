//! Strategy builders for values whose elements are duplicated one by one.

use crate::category::Category;
use crate::dispatch::Walk;
use crate::error::DuplicateError;
use crate::strategy::leaf::mismatch;
use crate::strategy::{Strategy, strategy};
use crate::value::{BufferKind, NumericBuffer, PropertyKey, Record, Sequence, Value};

/// Shape of the container a traversal builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Record,
    Sequence,
}

impl ContainerKind {
    pub fn category(self) -> Category {
        match self {
            ContainerKind::Record => Category::Record,
            ContainerKind::Sequence => Category::Sequence,
        }
    }

    /// An empty container of this kind.
    pub fn allocate(self) -> Value {
        match self {
            ContainerKind::Record => Value::Record(Record::new()),
            ContainerKind::Sequence => Value::Sequence(Sequence::new()),
        }
    }

    /// Store `value` under `key`. Sequences only take indices, or names that
    /// spell one.
    pub fn assign(self, target: &Value, key: PropertyKey, value: Value) -> Result<(), DuplicateError> {
        match target {
            Value::Record(record) => {
                record.set(key.to_string(), value);
                Ok(())
            }
            Value::Sequence(sequence) => {
                let index = match &key {
                    PropertyKey::Index(index) => Some(*index),
                    PropertyKey::Name(name) => name.parse::<usize>().ok(),
                };
                let index = index.ok_or_else(|| DuplicateError::UnassignableKey {
                    key: key.to_string(),
                    container: Category::Sequence,
                })?;
                sequence.set(index, value);
                Ok(())
            }
            other => Err(mismatch(self.category(), other)),
        }
    }
}

/// Copy the source's own enumerable entries, in order, into a fresh
/// container of `kind`, duplicating each value.
pub fn traversable(kind: ContainerKind) -> Strategy {
    strategy(move |walk, value| traverse(kind, walk, value))
}

fn traverse(kind: ContainerKind, walk: &mut Walk<'_>, value: &Value) -> Result<Value, DuplicateError> {
    let Some(entries) = value.own_enumerable_entries() else {
        return Err(mismatch(kind.category(), value));
    };
    let copy = kind.allocate();
    walk.remember(value, &copy);
    for (key, item) in entries {
        let item = walk.duplicate(&item)?;
        kind.assign(&copy, key, item)?;
    }
    Ok(copy)
}

/// Copy a numeric buffer of `kind` element by element. Each element goes
/// through the dispatcher as a number and is stored with the kind's
/// conversion.
pub fn numeric_buffer(kind: BufferKind) -> Strategy {
    strategy(move |walk, value| {
        let source = match value {
            Value::NumericBuffer(source) if source.kind() == kind => source,
            other => return Err(mismatch(kind.category(), other)),
        };
        let copy = NumericBuffer::new(kind, source.len());
        let result = Value::NumericBuffer(copy.clone());
        walk.remember(value, &result);
        for (index, element) in source.to_vec().into_iter().enumerate() {
            let element = walk.duplicate(&Value::Number(element))?;
            copy.set(index, element.to_number());
        }
        Ok(result)
    })
}
