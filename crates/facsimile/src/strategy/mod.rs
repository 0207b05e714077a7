//! Per-category duplication strategies and the table that holds them.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::category::Category;
use crate::dispatch::Walk;
use crate::error::DuplicateError;
use crate::value::{BufferKind, Value};

pub mod composite;
pub mod leaf;

pub use composite::{ContainerKind, numeric_buffer, traversable};

/// Produces the duplicate of one value. Nested values go back through the
/// [`Walk`].
pub type Strategy =
    Arc<dyn Fn(&mut Walk<'_>, &Value) -> Result<Value, DuplicateError> + Send + Sync>;

pub fn strategy<F>(f: F) -> Strategy
where
    F: Fn(&mut Walk<'_>, &Value) -> Result<Value, DuplicateError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The built-in strategy for `category`.
pub fn default_strategy(category: Category) -> Strategy {
    match category {
        Category::Text
        | Category::Number
        | Category::Boolean
        | Category::Null
        | Category::Undefined
        | Category::Symbol
        | Category::Opaque
        | Category::Serialized
        | Category::Generator
        | Category::WeakMap
        | Category::WeakSet
        | Category::Module => strategy(leaf::identity),
        Category::Function | Category::GeneratorFunction | Category::AsyncFunction => {
            strategy(leaf::callable)
        }
        Category::Error => strategy(leaf::error),
        Category::Pattern => strategy(leaf::pattern),
        Category::Instant => strategy(leaf::instant),
        Category::Record => traversable(ContainerKind::Record),
        Category::Sequence => traversable(ContainerKind::Sequence),
        Category::Map => strategy(leaf::map),
        Category::Set => strategy(leaf::set),
        Category::Deferred => strategy(leaf::deferred),
        Category::Int8Buffer => numeric_buffer(BufferKind::Int8),
        Category::Uint8Buffer => numeric_buffer(BufferKind::Uint8),
        Category::Uint8ClampedBuffer => numeric_buffer(BufferKind::Uint8Clamped),
        Category::Int16Buffer => numeric_buffer(BufferKind::Int16),
        Category::Uint16Buffer => numeric_buffer(BufferKind::Uint16),
        Category::Int32Buffer => numeric_buffer(BufferKind::Int32),
        Category::Uint32Buffer => numeric_buffer(BufferKind::Uint32),
        Category::Float32Buffer => numeric_buffer(BufferKind::Float32),
        Category::Float64Buffer => numeric_buffer(BufferKind::Float64),
        Category::RawBuffer => strategy(leaf::raw_buffer),
        Category::BufferView => strategy(leaf::buffer_view),
    }
}

static STANDARD: Lazy<Arc<StrategyTable>> = Lazy::new(|| Arc::new(StrategyTable::defaults()));

/// One optional strategy per category. Immutable once built; the builders
/// return new tables.
#[derive(Clone)]
pub struct StrategyTable {
    slots: [Option<Strategy>; Category::COUNT],
}

impl StrategyTable {
    pub fn empty() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// A fresh table holding the built-in strategy for every category.
    pub fn defaults() -> Self {
        Category::ALL
            .into_iter()
            .fold(Self::empty(), |table, category| {
                table.with(category, default_strategy(category))
            })
    }

    /// The shared built-in table.
    pub fn standard() -> Arc<Self> {
        STANDARD.clone()
    }

    pub fn with(mut self, category: Category, strategy: Strategy) -> Self {
        self.slots[category.index()] = Some(strategy);
        self
    }

    pub fn without(mut self, category: Category) -> Self {
        self.slots[category.index()] = None;
        self
    }

    pub fn get(&self, category: Category) -> Option<&Strategy> {
        self.slots[category.index()].as_ref()
    }

    pub fn contains(&self, category: Category) -> bool {
        self.get(category).is_some()
    }

    /// Number of categories with a strategy.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn covers_all(&self) -> bool {
        self.len() == Category::COUNT
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::defaults()
    }
}

impl fmt::Debug for StrategyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Category::ALL.into_iter().filter(|category| self.contains(*category)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_complete_and_shared() {
        let table = StrategyTable::standard();
        assert!(table.covers_all());
        assert!(Arc::ptr_eq(&table, &StrategyTable::standard()));
    }

    #[test]
    fn builders_leave_the_source_untouched() {
        let base = StrategyTable::defaults();
        let trimmed = base.clone().without(Category::Map);
        assert!(base.contains(Category::Map));
        assert!(!trimmed.contains(Category::Map));
        assert_eq!(trimmed.len(), Category::COUNT - 1);
        assert!(StrategyTable::empty().is_empty());
    }
}
