//! Deep duplication of dynamically typed runtime values.
//!
//! Every [`Value`] is classified into a [`Category`], and the [`Duplicator`]
//! hands it to the [`Strategy`] registered for that category. Records and
//! sequences are rebuilt entry by entry; maps and sets get a shallow copy.
//!
//! ```
//! use facsimile::Value;
//!
//! let original = Value::record([("tags", Value::sequence([Value::from("a")]))]);
//! let copy = facsimile::duplicate(&original).unwrap();
//!
//! assert!(!copy.same_value(&original));
//! assert_eq!(copy.get_field("tags").unwrap().get_index(0).unwrap().as_text(), Some("a"));
//! ```

pub mod category;
pub mod dispatch;
pub mod error;
pub mod json;
pub mod options;
pub mod strategy;
pub mod value;

pub use category::{Category, Classify, NativeClassifier};
pub use dispatch::{Duplicator, Walk};
pub use error::{ConfigError, DuplicateError};
pub use options::{DuplicateOptions, RawBufferMode};
pub use strategy::{Strategy, StrategyTable, strategy};
pub use value::Value;

/// Duplicate `value` with the built-in strategies.
pub fn duplicate(value: &Value) -> Result<Value, DuplicateError> {
    Duplicator::standard().duplicate(value)
}

/// Duplicate `value`, sharing instead of copying every value (the root
/// included) for which `should_dup` returns `false`.
pub fn copy(value: &Value, should_dup: impl Fn(&Value) -> bool) -> Result<Value, DuplicateError> {
    Duplicator::standard().duplicate_with(value, &should_dup)
}
