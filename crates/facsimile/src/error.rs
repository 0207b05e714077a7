use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::category::Category;

/// Failure of a duplication call. Each variant means the engine's own
/// invariants were broken, usually by an injected classifier or table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DuplicateError {
    #[error("no duplication strategy for category `{0}`")]
    UnrecognizedCategory(Category),
    #[error("strategy for `{expected}` received a `{found}` value")]
    CategoryMismatch { expected: Category, found: Category },
    #[error("cannot assign key `{key}` to a {container}")]
    UnassignableKey { key: String, container: Category },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid options: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown raw buffer mode `{0}` (expected `zeroed`, `zeroed-byte-length` or `copy-bytes`)")]
    UnknownRawBufferMode(String),
}
