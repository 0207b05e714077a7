//! Tunables for a [`crate::Duplicator`], loadable from TOML.
//!
//! ```toml
//! track_cycles = true
//! raw_buffer = "copy-bytes"
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How raw byte buffers are duplicated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RawBufferMode {
    /// An empty buffer. Neither the size nor the contents carry over.
    #[default]
    Zeroed,
    /// A zero-filled buffer of the source's byte length. Contents are lost.
    ZeroedByteLength,
    /// A buffer holding a copy of the source bytes.
    CopyBytes,
}

impl FromStr for RawBufferMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zeroed" => Ok(RawBufferMode::Zeroed),
            "zeroed-byte-length" => Ok(RawBufferMode::ZeroedByteLength),
            "copy-bytes" => Ok(RawBufferMode::CopyBytes),
            other => Err(ConfigError::UnknownRawBufferMode(other.to_string())),
        }
    }
}

impl fmt::Display for RawBufferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RawBufferMode::Zeroed => "zeroed",
            RawBufferMode::ZeroedByteLength => "zeroed-byte-length",
            RawBufferMode::CopyBytes => "copy-bytes",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DuplicateOptions {
    /// Remember every duplicated heap value so cycles terminate and shared
    /// sub-values stay shared in the copy.
    pub track_cycles: bool,
    pub raw_buffer: RawBufferMode,
}

impl DuplicateOptions {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options = DuplicateOptions::from_toml_str("track_cycles = true").unwrap();
        assert!(options.track_cycles);
        assert_eq!(options.raw_buffer, RawBufferMode::Zeroed);
    }

    #[test]
    fn rejects_unknown_fields_and_modes() {
        assert!(DuplicateOptions::from_toml_str("depth = 3").is_err());
        assert!(DuplicateOptions::from_toml_str("raw_buffer = \"mirror\"").is_err());
        assert_eq!(
            "zeroed-byte-length".parse::<RawBufferMode>().unwrap(),
            RawBufferMode::ZeroedByteLength
        );
        assert_eq!(
            DuplicateOptions::from_toml_str("raw_buffer = \"zeroed-byte-length\"")
                .unwrap()
                .raw_buffer,
            RawBufferMode::ZeroedByteLength
        );
        assert!(matches!(
            "mirror".parse::<RawBufferMode>(),
            Err(ConfigError::UnknownRawBufferMode(mode)) if mode == "mirror"
        ));
    }
}
