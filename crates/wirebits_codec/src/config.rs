//! # Codec Configuration
//!
//! Runtime knobs for buffers created through the `from_config` constructors.
//! Loaded once at startup from TOML; nothing here changes the wire format.
//!
//! ```toml
//! max_packet_bytes = 1200
//! assert_on_overflow = true
//! max_string_bytes = 256
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use wirebits_shared::MAX_PACKET_SIZE;

use crate::buffer::{WordBuffer, WORD_BYTES};
use crate::error::{ConfigError, ConfigResult};

/// Default destination size for owned string reads.
pub const DEFAULT_MAX_STRING_BYTES: usize = 512;

/// Configuration for writers and readers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Capacity clamp for buffers built from this config, in bytes.
    ///
    /// Must be non-zero and a multiple of 4.
    pub max_packet_bytes: usize,
    /// Trip a debug assertion when a buffer overflows.
    ///
    /// Catches schema mismatches early in debug builds; no effect in release.
    pub assert_on_overflow: bool,
    /// Destination size (terminator included) for owned string reads.
    pub max_string_bytes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_packet_bytes: MAX_PACKET_SIZE,
            assert_on_overflow: false,
            max_string_bytes: DEFAULT_MAX_STRING_BYTES,
        }
    }
}

impl CodecConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] for values that fail validation.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`CodecConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            max_packet_bytes = config.max_packet_bytes,
            assert_on_overflow = config.assert_on_overflow,
            "loaded codec config"
        );
        Ok(config)
    }

    /// Checks value constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_packet_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_packet_bytes must be greater than 0".into(),
            ));
        }
        if self.max_packet_bytes % WORD_BYTES != 0 {
            return Err(ConfigError::Invalid(format!(
                "max_packet_bytes must be a multiple of {WORD_BYTES}, got {}",
                self.max_packet_bytes
            )));
        }
        if self.max_string_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_string_bytes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Capacity in bits for a caller buffer of `available_bytes`.
    #[inline]
    #[must_use]
    pub fn capacity_bits(&self, available_bytes: usize) -> usize {
        available_bytes.min(self.max_packet_bytes) * 8
    }

    /// Allocates a zeroed, word-aligned buffer of `max_packet_bytes`.
    #[must_use]
    pub fn packet_buffer(&self) -> WordBuffer {
        WordBuffer::with_capacity_bytes(self.max_packet_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.max_packet_bytes, 1200);
        assert!(!config.assert_on_overflow);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CodecConfig::from_toml_str("assert_on_overflow = true").unwrap();
        assert!(config.assert_on_overflow);
        assert_eq!(config.max_packet_bytes, MAX_PACKET_SIZE);
        assert_eq!(config.max_string_bytes, DEFAULT_MAX_STRING_BYTES);
    }

    #[test]
    fn test_rejects_unaligned_packet_size() {
        let err = CodecConfig::from_toml_str("max_packet_bytes = 1201").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_string_size() {
        let err = CodecConfig::from_toml_str("max_string_bytes = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = CodecConfig::from_toml_str("max_packet_size = 64").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_capacity_is_clamped() {
        let config = CodecConfig {
            max_packet_bytes: 64,
            ..CodecConfig::default()
        };
        assert_eq!(config.capacity_bits(1024), 512);
        assert_eq!(config.capacity_bits(16), 128);
        assert_eq!(config.packet_buffer().len_bytes(), 64);
    }
}
