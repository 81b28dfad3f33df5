//! # Codec Error Types
//!
//! The codec itself never returns errors: overflow is sticky state on the
//! writer or reader. These types exist for callers that want to turn a
//! finished pass into a `Result`, and for configuration loading.

use thiserror::Error;

/// Which side of the codec hit the error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// A `BitWriter` ran out of room.
    Write,
    /// A `BitReader` ran past the end of its data.
    Read,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Write => f.write_str("write"),
            Self::Read => f.write_str("read"),
        }
    }
}

/// Errors reported by a finished bit buffer pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitBufError {
    /// The buffer overflowed at some point during the pass.
    ///
    /// The message is truncated and must be discarded.
    #[error("{direction} overflow in bit buffer '{name}': cursor at bit {bit_position} of {capacity_bits}")]
    Overflow {
        /// Writer or reader.
        direction: Direction,
        /// Debug name of the buffer, or `unnamed`.
        name: String,
        /// Cursor position when the pass was finished.
        bit_position: usize,
        /// Declared capacity in bits.
        capacity_bits: usize,
    },
}

/// Result type for finished bit buffer passes.
pub type BitBufResult<T> = Result<T, BitBufError>;

/// Errors that can occur while loading codec configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for `CodecConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is not acceptable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
