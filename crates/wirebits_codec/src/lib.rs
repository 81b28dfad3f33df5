//! # WIREBITS Codec - Bit-Packed Message Buffers
//!
//! Bit-granular serialization for real-time multiplayer messages.
//!
//! ## Architecture
//!
//! - **Primitives**: unsigned/signed fields of 1..=32 bits, single bits,
//!   variable-width integers, raw bit runs, raw floats and C-style strings
//! - **Spatial codecs**: world coordinates, angles and unit normals as
//!   compact fixed-point fields
//! - **Overflow model**: capacity is checked before every write or read; a
//!   failed operation sets a sticky flag instead of returning an error
//!
//! ## Wire Layout
//!
//! ```text
//! word 0 (little endian)                 word 1
//! ┌──────────────────────────────────┐   ┌──────────────────────────────────┐
//! │ bit 31 ...................  bit 0│   │ bit 63 ..................  bit 32│
//! └──────────────────────────────────┘   └──────────────────────────────────┘
//!   fields fill from bit 0 upward and may straddle a word boundary
//! ```
//!
//! Writer and reader must agree on the exact sequence of operations and
//! their parameters. Nothing on the wire describes the fields.
//!
//! ## Example
//!
//! ```rust
//! use wirebits_codec::{BitReader, BitWriter};
//!
//! let mut buf = [0u8; 64];
//! let mut writer = BitWriter::new(&mut buf).with_debug_name("entity_update");
//! writer.write_unsigned(42, 7);
//! writer.write_coord(12.5);
//! writer.write_string("hello");
//! let len = writer.finish().expect("fits");
//!
//! let mut reader = BitReader::new(&buf[..len]);
//! assert_eq!(reader.read_unsigned(7), 42);
//! assert!((reader.read_coord() - 12.5).abs() < 1.0 / 4096.0);
//! assert_eq!(reader.read_owned_string(false), "hello");
//! assert!(!reader.is_overflowed());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod buffer;
pub mod config;
pub mod coord;
pub mod diagnostics;
pub mod error;
pub mod masks;
pub mod reader;
pub mod writer;

// Re-exports for convenience
pub use buffer::WordBuffer;
pub use config::CodecConfig;
pub use coord::CoordPrecision;
pub use diagnostics::{overflow_handler, set_overflow_handler, OverflowEvent, OverflowHandler};
pub use error::{BitBufError, BitBufResult, ConfigError, ConfigResult, Direction};
pub use masks::init_masks;
pub use reader::{BitReader, StringRead};
pub use writer::BitWriter;

pub use wirebits_shared::{Angles, Vec3};
