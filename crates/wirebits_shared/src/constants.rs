//! # Wire Constants
//!
//! Bit widths and resolutions of the fixed-point codecs.
//!
//! **CRITICAL:** These values are baked into every encoded message.
//! Changing one breaks interoperability with every peer built before it.

// =============================================================================
// GENERAL COORDINATES
// =============================================================================

/// Bits used for the integer part of a general coordinate (stored as `n - 1`).
pub const COORD_INTEGER_BITS: u32 = 14;

/// Bits used for the fractional part of a general coordinate.
pub const COORD_FRACTIONAL_BITS: u32 = 12;

/// Fixed-point denominator of the coordinate fraction.
pub const COORD_DENOMINATOR: u32 = 1 << COORD_FRACTIONAL_BITS;

/// Smallest representable coordinate step (1/4096 world unit).
pub const COORD_RESOLUTION: f32 = 1.0 / COORD_DENOMINATOR as f32;

/// Largest integer magnitude a coordinate can carry.
pub const MAX_COORD_INTEGER: u32 = 1 << COORD_INTEGER_BITS;

// =============================================================================
// MULTIPLAYER COORDINATES
// =============================================================================

/// Integer bits used when the coordinate is inside the common play area.
///
/// Anything with an integer magnitude below `1 << 11` takes the narrow path.
pub const COORD_INTEGER_BITS_MP: u32 = 11;

/// Fraction bits in the low-precision multiplayer mode.
pub const COORD_FRACTIONAL_BITS_MP_LOWPRECISION: u32 = 3;

/// Fixed-point denominator of the low-precision fraction.
pub const COORD_DENOMINATOR_LOWPRECISION: u32 = 1 << COORD_FRACTIONAL_BITS_MP_LOWPRECISION;

/// Smallest representable low-precision step (1/8 world unit).
pub const COORD_RESOLUTION_LOWPRECISION: f32 = 1.0 / COORD_DENOMINATOR_LOWPRECISION as f32;

// =============================================================================
// NORMALS
// =============================================================================

/// Bits used for the magnitude of one normal component.
pub const NORMAL_FRACTIONAL_BITS: u32 = 11;

/// Fixed-point denominator of a normal component.
///
/// One less than `1 << 11` so that exactly 1.0 is representable.
pub const NORMAL_DENOMINATOR: u32 = (1 << NORMAL_FRACTIONAL_BITS) - 1;

/// Smallest representable normal component step.
pub const NORMAL_RESOLUTION: f32 = 1.0 / NORMAL_DENOMINATOR as f32;

// =============================================================================
// TRANSPORT
// =============================================================================

/// Maximum packet size (MTU-safe). Default capacity for packet buffers.
pub const MAX_PACKET_SIZE: usize = 1200;
