//! # WIREBITS Shared
//!
//! Wire-format constants and plain math types used by both sides of a
//! connection.
//!
//! ## CRITICAL RULE
//!
//! Every constant in [`constants`] is part of the wire format. Encoder and
//! decoder must be built from the same values or every coordinate, normal and
//! angle on the wire decodes to garbage.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    COORD_DENOMINATOR, COORD_DENOMINATOR_LOWPRECISION, COORD_FRACTIONAL_BITS,
    COORD_FRACTIONAL_BITS_MP_LOWPRECISION, COORD_INTEGER_BITS, COORD_INTEGER_BITS_MP,
    COORD_RESOLUTION, COORD_RESOLUTION_LOWPRECISION, MAX_COORD_INTEGER, MAX_PACKET_SIZE,
    NORMAL_DENOMINATOR, NORMAL_FRACTIONAL_BITS, NORMAL_RESOLUTION,
};
pub use math::{Angles, Vec3};
