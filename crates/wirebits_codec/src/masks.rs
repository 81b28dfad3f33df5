//! # Bit Mask Tables
//!
//! Precomputed lookup tables for the unsigned write and read paths.
//!
//! ## Tables
//!
//! - **write**: `write[start][n]` keeps every bit of a word *except* the `n`
//!   bits beginning at `start`. AND it into the destination word to clear the
//!   field before OR-ing the new value in.
//! - **extra**: `extra[n]` keeps the low `n` bits (`extra[32]` is all ones).
//! - **little**: `little[i]` is the single bit `1 << i`.
//!
//! The tables are process-wide and immutable. They are built on first use;
//! call [`init_masks`] at startup to pay that cost before the first packet.

use std::sync::OnceLock;

/// Number of bits in a machine word as used by the codec.
pub const WORD_BITS: u32 = 32;

/// The precomputed mask tables.
pub struct BitMasks {
    write: [[u32; WORD_BITS as usize + 1]; WORD_BITS as usize],
    extra: [u32; WORD_BITS as usize + 1],
    little: [u32; WORD_BITS as usize],
}

static MASKS: OnceLock<BitMasks> = OnceLock::new();

/// Builds the mask tables if they are not built yet.
///
/// Calling this is optional; [`masks`] initializes lazily. Servers call it
/// during startup so the first packet does not pay for table construction.
pub fn init_masks() -> &'static BitMasks {
    masks()
}

/// Returns the process-wide mask tables, building them on first call.
#[inline]
pub fn masks() -> &'static BitMasks {
    MASKS.get_or_init(|| {
        tracing::debug!("building bit mask tables");
        BitMasks::build()
    })
}

/// `1 << bit` widened so that `bit == 32` does not overflow.
#[inline]
const fn bit_for_bitnum(bit: u32) -> u64 {
    1u64 << bit
}

impl BitMasks {
    fn build() -> Self {
        let mut write = [[0u32; WORD_BITS as usize + 1]; WORD_BITS as usize];
        let mut extra = [0u32; WORD_BITS as usize + 1];
        let mut little = [0u32; WORD_BITS as usize];

        for start in 0..WORD_BITS {
            for bits_left in 0..=WORD_BITS {
                let end = start + bits_left;
                let mut mask = (bit_for_bitnum(start) - 1) as u32;
                if end < WORD_BITS {
                    mask |= !((bit_for_bitnum(end) - 1) as u32);
                }
                write[start as usize][bits_left as usize] = mask;
            }
        }

        for bits in 0..=WORD_BITS {
            extra[bits as usize] = (bit_for_bitnum(bits) - 1) as u32;
        }

        for (i, slot) in little.iter_mut().enumerate() {
            *slot = 1 << i;
        }

        Self { write, extra, little }
    }

    /// Mask that clears `bits_left` bits starting at `start` and keeps the rest.
    #[inline]
    #[must_use]
    pub fn write_mask(&self, start: u32, bits_left: u32) -> u32 {
        self.write[start as usize][bits_left as usize]
    }

    /// Mask that keeps the low `bits` bits.
    #[inline]
    #[must_use]
    pub fn extra_mask(&self, bits: u32) -> u32 {
        self.extra[bits as usize]
    }

    /// Single-bit mask for bit `index` of a word.
    #[inline]
    #[must_use]
    pub fn little_bit(&self, index: u32) -> u32 {
        self.little[index as usize]
    }
}
