//! # Word Access
//!
//! Little-endian 32-bit word loads and stores over plain byte slices.
//!
//! The bit writer and reader address their buffer one word at a time. A
//! buffer whose length is not a multiple of 4 has a short final word; loads
//! zero-fill the missing bytes and stores drop them, so no access ever leaves
//! the slice.

use bytemuck::{cast_slice, cast_slice_mut};

use crate::masks::WORD_BITS;

/// Bytes per codec word.
pub const WORD_BYTES: usize = (WORD_BITS / 8) as usize;

/// Loads word `index` of `data` as a little-endian `u32`.
#[inline]
pub(crate) fn load_word(data: &[u8], index: usize) -> u32 {
    let start = index * WORD_BYTES;
    let mut word = [0u8; WORD_BYTES];
    if let Some(tail) = data.get(start..) {
        for (dst, src) in word.iter_mut().zip(tail) {
            *dst = *src;
        }
    }
    u32::from_le_bytes(word)
}

/// Stores `value` into word `index` of `data` in little-endian order.
#[inline]
pub(crate) fn store_word(data: &mut [u8], index: usize, value: u32) {
    let start = index * WORD_BYTES;
    if let Some(tail) = data.get_mut(start..) {
        for (dst, src) in tail.iter_mut().zip(value.to_le_bytes()) {
            *dst = src;
        }
    }
}

/// Owned, 4-byte-aligned packet storage.
///
/// The codec borrows caller memory and never allocates. `WordBuffer` is the
/// caller-side convenience for getting a byte slice that really is word
/// aligned, matching the layout the word fast paths are tuned for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordBuffer {
    words: Vec<u32>,
}

impl WordBuffer {
    /// Allocates a zeroed buffer of at least `bytes` bytes, rounded up to a
    /// whole number of words.
    #[must_use]
    pub fn with_capacity_bytes(bytes: usize) -> Self {
        Self {
            words: vec![0; bytes.div_ceil(WORD_BYTES)],
        }
    }

    /// Capacity in bytes (always a multiple of 4).
    #[inline]
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Returns true if the buffer has no capacity.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The buffer as bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        cast_slice(&self.words)
    }

    /// The buffer as mutable bytes, ready to hand to a `BitWriter`.
    #[inline]
    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        cast_slice_mut(&mut self.words)
    }

    /// Zeroes the whole buffer.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}
