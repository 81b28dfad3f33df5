//! # Bit Reader
//!
//! Sequential bit reader over an immutable byte slice. Mirrors
//! [`BitWriter`](crate::BitWriter) field for field: a value written with
//! `write_x` comes back from `read_x` given the same parameters.
//!
//! Reading past the end sets a sticky overflow flag and yields zero (or an
//! empty string); the cursor never moves past the declared capacity.

use std::borrow::Cow;

use crate::buffer::load_word;
use crate::config::{CodecConfig, DEFAULT_MAX_STRING_BYTES};
use crate::diagnostics::{report_overflow, OverflowEvent};
use crate::error::{BitBufError, BitBufResult, Direction};
use crate::masks::{masks, WORD_BITS};
use crate::writer::{VAR_UNSIGNED_SELECTOR_BITS, VAR_UNSIGNED_WIDTHS};

/// Outcome of [`BitReader::read_string`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StringRead {
    /// Bytes stored in the destination, terminator excluded.
    pub len: usize,
    /// The encoded string did not fit and was cut short.
    pub truncated: bool,
}

/// Bit-level reader over a borrowed byte slice.
#[derive(Clone, Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    data_bits: usize,
    cur_bit: usize,
    overflow: bool,
    assert_on_overflow: bool,
    max_string_bytes: usize,
    debug_name: Option<Cow<'static, str>>,
}

impl<'a> BitReader<'a> {
    /// Creates a reader over every bit of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_bit_capacity(data, data.len() * 8)
    }

    /// Creates a reader over the first `num_bits` bits of `data`.
    ///
    /// `num_bits` is clamped to the slice length.
    #[must_use]
    pub fn with_bit_capacity(data: &'a [u8], num_bits: usize) -> Self {
        debug_assert!(num_bits <= data.len() * 8, "bit capacity exceeds buffer");
        masks();
        Self {
            data,
            data_bits: num_bits.min(data.len() * 8),
            cur_bit: 0,
            overflow: false,
            assert_on_overflow: false,
            max_string_bytes: DEFAULT_MAX_STRING_BYTES,
            debug_name: None,
        }
    }

    /// Creates a reader using the capacity clamp, overflow policy and string
    /// limit of `config`.
    #[must_use]
    pub fn from_config(data: &'a [u8], config: &CodecConfig) -> Self {
        let mut reader = Self::with_bit_capacity(data, config.capacity_bits(data.len()));
        reader.assert_on_overflow = config.assert_on_overflow;
        reader.max_string_bytes = config.max_string_bytes;
        reader
    }

    /// Builder form of [`BitReader::set_debug_name`].
    #[must_use]
    pub fn with_debug_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.set_debug_name(name);
        self
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Rewinds to bit 0 and clears the overflow flag.
    #[inline]
    pub fn reset(&mut self) {
        self.cur_bit = 0;
        self.overflow = false;
    }

    /// Moves the cursor to `bit`.
    ///
    /// Positions past the capacity set the overflow flag and return false.
    pub fn seek(&mut self, bit: usize) -> bool {
        if bit > self.data_bits {
            self.raise_overflow("seek", bit.saturating_sub(self.cur_bit));
            return false;
        }
        self.cur_bit = bit;
        true
    }

    /// Moves the cursor by `delta` bits in either direction.
    pub fn seek_relative(&mut self, delta: isize) -> bool {
        match self.cur_bit.checked_add_signed(delta) {
            Some(bit) => self.seek(bit),
            None => {
                self.raise_overflow("seek_relative", delta.unsigned_abs());
                false
            }
        }
    }

    /// Returns true once any read has run past the end.
    #[inline]
    #[must_use]
    pub const fn is_overflowed(&self) -> bool {
        self.overflow
    }

    /// Marks the reader as overflowed without reporting it.
    #[inline]
    pub fn set_overflowed(&mut self) {
        self.overflow = true;
    }

    /// Trip a debug assertion on overflow. No effect in release builds.
    #[inline]
    pub fn set_assert_on_overflow(&mut self, assert: bool) {
        self.assert_on_overflow = assert;
    }

    /// Destination size used by [`BitReader::read_owned_string`].
    #[inline]
    pub fn set_max_string_bytes(&mut self, bytes: usize) {
        self.max_string_bytes = bytes;
    }

    /// Diagnostic label reported with overflows.
    #[inline]
    #[must_use]
    pub fn debug_name(&self) -> Option<&str> {
        self.debug_name.as_deref()
    }

    /// Sets the diagnostic label.
    pub fn set_debug_name(&mut self, name: impl Into<Cow<'static, str>>) {
        self.debug_name = Some(name.into());
    }

    /// Bits consumed so far.
    #[inline]
    #[must_use]
    pub const fn num_bits_read(&self) -> usize {
        self.cur_bit
    }

    /// Bytes touched so far, rounded up.
    #[inline]
    #[must_use]
    pub const fn num_bytes_read(&self) -> usize {
        self.cur_bit.div_ceil(8)
    }

    /// Bits remaining.
    #[inline]
    #[must_use]
    pub const fn num_bits_left(&self) -> usize {
        self.data_bits - self.cur_bit
    }

    /// Whole bytes remaining.
    #[inline]
    #[must_use]
    pub const fn num_bytes_left(&self) -> usize {
        self.num_bits_left() >> 3
    }

    /// Declared capacity in bits.
    #[inline]
    #[must_use]
    pub const fn max_num_bits(&self) -> usize {
        self.data_bits
    }

    /// The underlying bytes.
    #[inline]
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Ends the pass: the number of bits consumed, or the overflow.
    ///
    /// # Errors
    ///
    /// Returns [`BitBufError::Overflow`] if any read in the pass overflowed.
    pub fn finish(&self) -> BitBufResult<usize> {
        if self.overflow {
            return Err(BitBufError::Overflow {
                direction: Direction::Read,
                name: self.debug_name().unwrap_or("unnamed").to_string(),
                bit_position: self.cur_bit,
                capacity_bits: self.data_bits,
            });
        }
        Ok(self.cur_bit)
    }

    // =========================================================================
    // Capacity checks
    // =========================================================================

    #[inline]
    fn reserve(&mut self, bits: usize, operation: &'static str) -> bool {
        if self.overflow {
            return false;
        }
        if bits > self.num_bits_left() {
            self.raise_overflow(operation, bits);
            return false;
        }
        true
    }

    #[cold]
    fn raise_overflow(&mut self, operation: &'static str, requested_bits: usize) {
        let first = !self.overflow;
        self.overflow = true;
        if first {
            report_overflow(&OverflowEvent {
                direction: Direction::Read,
                debug_name: self.debug_name.as_deref(),
                operation,
                bit_position: self.cur_bit,
                requested_bits,
                capacity_bits: self.data_bits,
            });
        }
        debug_assert!(
            !self.assert_on_overflow,
            "bit buffer overflow in {operation}"
        );
    }

    /// Extracts `num_bits` (0..=32) starting at `bit` without moving the cursor.
    ///
    /// Callers have already checked capacity.
    #[inline]
    fn fetch(&self, bit: usize, num_bits: u32) -> u32 {
        if num_bits == 0 {
            return 0;
        }
        let start = (bit & 31) as u32;
        let first = bit >> 5;
        let last = (bit + num_bits as usize - 1) >> 5;

        let low = load_word(self.data, first) >> start;
        let high = if start == 0 {
            0
        } else {
            load_word(self.data, last) << (WORD_BITS - start)
        };
        (low | high) & masks().extra_mask(num_bits)
    }

    #[inline]
    fn take(&mut self, num_bits: u32) -> u32 {
        let value = self.fetch(self.cur_bit, num_bits);
        self.cur_bit += num_bits as usize;
        value
    }

    // =========================================================================
    // Primitive codecs
    // =========================================================================

    /// Reads a single bit.
    #[inline]
    pub fn read_one_bit(&mut self) -> bool {
        if !self.reserve(1, "read_one_bit") {
            return false;
        }
        self.take(1) != 0
    }

    /// Reads `num_bits` (1..=32) as an unsigned value.
    #[inline]
    pub fn read_unsigned(&mut self, num_bits: u32) -> u32 {
        debug_assert!(num_bits <= WORD_BITS, "read_unsigned: {num_bits} bits");
        let num_bits = num_bits.min(WORD_BITS);
        if num_bits == 0 || !self.reserve(num_bits as usize, "read_unsigned") {
            return 0;
        }
        self.take(num_bits)
    }

    /// Looks at the next `num_bits` without consuming them.
    ///
    /// Never sets the overflow flag; returns 0 if the bits are not there.
    #[must_use]
    pub fn peek_unsigned(&self, num_bits: u32) -> u32 {
        let num_bits = num_bits.min(WORD_BITS);
        if self.overflow || num_bits as usize > self.num_bits_left() {
            return 0;
        }
        self.fetch(self.cur_bit, num_bits)
    }

    /// Reads a field written by [`BitWriter::write_signed`](crate::BitWriter::write_signed).
    pub fn read_signed(&mut self, num_bits: u32) -> i32 {
        debug_assert!((2..=WORD_BITS).contains(&num_bits), "read_signed: {num_bits} bits");
        let num_bits = num_bits.min(WORD_BITS);
        if num_bits == 0 || !self.reserve(num_bits as usize, "read_signed") {
            return 0;
        }
        let magnitude = self.take(num_bits - 1);
        if self.take(1) == 0 {
            magnitude as i32
        } else {
            // In i64 so a 32-bit field does not overflow.
            (i64::from(magnitude) - (1i64 << (num_bits - 1))) as i32
        }
    }

    /// Reads a field written by [`BitWriter::write_var_unsigned`](crate::BitWriter::write_var_unsigned).
    pub fn read_var_unsigned(&mut self) -> u32 {
        if !self.reserve(VAR_UNSIGNED_SELECTOR_BITS as usize, "read_var_unsigned") {
            return 0;
        }
        let selector = self.take(VAR_UNSIGNED_SELECTOR_BITS) as usize;
        self.read_unsigned(VAR_UNSIGNED_WIDTHS[selector])
    }

    /// Copies `num_bits` into `dst` (LSB-first within each byte).
    ///
    /// Bytes of `dst` beyond its length are dropped. On overflow the bytes
    /// covering `num_bits` are zeroed and false is returned.
    pub fn read_bits(&mut self, dst: &mut [u8], num_bits: usize) -> bool {
        debug_assert!(dst.len() * 8 >= num_bits, "read_bits: destination too short");
        if !self.reserve(num_bits, "read_bits") {
            let covered = num_bits.div_ceil(8).min(dst.len());
            dst[..covered].fill(0);
            return false;
        }

        let mut bits_left = num_bits;
        let mut pos = 0usize;

        if bits_left >= WORD_BITS as usize && self.cur_bit & 7 == 0 {
            let num_bytes = bits_left >> 3;
            let start = self.cur_bit >> 3;
            let copied = num_bytes.min(dst.len());
            dst[..copied].copy_from_slice(&self.data[start..start + copied]);

            pos += num_bytes;
            bits_left -= num_bytes << 3;
            self.cur_bit += num_bytes << 3;
        }

        while bits_left >= WORD_BITS as usize {
            let word = self.take(WORD_BITS).to_le_bytes();
            for (i, byte) in word.into_iter().enumerate() {
                store_byte(dst, pos + i, byte);
            }
            pos += 4;
            bits_left -= WORD_BITS as usize;
        }

        while bits_left >= 8 {
            let byte = self.take(8) as u8;
            store_byte(dst, pos, byte);
            pos += 1;
            bits_left -= 8;
        }

        if bits_left > 0 {
            let byte = self.take(bits_left as u32) as u8;
            store_byte(dst, pos, byte);
        }

        true
    }

    /// Reads up to `dst.len() * 8` of `num_bits` into `dst` and skips the rest.
    ///
    /// Returns the number of bits stored.
    pub fn read_bits_clamped(&mut self, dst: &mut [u8], num_bits: usize) -> usize {
        let stored = num_bits.min(dst.len() * 8);
        self.read_bits(dst, stored);
        let skipped = num_bits - stored;
        if skipped > 0 {
            if let Ok(delta) = isize::try_from(skipped) {
                self.seek_relative(delta);
            } else {
                self.raise_overflow("read_bits_clamped", skipped);
            }
        }
        stored
    }

    /// Reads a float written by [`BitWriter::write_float_raw`](crate::BitWriter::write_float_raw).
    ///
    /// Bit-exact, NaN payloads included.
    pub fn read_float_raw(&mut self) -> f32 {
        let mut bytes = [0u8; 4];
        self.read_bits(&mut bytes, WORD_BITS as usize);
        f32::from_le_bytes(bytes)
    }

    /// Counts and consumes zero bits up to the next 1 bit (left unconsumed) or
    /// the end of the data.
    ///
    /// Running into the end is not an overflow.
    pub fn count_run_of_zeros(&mut self) -> usize {
        if self.overflow {
            return 0;
        }
        let mut count = 0;
        loop {
            let left = self.num_bits_left();
            if left == 0 {
                break;
            }
            let chunk = (WORD_BITS as usize - (self.cur_bit & 31)).min(left) as u32;
            let bits = self.fetch(self.cur_bit, chunk);
            if bits != 0 {
                let zeros = bits.trailing_zeros() as usize;
                self.cur_bit += zeros;
                count += zeros;
                break;
            }
            self.cur_bit += chunk as usize;
            count += chunk as usize;
        }
        count
    }

    /// Consumes `num_bits` from both readers and reports whether they match.
    pub fn compare_bits(&mut self, other: &mut BitReader<'_>, num_bits: usize) -> bool {
        let mut equal = true;
        let mut bits_left = num_bits;
        while bits_left > 0 {
            let chunk = bits_left.min(WORD_BITS as usize) as u32;
            equal &= self.read_unsigned(chunk) == other.read_unsigned(chunk);
            bits_left -= chunk as usize;
        }
        equal && !self.overflow && !other.overflow
    }

    // =========================================================================
    // Byte-sized helpers
    // =========================================================================

    /// Reads an 8-bit signed value.
    #[inline]
    pub fn read_char(&mut self) -> i8 {
        self.read_signed(8) as i8
    }

    /// Reads an 8-bit unsigned value.
    #[inline]
    pub fn read_byte(&mut self) -> u8 {
        self.read_unsigned(8) as u8
    }

    /// Reads a 16-bit signed value.
    #[inline]
    pub fn read_short(&mut self) -> i16 {
        self.read_signed(16) as i16
    }

    /// Reads a 16-bit unsigned value.
    #[inline]
    pub fn read_word(&mut self) -> u16 {
        self.read_unsigned(16) as u16
    }

    /// Reads a 32-bit signed value.
    #[inline]
    pub fn read_long(&mut self) -> i32 {
        self.read_signed(32)
    }

    /// Reads a 64-bit signed value, low word first.
    pub fn read_long_long(&mut self) -> i64 {
        if !self.reserve(64, "read_long_long") {
            return 0;
        }
        let low = u64::from(self.take(WORD_BITS));
        let high = u64::from(self.take(WORD_BITS));
        (high << 32 | low) as i64
    }

    /// Reads a 32-bit float.
    #[inline]
    pub fn read_float(&mut self) -> f32 {
        self.read_float_raw()
    }

    /// Fills `dst` with the next `dst.len()` bytes. Returns false on overflow.
    #[inline]
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> bool {
        let bits = dst.len() << 3;
        self.read_bits(dst, bits)
    }

    // =========================================================================
    // Strings
    // =========================================================================

    /// Reads a zero-terminated string into `dst`.
    ///
    /// Stops at a zero byte, or at `\n` when `stop_at_newline` is set; the
    /// stop byte is consumed but not stored. At most `dst.len() - 1` bytes are
    /// stored; the rest of the encoded string is still consumed so the cursor
    /// ends up after it. `dst` is always zero-terminated when non-empty.
    pub fn read_string(&mut self, dst: &mut [u8], stop_at_newline: bool) -> StringRead {
        let mut result = StringRead::default();
        loop {
            // Overflow reads as 0 and ends the loop.
            let byte = self.read_unsigned(8) as u8;
            if byte == 0 || (stop_at_newline && byte == b'\n') {
                break;
            }
            if result.len + 1 < dst.len() {
                dst[result.len] = byte;
                result.len += 1;
            } else {
                result.truncated = true;
            }
        }
        if let Some(terminator) = dst.get_mut(result.len) {
            *terminator = 0;
        }
        if result.truncated {
            tracing::debug!(
                buffer = self.debug_name().unwrap_or("unnamed"),
                capacity = dst.len(),
                "string truncated on read"
            );
        }
        result
    }

    /// Reads a zero-terminated string into a new `String`.
    ///
    /// Limited to the reader's string size (see [`CodecConfig::max_string_bytes`]);
    /// invalid UTF-8 is replaced.
    pub fn read_owned_string(&mut self, stop_at_newline: bool) -> String {
        let mut buf = vec![0u8; self.max_string_bytes];
        let read = self.read_string(&mut buf, stop_at_newline);
        String::from_utf8_lossy(&buf[..read.len]).into_owned()
    }
}

#[inline]
fn store_byte(dst: &mut [u8], index: usize, value: u8) {
    if let Some(slot) = dst.get_mut(index) {
        *slot = value;
    }
}
