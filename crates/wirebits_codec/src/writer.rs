//! # Bit Writer
//!
//! Sequential, LSB-first bit writer over a caller-owned byte buffer.
//!
//! ## Overflow
//!
//! Every operation checks the remaining capacity *before* touching the
//! cursor. An operation that does not fit sets the sticky overflow flag and
//! does nothing; from then on every write is a no-op until [`BitWriter::reset`].
//! Bytes written before the overflow stay intact and nothing outside the
//! buffer is ever touched.
//!
//! ```text
//! byte 0            byte 1
//! ┌───────────────┐ ┌───────────────┐
//! │7 6 5 4 3 2 1 0│ │7 6 5 4 3 2 1 0│
//! └───────────────┘ └───────────────┘
//!   write_unsigned(0b101, 3) lands in bits 0..3 of byte 0,
//!   the next field starts at bit 3 and may spill into byte 1.
//! ```

use std::borrow::Cow;

use crate::buffer::{load_word, store_word};
use crate::config::CodecConfig;
use crate::diagnostics::{report_overflow, OverflowEvent};
use crate::error::{BitBufError, BitBufResult, Direction};
use crate::masks::{masks, WORD_BITS};
use crate::reader::BitReader;

/// Data widths selected by the 2-bit `VarUnsigned` prefix.
pub const VAR_UNSIGNED_WIDTHS: [u32; 4] = [4, 8, 12, 32];

/// Bits in the `VarUnsigned` selector prefix.
pub const VAR_UNSIGNED_SELECTOR_BITS: u32 = 2;

/// Picks the `VarUnsigned` bucket for `value`: `(selector, data_bits)`.
#[inline]
#[must_use]
pub fn var_unsigned_bucket(value: u32) -> (u32, u32) {
    let m = masks();
    for (selector, &bits) in VAR_UNSIGNED_WIDTHS.iter().enumerate() {
        if value & m.extra_mask(bits) == value {
            return (selector as u32, bits);
        }
    }
    (3, WORD_BITS)
}

/// Bit-level writer bound to a caller-supplied buffer.
#[derive(Debug)]
pub struct BitWriter<'a> {
    data: &'a mut [u8],
    data_bits: usize,
    cur_bit: usize,
    overflow: bool,
    assert_on_overflow: bool,
    debug_name: Option<Cow<'static, str>>,
}

impl<'a> BitWriter<'a> {
    /// Creates a writer that may use every bit of `data`.
    #[must_use]
    pub fn new(data: &'a mut [u8]) -> Self {
        let bits = data.len() * 8;
        Self::with_bit_capacity(data, bits)
    }

    /// Creates a writer limited to the first `max_bits` bits of `data`.
    ///
    /// `max_bits` is clamped to the slice length.
    #[must_use]
    pub fn with_bit_capacity(data: &'a mut [u8], max_bits: usize) -> Self {
        debug_assert!(max_bits <= data.len() * 8, "bit capacity exceeds buffer");
        // Tables must exist before the first write.
        masks();
        Self {
            data_bits: max_bits.min(data.len() * 8),
            data,
            cur_bit: 0,
            overflow: false,
            assert_on_overflow: false,
            debug_name: None,
        }
    }

    /// Creates a writer using the capacity clamp and overflow policy of `config`.
    #[must_use]
    pub fn from_config(data: &'a mut [u8], config: &CodecConfig) -> Self {
        let bits = config.capacity_bits(data.len());
        let mut writer = Self::with_bit_capacity(data, bits);
        writer.assert_on_overflow = config.assert_on_overflow;
        writer
    }

    /// Builder form of [`BitWriter::set_debug_name`].
    #[must_use]
    pub fn with_debug_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.set_debug_name(name);
        self
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Rewinds to bit 0 and clears the overflow flag. Buffer contents are kept.
    #[inline]
    pub fn reset(&mut self) {
        self.cur_bit = 0;
        self.overflow = false;
    }

    /// Moves the cursor to `bit`.
    ///
    /// Positions past the capacity set the overflow flag and return false.
    pub fn seek_to_bit(&mut self, bit: usize) -> bool {
        if bit > self.data_bits {
            self.raise_overflow("seek_to_bit", bit.saturating_sub(self.cur_bit));
            return false;
        }
        self.cur_bit = bit;
        true
    }

    /// Returns true once any operation has run out of room.
    #[inline]
    #[must_use]
    pub const fn is_overflowed(&self) -> bool {
        self.overflow
    }

    /// Marks the buffer as overflowed without reporting it.
    ///
    /// For callers that detect a higher-level size problem and want the
    /// message rejected through the same flag.
    #[inline]
    pub fn set_overflowed(&mut self) {
        self.overflow = true;
    }

    /// Trip a debug assertion on overflow. No effect in release builds.
    #[inline]
    pub fn set_assert_on_overflow(&mut self, assert: bool) {
        self.assert_on_overflow = assert;
    }

    /// Diagnostic label reported with overflows.
    #[inline]
    #[must_use]
    pub fn debug_name(&self) -> Option<&str> {
        self.debug_name.as_deref()
    }

    /// Sets the diagnostic label. Has no effect on the encoding.
    pub fn set_debug_name(&mut self, name: impl Into<Cow<'static, str>>) {
        self.debug_name = Some(name.into());
    }

    /// Bits written so far (cursor position).
    #[inline]
    #[must_use]
    pub const fn num_bits_written(&self) -> usize {
        self.cur_bit
    }

    /// Bytes touched so far, rounded up.
    #[inline]
    #[must_use]
    pub const fn num_bytes_written(&self) -> usize {
        self.cur_bit.div_ceil(8)
    }

    /// Bits remaining before overflow.
    #[inline]
    #[must_use]
    pub const fn num_bits_left(&self) -> usize {
        self.data_bits - self.cur_bit
    }

    /// Whole bytes remaining before overflow.
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

    /// The written bytes (the last one may be partial).
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.num_bytes_written()]
    }

    /// Ends the pass: the number of bytes to transmit, or the overflow.
    ///
    /// # Errors
    ///
    /// Returns [`BitBufError::Overflow`] if any write in the pass overflowed.
    pub fn finish(&self) -> BitBufResult<usize> {
        if self.overflow {
            return Err(BitBufError::Overflow {
                direction: Direction::Write,
                name: self.debug_name().unwrap_or("unnamed").to_string(),
                bit_position: self.cur_bit,
                capacity_bits: self.data_bits,
            });
        }
        Ok(self.num_bytes_written())
    }

    // =========================================================================
    // Capacity checks
    // =========================================================================

    /// Checks that `bits` more bits fit. Sets overflow if they do not.
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
                direction: Direction::Write,
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

    // =========================================================================
    // Unchecked primitives (capacity already reserved)
    // =========================================================================

    /// Drops the low `num_bits` of `value` in at the cursor.
    fn put_unsigned(&mut self, value: u32, num_bits: u32) {
        if num_bits == 0 {
            return;
        }
        let m = masks();
        let mut data = value & m.extra_mask(num_bits);
        let mut bits_left = num_bits;

        let word = self.cur_bit >> 5;
        let shift = (self.cur_bit & 31) as u32;

        let mut dword = load_word(self.data, word);
        dword &= m.write_mask(shift, bits_left);
        dword |= data << shift;
        store_word(self.data, word, dword);

        // Did it span a word?
        let bits_written = WORD_BITS - shift;
        if bits_written < bits_left {
            bits_left -= bits_written;
            data >>= bits_written;

            let mut dword = load_word(self.data, word + 1);
            dword &= m.write_mask(0, bits_left);
            dword |= data;
            store_word(self.data, word + 1, dword);
        }

        self.cur_bit += num_bits as usize;
    }

    fn put_bit_at(&mut self, bit: usize, value: bool) {
        let word = bit >> 5;
        let mask = masks().little_bit((bit & 31) as u32);
        let mut dword = load_word(self.data, word);
        if value {
            dword |= mask;
        } else {
            dword &= !mask;
        }
        store_word(self.data, word, dword);
    }

    // =========================================================================
    // Primitive codecs
    // =========================================================================

    /// Writes a single bit.
    #[inline]
    pub fn write_one_bit(&mut self, value: bool) {
        if !self.reserve(1, "write_one_bit") {
            return;
        }
        self.put_bit_at(self.cur_bit, value);
        self.cur_bit += 1;
    }

    /// Overwrites the bit at `bit` without moving the cursor.
    ///
    /// Used to patch flags after the fact. Positions outside the capacity set
    /// the overflow flag and return false.
    pub fn write_one_bit_at(&mut self, bit: usize, value: bool) -> bool {
        if self.overflow {
            return false;
        }
        if bit >= self.data_bits {
            self.raise_overflow("write_one_bit_at", 1);
            return false;
        }
        self.put_bit_at(bit, value);
        true
    }

    /// Writes the low `num_bits` (1..=32) of `value`.
    #[inline]
    pub fn write_unsigned(&mut self, value: u32, num_bits: u32) {
        debug_assert!(num_bits <= WORD_BITS, "write_unsigned: {num_bits} bits");
        let num_bits = num_bits.min(WORD_BITS);
        if num_bits == 0 || !self.reserve(num_bits as usize, "write_unsigned") {
            return;
        }
        self.put_unsigned(value, num_bits);
    }

    /// Writes a signed value in `num_bits` (2..=32): magnitude bits, then a
    /// trailing sign bit.
    ///
    /// Negative values store `(0x8000_0000 + value)` masked to `num_bits - 1`
    /// bits. The layout is therefore identical to a two's-complement field of
    /// `num_bits` bits; existing encoded data depends on it.
    pub fn write_signed(&mut self, value: i32, num_bits: u32) {
        debug_assert!((2..=WORD_BITS).contains(&num_bits), "write_signed: {num_bits} bits");
        let num_bits = num_bits.min(WORD_BITS);
        if num_bits == 0 || !self.reserve(num_bits as usize, "write_signed") {
            return;
        }
        if value < 0 {
            self.put_unsigned(0x8000_0000u32.wrapping_add(value as u32), num_bits - 1);
            self.put_bit_at(self.cur_bit, true);
        } else {
            self.put_unsigned(value as u32, num_bits - 1);
            self.put_bit_at(self.cur_bit, false);
        }
        self.cur_bit += 1;
    }

    /// Writes `value` with a 2-bit width selector (4, 8, 12 or 32 data bits),
    /// choosing the smallest width that holds it.
    pub fn write_var_unsigned(&mut self, value: u32) {
        let (selector, bits) = var_unsigned_bucket(value);
        if !self.reserve((VAR_UNSIGNED_SELECTOR_BITS + bits) as usize, "write_var_unsigned") {
            return;
        }
        self.put_unsigned(selector, VAR_UNSIGNED_SELECTOR_BITS);
        self.put_unsigned(value, bits);
    }

    /// Copies `num_bits` bits from `src` (LSB-first within each byte).
    ///
    /// Byte-aligned runs of 32 bits or more are copied as whole bytes; the
    /// rest goes through the word and byte paths. Missing source bytes are
    /// treated as zero. Returns false on overflow.
    pub fn write_bits(&mut self, src: &[u8], num_bits: usize) -> bool {
        debug_assert!(src.len() * 8 >= num_bits, "write_bits: source too short");
        if !self.reserve(num_bits, "write_bits") {
            return false;
        }

        let byte_at = |i: usize| u32::from(src.get(i).copied().unwrap_or(0));
        let mut bits_left = num_bits;
        let mut pos = 0usize;

        // Cursor is byte aligned: block copy.
        if bits_left >= WORD_BITS as usize && self.cur_bit & 7 == 0 {
            let num_bytes = bits_left >> 3;
            let start = self.cur_bit >> 3;
            let dst = &mut self.data[start..start + num_bytes];
            let copied = num_bytes.min(src.len());
            dst[..copied].copy_from_slice(&src[..copied]);
            dst[copied..].fill(0);

            pos += num_bytes;
            bits_left -= num_bytes << 3;
            self.cur_bit += num_bytes << 3;
        }

        while bits_left >= WORD_BITS as usize {
            let word = byte_at(pos)
                | byte_at(pos + 1) << 8
                | byte_at(pos + 2) << 16
                | byte_at(pos + 3) << 24;
            self.put_unsigned(word, WORD_BITS);
            pos += 4;
            bits_left -= WORD_BITS as usize;
        }

        while bits_left >= 8 {
            self.put_unsigned(byte_at(pos), 8);
            pos += 1;
            bits_left -= 8;
        }

        if bits_left > 0 {
            self.put_unsigned(byte_at(pos), bits_left as u32);
        }

        true
    }

    /// Copies `num_bits` bits from `reader`, 32 at a time.
    ///
    /// Returns false if either side overflowed.
    pub fn write_bits_from_reader(&mut self, reader: &mut BitReader<'_>, num_bits: usize) -> bool {
        if !self.reserve(num_bits, "write_bits_from_reader") {
            return false;
        }
        let mut bits_left = num_bits;
        while bits_left >= WORD_BITS as usize {
            let word = reader.read_unsigned(WORD_BITS);
            self.put_unsigned(word, WORD_BITS);
            bits_left -= WORD_BITS as usize;
        }
        if bits_left > 0 {
            let tail = reader.read_unsigned(bits_left as u32);
            self.put_unsigned(tail, bits_left as u32);
        }
        !reader.is_overflowed()
    }

    /// Writes all 32 IEEE-754 bits of `value` in little-endian byte order.
    #[inline]
    pub fn write_float_raw(&mut self, value: f32) {
        self.write_bits(&value.to_le_bytes(), WORD_BITS as usize);
    }

    // =========================================================================
    // Byte-sized helpers
    // =========================================================================

    /// Writes an 8-bit signed value.
    #[inline]
    pub fn write_char(&mut self, value: i8) {
        self.write_signed(i32::from(value), 8);
    }

    /// Writes an 8-bit unsigned value.
    #[inline]
    pub fn write_byte(&mut self, value: u8) {
        self.write_unsigned(u32::from(value), 8);
    }

    /// Writes a 16-bit signed value.
    #[inline]
    pub fn write_short(&mut self, value: i16) {
        self.write_signed(i32::from(value), 16);
    }

    /// Writes a 16-bit unsigned value.
    #[inline]
    pub fn write_word(&mut self, value: u16) {
        self.write_unsigned(u32::from(value), 16);
    }

    /// Writes a 32-bit signed value.
    #[inline]
    pub fn write_long(&mut self, value: i32) {
        self.write_signed(value, 32);
    }

    /// Writes a 64-bit signed value, low word first.
    pub fn write_long_long(&mut self, value: i64) {
        if !self.reserve(64, "write_long_long") {
            return;
        }
        let bits = value as u64;
        self.put_unsigned(bits as u32, WORD_BITS);
        self.put_unsigned((bits >> 32) as u32, WORD_BITS);
    }

    /// Writes a 32-bit float (same layout as [`BitWriter::write_float_raw`]).
    #[inline]
    pub fn write_float(&mut self, value: f32) {
        self.write_float_raw(value);
    }

    /// Writes every byte of `bytes`. Returns false on overflow.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> bool {
        self.write_bits(bytes, bytes.len() << 3)
    }

    // =========================================================================
    // Strings
    // =========================================================================

    /// Writes the bytes of `s` followed by a zero terminator.
    ///
    /// An interior NUL ends the string early, exactly as the reader would see
    /// it. Returns false on overflow.
    pub fn write_string(&mut self, s: &str) -> bool {
        for &byte in s.as_bytes() {
            if byte == 0 {
                break;
            }
            self.write_unsigned(u32::from(byte), 8);
        }
        self.write_unsigned(0, 8);
        !self.overflow
    }

    /// Like [`BitWriter::write_string`]; `None` writes a lone terminator.
    #[inline]
    pub fn write_string_opt(&mut self, s: Option<&str>) -> bool {
        self.write_string(s.unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsb_first_packing() {
        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf);

        writer.write_unsigned(0b101, 3);
        writer.write_unsigned(0b1111, 4);
        writer.write_one_bit(true);

        assert_eq!(writer.num_bits_written(), 8);
        assert_eq!(writer.as_slice(), &[0b1111_1101]);
    }

    #[test]
    fn test_field_spanning_word_boundary() {
        let mut buf = [0u8; 8];
        let mut writer = BitWriter::new(&mut buf);

        writer.write_unsigned(0, 30);
        writer.write_unsigned(0b1111, 4);

        assert_eq!(writer.num_bits_written(), 34);
        assert_eq!(buf[3], 0b1100_0000);
        assert_eq!(buf[4], 0b0000_0011);
    }

    #[test]
    fn test_only_low_bits_are_written() {
        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf);

        writer.write_unsigned(0xFFFF_FFFF, 4);
        writer.write_unsigned(0, 4);

        assert_eq!(buf[0], 0x0F);
    }

    #[test]
    fn test_rewrite_preserves_neighbours() {
        let mut buf = [0xFFu8; 4];
        let mut writer = BitWriter::new(&mut buf);

        writer.seek_to_bit(4);
        writer.write_unsigned(0, 8);

        assert_eq!(buf, [0x0F, 0xF0, 0xFF, 0xFF]);
    }

    #[test]
    fn test_signed_layout_is_twos_complement() {
        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf);

        writer.write_signed(-1, 8);
        writer.write_signed(-128, 8);
        writer.write_signed(5, 8);

        assert_eq!(&buf[..3], &[0xFF, 0x80, 0x05]);
    }

    #[test]
    fn test_var_unsigned_buckets() {
        assert_eq!(var_unsigned_bucket(0), (0, 4));
        assert_eq!(var_unsigned_bucket(15), (0, 4));
        assert_eq!(var_unsigned_bucket(16), (1, 8));
        assert_eq!(var_unsigned_bucket(4095), (2, 12));
        assert_eq!(var_unsigned_bucket(4096), (3, 32));
        assert_eq!(var_unsigned_bucket(u32::MAX), (3, 32));
    }

    #[test]
    fn test_write_one_bit_at_patches_in_place() {
        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf);

        writer.write_unsigned(0, 16);
        assert!(writer.write_one_bit_at(9, true));
        assert_eq!(writer.num_bits_written(), 16);
        assert!(!writer.write_one_bit_at(32, true));
        assert!(writer.is_overflowed());

        assert_eq!(buf[1], 0b0000_0010);
    }

    #[test]
    fn test_overflow_is_sticky_noop() {
        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf);

        writer.write_unsigned(0xABCD, 16);
        writer.write_unsigned(0x0001_FFFF, 17);
        assert!(writer.is_overflowed());
        assert_eq!(writer.num_bits_written(), 16);

        // Would fit, but the flag is sticky.
        writer.write_unsigned(1, 1);
        assert_eq!(writer.num_bits_written(), 16);
        assert!(writer.finish().is_err());

        assert_eq!(buf, [0xCD, 0xAB, 0, 0]);
    }

    #[test]
    fn test_write_bits_aligned_and_unaligned() {
        let src = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66];

        let mut aligned = [0u8; 8];
        let mut writer = BitWriter::new(&mut aligned);
        assert!(writer.write_bits(&src, 44));
        assert_eq!(writer.num_bits_written(), 44);
        assert_eq!(&aligned[..6], &[0x11, 0x22, 0x33, 0x44, 0x55, 0x06]);

        let mut shifted = [0u8; 8];
        let mut writer = BitWriter::new(&mut shifted);
        writer.write_unsigned(0xF, 4);
        assert!(writer.write_bits(&src, 48));
        assert_eq!(writer.num_bits_written(), 52);
        assert_eq!(&shifted[..7], &[0x1F, 0x21, 0x32, 0x43, 0x54, 0x65, 0x06]);
    }

    #[test]
    fn test_long_long_low_word_first() {
        let mut buf = [0u8; 8];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_long_long(0x0102_0304_0506_0708);
        assert_eq!(buf, [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_string_stops_at_interior_nul() {
        let mut buf = [0xAAu8; 8];
        let mut writer = BitWriter::new(&mut buf);
        assert!(writer.write_string("ab\0cd"));
        assert_eq!(writer.num_bits_written(), 24);
        assert_eq!(&buf[..3], b"ab\0");
    }

    #[test]
    fn test_none_string_writes_terminator() {
        let mut buf = [0xAAu8; 4];
        let mut writer = BitWriter::new(&mut buf);
        assert!(writer.write_string_opt(None));
        assert_eq!(writer.num_bits_written(), 8);
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn test_reset_clears_cursor_and_flag() {
        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf).with_debug_name("reset");
        writer.write_unsigned(0, 32);
        writer.write_one_bit(true);
        assert!(writer.is_overflowed());

        writer.reset();
        assert!(!writer.is_overflowed());
        assert_eq!(writer.num_bits_written(), 0);
        assert_eq!(writer.debug_name(), Some("reset"));
    }

    #[test]
    fn test_bit_capacity_smaller_than_slice() {
        let mut buf = [0u8; 8];
        let mut writer = BitWriter::with_bit_capacity(&mut buf, 20);
        writer.write_unsigned(0xFFFFF, 20);
        writer.write_one_bit(true);
        assert!(writer.is_overflowed());
        assert_eq!(writer.max_num_bits(), 20);
        assert_eq!(&buf[2..], &[0x0F, 0, 0, 0, 0, 0]);
    }
}
