//! # Overflow Diagnostics
//!
//! A single process-wide hook observes every overflow. It is a plain function
//! pointer: register it once at startup, every writer and reader reads it.
//!
//! The hook only observes. Whatever it does, the buffer that overflowed stays
//! overflowed and the operation that triggered it stays a no-op.

use parking_lot::{const_rwlock, RwLock};

use crate::error::Direction;

/// Everything known about an overflow at the moment it happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverflowEvent<'a> {
    /// Writer or reader.
    pub direction: Direction,
    /// Debug name of the buffer, if one was set.
    pub debug_name: Option<&'a str>,
    /// The operation that ran out of room.
    pub operation: &'static str,
    /// Cursor position before the failed operation.
    pub bit_position: usize,
    /// Bits the operation needed.
    pub requested_bits: usize,
    /// Declared capacity in bits.
    pub capacity_bits: usize,
}

/// Signature of the process-wide overflow hook.
pub type OverflowHandler = fn(&OverflowEvent<'_>);

static OVERFLOW_HANDLER: RwLock<Option<OverflowHandler>> = const_rwlock(None);

/// Registers (or with `None`, removes) the process-wide overflow hook.
///
/// Returns the previously registered hook.
pub fn set_overflow_handler(handler: Option<OverflowHandler>) -> Option<OverflowHandler> {
    std::mem::replace(&mut *OVERFLOW_HANDLER.write(), handler)
}

/// Returns the currently registered overflow hook.
#[must_use]
pub fn overflow_handler() -> Option<OverflowHandler> {
    *OVERFLOW_HANDLER.read()
}

/// Logs an overflow and forwards it to the registered hook.
pub(crate) fn report_overflow(event: &OverflowEvent<'_>) {
    tracing::warn!(
        direction = %event.direction,
        buffer = event.debug_name.unwrap_or("unnamed"),
        operation = event.operation,
        bit_position = event.bit_position,
        requested_bits = event.requested_bits,
        capacity_bits = event.capacity_bits,
        "bit buffer overflow"
    );

    if let Some(handler) = overflow_handler() {
        handler(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &OverflowEvent<'_>) {}

    #[test]
    fn test_set_returns_previous_handler() {
        let before = set_overflow_handler(Some(noop));
        assert!(overflow_handler().is_some());
        let replaced = set_overflow_handler(before);
        assert!(replaced.is_some());
    }
}
