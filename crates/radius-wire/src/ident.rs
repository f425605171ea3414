//! Outbound request identifiers.
//!
//! Identifiers are drawn from an atomic counter wrapping 0..=255; the
//! process-wide counter serves most callers, and callers wanting an
//! isolated identifier space instantiate their own source.

use std::sync::atomic::{AtomicU8, Ordering};

/// A wrapping identifier counter. Successive calls differ by exactly one
/// modulo 256, including under concurrent use.
#[derive(Debug, Default)]
pub struct IdentifierSource(AtomicU8);

impl IdentifierSource {
    pub const fn new(start: u8) -> Self {
        IdentifierSource(AtomicU8::new(start))
    }

    pub fn next(&self) -> u8 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

static PROCESS_WIDE: IdentifierSource = IdentifierSource::new(0);

/// Next identifier from the process-wide counter.
pub fn next_identifier() -> u8 {
    PROCESS_WIDE.next()
}
