//! Shared formatting helpers for adapter-layer output.

use core::fmt;

/// Renders a byte slice as space-separated decimal values (`10 20 30 255`)
/// without allocating.
pub(super) struct SpacedBytes<'a>(pub &'a [u8]);

impl fmt::Display for SpacedBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.0.iter();
        if let Some(first) = bytes.next() {
            write!(f, "{first}")?;
        }
        for b in bytes {
            write!(f, " {b}")?;
        }
        Ok(())
    }
}
