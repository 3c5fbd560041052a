//! Inbound light commands and their wire decoding.
//!
//! The client writes a raw payload to the RX characteristic.  Exactly one
//! layout is understood:
//!
//! ```text
//! ┌──────┬──────┬──────┬───────┐
//! │  R   │  G   │  B   │ scale │
//! │ (1B) │ (1B) │ (1B) │ (1B)  │
//! └──────┴──────┴──────┴───────┘
//! ```
//!
//! Every other length decodes to [`Command::Unrecognized`] and is dropped
//! without an error, so a misbehaving client can never wedge the link.

use crate::pins::NUM_CHANNELS;

/// Length of an RGB intensity payload: one level per channel plus the scale byte.
pub const RGB_COMMAND_LEN: usize = NUM_CHANNELS + 1;

/// Per-channel raw levels plus one shared scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbIntensity {
    pub channels: [u8; NUM_CHANNELS],
    pub scale: u8,
}

/// Result of decoding one inbound write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drive the light outputs.
    RgbIntensity(RgbIntensity),
    /// Empty or unknown payload; ignored.
    Unrecognized,
}

/// Decode a raw write payload.  Total: never fails, never retains `payload`.
pub fn decode(payload: &[u8]) -> Command {
    match <[u8; RGB_COMMAND_LEN]>::try_from(payload) {
        Ok([r, g, b, scale]) => Command::RgbIntensity(RgbIntensity {
            channels: [r, g, b],
            scale,
        }),
        Err(_) => Command::Unrecognized,
    }
}
