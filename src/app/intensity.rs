//! Intensity mapping: decoded command → per-output 8-bit duty.

use super::commands::RgbIntensity;
use crate::pins::NUM_CHANNELS;

/// One 8-bit duty value per light output, in channel order.
pub type DutyVector = [u8; NUM_CHANNELS];

/// Full-scale value of both the channel levels and the scale byte.
const FULL_SCALE: u16 = u8::MAX as u16;

/// `duty[i] = floor(channels[i] * scale / 255)`.
///
/// The product is widened to `u16` (255 × 255 = 65 025) before the
/// division, and the quotient never exceeds the channel level.
pub fn map_intensity(cmd: &RgbIntensity) -> DutyVector {
    let scale = u16::from(cmd.scale);
    cmd.channels
        .map(|level| (u16::from(level) * scale / FULL_SCALE) as u8)
}
