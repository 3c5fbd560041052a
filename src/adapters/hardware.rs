//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! - [`HalPwm`] puts any three `embedded-hal` PWM channels behind
//!   [`PwmPort`].  On the device these are ESP-IDF `LedcDriver`s; in tests,
//!   recording fakes.
//! - [`AnalogSensor`] implements [`SensorPort`] directly.

use embedded_hal::pwm::{Error as _, SetDutyCycle};
use log::warn;

use crate::app::ports::{PwmPort, SensorPort};
use crate::error::{ActuatorError, Result};
use crate::pins::NUM_CHANNELS;
use crate::sensors::AnalogSensor;

/// 8-bit duty denominator used by the domain.
const DUTY_FULL_SCALE: u16 = u8::MAX as u16;

/// Light outputs backed by `embedded-hal` PWM channels, in channel order.
pub struct HalPwm<C> {
    channels: [C; NUM_CHANNELS],
    duty: [u8; NUM_CHANNELS],
}

impl<C: SetDutyCycle> HalPwm<C> {
    pub fn new(channels: [C; NUM_CHANNELS]) -> Self {
        Self {
            channels,
            duty: [0; NUM_CHANNELS],
        }
    }

    /// Last duty successfully written to each channel.
    pub fn current_duty(&self) -> [u8; NUM_CHANNELS] {
        self.duty
    }

    /// Drive every output to zero, ignoring individual failures.
    pub fn all_off(&mut self) {
        for channel in 0..NUM_CHANNELS {
            let _ = self.set_duty(channel, 0);
        }
    }

    pub fn into_channels(self) -> [C; NUM_CHANNELS] {
        self.channels
    }
}

impl<C: SetDutyCycle> PwmPort for HalPwm<C> {
    fn set_duty(&mut self, channel: usize, duty: u8) -> Result<()> {
        let pwm = self
            .channels
            .get_mut(channel)
            .ok_or(ActuatorError::NoSuchChannel(channel))?;

        // Scales onto the channel's native range, so a 10-bit LEDC timer
        // would still see 255 as fully on.
        pwm.set_duty_cycle_fraction(u16::from(duty), DUTY_FULL_SCALE)
            .map_err(|e| {
                warn!("PWM ch{}: {:?}", channel, e.kind());
                ActuatorError::PwmWriteFailed
            })?;

        self.duty[channel] = duty;
        Ok(())
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for AnalogSensor {
    fn read_raw(&mut self) -> u16 {
        self.read()
    }
}
