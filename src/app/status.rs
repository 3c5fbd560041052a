//! Periodic status sample — the foreground half of the firmware.
//!
//! Runs once per `status_interval_ms` from the main task.  While a central
//! is connected it reads the sensor, scales the raw count and formats it
//! with two decimals.  The formatted value is only sent as a notification
//! when [`LightConfig::notify_status`](crate::config::LightConfig) is set.

use core::fmt::Write;

use log::warn;

use super::events::AppEvent;
use super::link::ConnectionState;
use super::ports::{EventSink, RadioPort, SensorPort};
use crate::config::LightConfig;

/// Enough for `u16::MAX / 0.001` with two decimals.
pub type StatusText = heapless::String<16>;

pub struct StatusReporter {
    divisor: f32,
    notify: bool,
    text: StatusText,
    samples: u32,
}

impl StatusReporter {
    pub fn new(config: &LightConfig) -> Self {
        Self {
            divisor: config.sensor_divisor,
            notify: config.notify_status,
            text: StatusText::new(),
            samples: 0,
        }
    }

    /// One iteration of the status loop.
    ///
    /// Returns the formatted value when a sample was taken, `None` while
    /// disconnected (the sensor is not read at all then).
    pub fn tick(
        &mut self,
        state: &ConnectionState,
        sensor: &mut impl SensorPort,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> Option<&str> {
        if !state.is_connected() {
            return None;
        }

        let raw = sensor.read_raw();
        self.samples = self.samples.wrapping_add(1);
        self.format(raw);

        sink.emit(&AppEvent::StatusSampled {
            raw,
            text: self.text.as_str(),
        });

        if self.notify {
            if let Err(e) = radio.notify(self.text.as_bytes()) {
                warn!("Status notify failed: {}", e);
                sink.emit(&AppEvent::CapabilityFailed(e));
            }
        }

        Some(self.text.as_str())
    }

    /// Number of samples taken since boot.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    fn format(&mut self, raw: u16) {
        let value = f32::from(raw) / self.divisor;
        self.text.clear();
        if write!(self.text, "{:.2}", value).is_err() {
            // Only reachable with a divisor far below 0.001.
            warn!("Status value {} does not fit the status buffer", value);
            self.text.clear();
        }
    }
}
