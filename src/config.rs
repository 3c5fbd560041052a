//! System configuration parameters
//!
//! All tunable parameters for the BleLight endpoint.  Nothing here is
//! persisted: the firmware boots with [`LightConfig::default`] and validates
//! it before touching any peripheral.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::pins;

/// Lower bound of the BLE advertising interval (0.625 ms units).
pub const ADV_INTERVAL_MIN_UNITS: u16 = 0x0020;
/// Upper bound of the BLE advertising interval (0.625 ms units).
pub const ADV_INTERVAL_MAX_UNITS: u16 = 0x4000;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    // --- Radio ---
    /// GAP device name
    pub device_name: heapless::String<24>,
    /// Advertising interval, used for both min and max (0.625 ms units)
    pub adv_interval_units: u16,

    // --- PWM ---
    /// LEDC frequency for the light outputs (Hz)
    pub pwm_frequency_hz: u32,
    /// LEDC duty resolution (bits); the duty path assumes 8
    pub pwm_resolution_bits: u8,

    // --- Status task ---
    /// Period of the foreground status loop (milliseconds)
    pub status_interval_ms: u32,
    /// Raw ADC counts are divided by this to produce the reported value
    pub sensor_divisor: f32,
    /// Send the formatted sensor value as a notification while connected
    pub notify_status: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        let mut device_name = heapless::String::new();
        // "BLE Test" is shorter than the 24-byte capacity.
        let _ = device_name.push_str("BLE Test");

        Self {
            // Radio
            device_name,
            adv_interval_units: 0x20, // 20 ms

            // PWM
            pwm_frequency_hz: pins::LED_PWM_FREQ_HZ,
            pwm_resolution_bits: pins::PWM_RESOLUTION_BITS,

            // Status task
            status_interval_ms: 1000, // 1 Hz
            sensor_divisor: 3.456,
            notify_status: false,
        }
    }
}

impl LightConfig {
    /// Reject values the firmware cannot honour.
    pub fn validate(&self) -> Result<(), Error> {
        if self.device_name.is_empty() {
            return Err(Error::Config("device_name must not be empty"));
        }
        if !(ADV_INTERVAL_MIN_UNITS..=ADV_INTERVAL_MAX_UNITS).contains(&self.adv_interval_units) {
            return Err(Error::Config("adv_interval_units outside 0x0020..=0x4000"));
        }
        if self.pwm_frequency_hz == 0 {
            return Err(Error::Config("pwm_frequency_hz must be non-zero"));
        }
        if self.pwm_resolution_bits != pins::PWM_RESOLUTION_BITS {
            return Err(Error::Config("pwm_resolution_bits must be 8"));
        }
        if self.status_interval_ms == 0 {
            return Err(Error::Config("status_interval_ms must be non-zero"));
        }
        if !self.sensor_divisor.is_finite() || self.sensor_divisor <= 0.0 {
            return Err(Error::Config("sensor_divisor must be a positive number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = LightConfig::default();
        assert_eq!(c.validate(), Ok(()));
        assert_eq!(c.device_name.as_str(), "BLE Test");
        assert_eq!(c.pwm_frequency_hz, 5000);
        assert_eq!(c.pwm_resolution_bits, 8);
        assert!(!c.notify_status);
    }

    #[test]
    fn rejects_non_8bit_resolution() {
        let c = LightConfig {
            pwm_resolution_bits: 10,
            ..LightConfig::default()
        };
        assert!(matches!(c.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_bad_divisor() {
        for divisor in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let c = LightConfig {
                sensor_divisor: divisor,
                ..LightConfig::default()
            };
            assert!(c.validate().is_err(), "divisor {divisor} accepted");
        }
    }

    #[test]
    fn rejects_adv_interval_out_of_range() {
        let low = LightConfig {
            adv_interval_units: 0x1F,
            ..LightConfig::default()
        };
        let high = LightConfig {
            adv_interval_units: 0x4001,
            ..LightConfig::default()
        };
        assert!(low.validate().is_err());
        assert!(high.validate().is_err());
    }

    #[test]
    fn rejects_empty_name_and_zero_timing() {
        let c = LightConfig {
            device_name: heapless::String::new(),
            ..LightConfig::default()
        };
        assert!(c.validate().is_err());

        let c = LightConfig {
            status_interval_ms: 0,
            ..LightConfig::default()
        };
        assert!(c.validate().is_err());

        let c = LightConfig {
            pwm_frequency_hz: 0,
            ..LightConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let c = LightConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: LightConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.device_name, c2.device_name);
        assert!((c.sensor_divisor - c2.sensor_divisor).abs() < 0.0001);
        assert_eq!(c.notify_status, c2.notify_status);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = LightConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: LightConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.adv_interval_units, c2.adv_interval_units);
        assert_eq!(c.status_interval_ms, c2.status_interval_ms);
    }
}
