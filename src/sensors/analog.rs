//! Analog status sensor.
//!
//! Whatever is wired to GPIO 32 (potentiometer, photoresistor divider,
//! thermistor, ...) is sampled as a raw 12-bit ADC count.  Scaling is the
//! status reporter's job.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH4 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_SENSOR_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_sensor_adc(raw: u16) {
    SIM_SENSOR_ADC.store(raw, Ordering::Relaxed);
}

pub struct AnalogSensor {
    adc_channel: u32,
    last_raw: u16,
    total_reads: u32,
}

impl AnalogSensor {
    pub fn new(adc_channel: u32) -> Self {
        Self {
            adc_channel,
            last_raw: 0,
            total_reads: 0,
        }
    }

    pub fn read(&mut self) -> u16 {
        self.total_reads = self.total_reads.saturating_add(1);
        self.last_raw = self.read_adc();
        self.last_raw
    }

    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        let _ = self.adc_channel;
        SIM_SENSOR_ADC.load(Ordering::Relaxed)
    }
}
