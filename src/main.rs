//! BleLight firmware: main entry point.
//!
//! Hexagonal layout, callback-driven command path plus a 1 Hz status loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  BleAdapter/BleRadio   HalPwm<LedcDriver>   AnalogSensor       │
//! │  (RadioPort)           (PwmPort)            (SensorPort)       │
//! │  LogEventSink (EventSink)                                      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  LinkService (GATTS callback context)                  │    │
//! │  │  decode · map_intensity · ConnectionState              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  StatusReporter (main task, reads ConnectionState)             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Mutex;

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution, config::TimerConfig};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;

use blelight::adapters::ble::{self, BleAdapter, BleRadio};
use blelight::adapters::hardware::HalPwm;
use blelight::adapters::log_sink::LogEventSink;
use blelight::app::events::RadioEvent;
use blelight::app::link::ConnectionState;
use blelight::app::service::LinkService;
use blelight::app::status::StatusReporter;
use blelight::config::LightConfig;
use blelight::drivers::hw_init;
use blelight::pins;
use blelight::sensors::AnalogSensor;

// ── Shared state ──────────────────────────────────────────────
//
// Written from the Bluedroid callback task, read by the status loop.

static CONNECTION: ConnectionState = ConnectionState::new();

/// Everything the GATTS callback needs to run the link service.
struct LinkContext {
    service: LinkService<'static>,
    radio: BleRadio,
    pwm: HalPwm<LedcDriver<'static>>,
    sink: LogEventSink,
}

static LINK: Mutex<Option<LinkContext>> = Mutex::new(None);

/// Registered with the BLE adapter; runs in the Bluedroid callback task.
fn on_radio_event(event: RadioEvent<'_>) {
    let Ok(mut guard) = LINK.lock() else {
        warn!("Link context poisoned, dropping {:?}", event);
        return;
    };
    if let Some(ctx) = guard.as_mut() {
        let LinkContext {
            service,
            radio,
            pwm,
            sink,
        } = ctx;
        service.dispatch(event, radio, pwm, sink);
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("BleLight v{}", env!("CARGO_PKG_VERSION"));

    let config = LightConfig::default();
    config.validate()?;

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    let p = Peripherals::take()?;

    let timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::default()
            .frequency(Hertz(config.pwm_frequency_hz))
            .resolution(Resolution::Bits8),
    )?;
    let mut pwm = HalPwm::new([
        LedcDriver::new(p.ledc.channel0, &timer, p.pins.gpio2)?,
        LedcDriver::new(p.ledc.channel1, &timer, p.pins.gpio4)?,
        LedcDriver::new(p.ledc.channel2, &timer, p.pins.gpio5)?,
    ]);
    pwm.all_off();
    info!(
        "PWM: GPIO {:?} @ {} Hz, {}-bit",
        pins::LED_GPIOS,
        config.pwm_frequency_hz,
        config.pwm_resolution_bits
    );

    // ── 3. Link service, then radio ───────────────────────────
    let mut adapter = BleAdapter::new(&config);
    if let Ok(mut slot) = LINK.lock() {
        *slot = Some(LinkContext {
            service: LinkService::new(&CONNECTION),
            radio: adapter.radio(),
            pwm,
            sink: LogEventSink::new(),
        });
    }
    ble::set_event_handler(on_radio_event);
    adapter.start()?;

    // ── 4. Status loop ────────────────────────────────────────
    let mut reporter = StatusReporter::new(&config);
    let mut sensor = AnalogSensor::new(pins::SENSOR_ADC1_CHANNEL);
    let mut radio = adapter.radio();
    let mut sink = LogEventSink::new();

    info!("Entering status loop ({} ms)", config.status_interval_ms);
    loop {
        reporter.tick(&CONNECTION, &mut sensor, &mut radio, &mut sink);
        FreeRtos::delay_ms(config.status_interval_ms);
    }
}
