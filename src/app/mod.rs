//! Application core — pure domain logic, zero I/O.
//!
//! Connection lifecycle, command decoding, intensity mapping and the
//! periodic status sample.  All interaction with the radio, the PWM
//! outputs and the sensor happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod intensity;
pub mod link;
pub mod ports;
pub mod service;
pub mod status;
