//! Unified error types for the BleLight firmware.
//!
//! Every port operation that can fail funnels into [`Error`].  All variants
//! are `Copy` so they can be handed to the event sink and logged from the
//! radio callback context without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A light output could not be driven.
    Actuator(ActuatorError),
    /// The radio stack rejected a request.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// Channel index is outside the configured outputs.
    NoSuchChannel(usize),
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::NoSuchChannel(ch) => write!(f, "no PWM channel {ch}"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    BleInitFailed,
    /// No central is connected, or it has not subscribed to notifications.
    NotConnected,
    /// The connection parameter update request was refused (ESP-IDF rc).
    LinkUpdateFailed(i32),
    /// Sending a notification failed (ESP-IDF rc).
    NotifyFailed(i32),
    /// Notification payload exceeds the characteristic's capacity.
    PayloadTooLong,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BleInitFailed => write!(f, "BLE init failed"),
            Self::NotConnected => write!(f, "no subscribed central"),
            Self::LinkUpdateFailed(rc) => write!(f, "link parameter update failed (rc={rc})"),
            Self::NotifyFailed(rc) => write!(f, "notify failed (rc={rc})"),
            Self::PayloadTooLong => write!(f, "notify payload too long"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
