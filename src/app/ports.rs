//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LinkService / StatusReporter (domain)
//! ```
//!
//! Driven adapters (radio, PWM outputs, sensor, event sinks) implement these
//! traits.  The domain consumes them via generics at call sites, so the core
//! never touches hardware directly.
//!
//! Port failures are typed ([`crate::error::Error`]) but the domain never
//! retries them: it reports the failure through [`EventSink`] and moves on.

use super::events::AppEvent;
use super::link::LinkTimingRequest;
use crate::error::Result;

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: domain → BLE stack)
// ───────────────────────────────────────────────────────────────

/// Requests the domain makes of the BLE stack.
pub trait RadioPort {
    /// Ask the central to move the link to new connection parameters.
    fn request_link_timing(&mut self, request: &LinkTimingRequest) -> Result<()>;

    /// Send `value` as a notification on the TX characteristic.
    fn notify(&mut self, value: &[u8]) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// PWM port (driven adapter: domain → light outputs)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the light outputs.
///
/// Channels are configured once at startup (frequency, 8-bit resolution);
/// at runtime the domain only sets duties.
pub trait PwmPort {
    /// Set the 8-bit duty (0–255) of output `channel`.
    fn set_duty(&mut self, channel: usize, duty: u8) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the analog input sampled by the status loop.
pub trait SensorPort {
    /// One raw ADC sample.
    fn read_raw(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / diagnostics)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
///
/// Implementations must not fail or block the caller.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent<'_>);
}
