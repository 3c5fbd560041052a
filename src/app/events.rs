//! Events crossing the application boundary.
//!
//! - [`RadioEvent`] flows **in**: the BLE adapter raises one per GATT
//!   server callback and hands it to
//!   [`LinkService::dispatch`](super::service::LinkService::dispatch).
//! - [`AppEvent`] flows **out** through the
//!   [`EventSink`](super::ports::EventSink) port.  Adapters decide what to do
//!   with them (serial log, counters, test recorders).
//!
//! Both borrow their byte payloads from the callback that produced them and
//! must not be retained past it.

use super::intensity::DutyVector;
use super::link::{LinkTimingRequest, PeerAddress};
use crate::error::Error;

/// The closed set of radio stack callbacks the core handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioEvent<'a> {
    /// A central connected.
    Connected(PeerAddress),
    /// The central disconnected (or the link supervision timed out).
    Disconnected,
    /// The central wrote to the RX characteristic.
    Write(&'a [u8]),
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent<'a> {
    /// A central connected; the timing request has been issued.
    Connected {
        peer: PeerAddress,
        timing: LinkTimingRequest,
    },

    /// The central went away.
    Disconnected,

    /// Raw bytes of an inbound write, before decoding.
    PayloadReceived(&'a [u8]),

    /// A decoded RGB command was written to the outputs.
    LightsApplied(DutyVector),

    /// The status loop sampled the sensor while connected.
    StatusSampled { raw: u16, text: &'a str },

    /// A port call failed; the core carried on without it.
    CapabilityFailed(Error),
}
