//! Link service — the connection lifecycle manager.
//!
//! [`LinkService`] owns the view of the single peer connection and routes
//! every radio callback.  All I/O flows through port traits passed in at
//! call sites, making the whole service testable with mock adapters.
//!
//! ```text
//!                    ┌──────────────────────────┐ ──▶ RadioPort (timing)
//!  RadioEvent ─────▶ │       LinkService        │
//!                    │ decode · map_intensity   │ ──▶ PwmPort   (duty ×3)
//!                    └──────────────────────────┘ ──▶ EventSink
//! ```
//!
//! State machine (one boolean, no terminal state):
//!
//! ```text
//!   Disconnected ──Connected──▶ Connected ──Disconnected──▶ Disconnected
//! ```
//!
//! Writes are accepted in either state.

use log::{debug, info, warn};

use super::commands::{Command, decode};
use super::events::{AppEvent, RadioEvent};
use super::intensity::map_intensity;
use super::link::{ConnectionState, LinkTimingRequest, PeerAddress};
use super::ports::{EventSink, PwmPort, RadioPort};

// ───────────────────────────────────────────────────────────────
// LinkStats
// ───────────────────────────────────────────────────────────────

/// Counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub connects: u32,
    pub disconnects: u32,
    pub writes: u32,
    /// Writes that decoded to an RGB command and reached the outputs.
    pub applied: u32,
    /// Writes that decoded to [`Command::Unrecognized`].
    pub ignored: u32,
}

// ───────────────────────────────────────────────────────────────
// LinkService
// ───────────────────────────────────────────────────────────────

/// Reacts to connect, disconnect and write events from the radio stack.
pub struct LinkService<'a> {
    state: &'a ConnectionState,
    stats: LinkStats,
}

impl<'a> LinkService<'a> {
    /// Bind the service to the process-wide connection state.
    pub fn new(state: &'a ConnectionState) -> Self {
        Self {
            state,
            stats: LinkStats::default(),
        }
    }

    // ── Routing ───────────────────────────────────────────────

    /// Single entry point for every radio callback.
    pub fn dispatch(
        &mut self,
        event: RadioEvent<'_>,
        radio: &mut impl RadioPort,
        pwm: &mut impl PwmPort,
        sink: &mut impl EventSink,
    ) {
        match event {
            RadioEvent::Connected(peer) => self.on_connect(peer, radio, sink),
            RadioEvent::Disconnected => self.on_disconnect(sink),
            RadioEvent::Write(payload) => self.on_write(payload, pwm, sink),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Request low-latency link timing from the new peer and mark the link up.
    ///
    /// Repeating this for the same peer reissues the identical request.
    pub fn on_connect(
        &mut self,
        peer: PeerAddress,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) {
        self.stats.connects = self.stats.connects.wrapping_add(1);

        let timing = LinkTimingRequest::low_latency(peer);
        if let Err(e) = radio.request_link_timing(&timing) {
            warn!("Link timing request to {} failed: {}", peer, e);
            sink.emit(&AppEvent::CapabilityFailed(e));
        }

        self.state.set_connected(true);
        sink.emit(&AppEvent::Connected { peer, timing });
    }

    /// Mark the link down.  Harmless without a preceding connect.
    pub fn on_disconnect(&mut self, sink: &mut impl EventSink) {
        self.stats.disconnects = self.stats.disconnects.wrapping_add(1);

        if !self.state.set_connected(false) {
            debug!("Disconnect while already disconnected");
        }
        sink.emit(&AppEvent::Disconnected);
    }

    // ── Command path ──────────────────────────────────────────

    /// Decode an inbound write and, for an RGB command, drive the outputs.
    pub fn on_write(&mut self, payload: &[u8], pwm: &mut impl PwmPort, sink: &mut impl EventSink) {
        self.stats.writes = self.stats.writes.wrapping_add(1);
        sink.emit(&AppEvent::PayloadReceived(payload));

        match decode(payload) {
            Command::RgbIntensity(cmd) => {
                let duty = map_intensity(&cmd);
                for (channel, &value) in duty.iter().enumerate() {
                    if let Err(e) = pwm.set_duty(channel, value) {
                        warn!("PWM channel {} write failed: {}", channel, e);
                        sink.emit(&AppEvent::CapabilityFailed(e));
                    }
                }
                self.stats.applied = self.stats.applied.wrapping_add(1);
                sink.emit(&AppEvent::LightsApplied(duty));
            }
            Command::Unrecognized => {
                self.stats.ignored = self.stats.ignored.wrapping_add(1);
                if !payload.is_empty() {
                    info!("Ignoring {}-byte write (not a light command)", payload.len());
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }
}
