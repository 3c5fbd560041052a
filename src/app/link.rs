//! Link-layer state shared between the radio callback context and the
//! foreground status loop.
//!
//! ```text
//!   radio callbacks ──set_connected()──▶ ConnectionState ◀──is_connected()── status loop
//! ```
//!
//! The connected flag is the only mutable state the two contexts share.
//! It is a single atomic word, so no lock is needed on either side.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

// ───────────────────────────────────────────────────────────────
// Link timing policy
// ───────────────────────────────────────────────────────────────

/// Connection interval requested on every connect (1.25 ms units → 15 ms).
pub const CONN_INTERVAL_UNITS: u16 = 0x0C;
/// No connection events may be skipped by the peripheral.
pub const PERIPHERAL_LATENCY: u16 = 0;
/// Supervision timeout (10 ms units → 4 s).
pub const SUPERVISION_TIMEOUT_UNITS: u16 = 400;

const CONN_INTERVAL_UNIT_US: u32 = 1_250;
const SUPERVISION_UNIT_MS: u32 = 10;

// ───────────────────────────────────────────────────────────────
// PeerAddress
// ───────────────────────────────────────────────────────────────

/// Bluetooth device address of the connected central, as delivered by the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAddress(pub [u8; 6]);

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

// ───────────────────────────────────────────────────────────────
// LinkTimingRequest
// ───────────────────────────────────────────────────────────────

/// Connection parameter update sent to the radio once per connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTimingRequest {
    pub peer: PeerAddress,
    /// Minimum connection interval (1.25 ms units).
    pub min_interval: u16,
    /// Maximum connection interval (1.25 ms units).
    pub max_interval: u16,
    /// Peripheral latency (connection events).
    pub latency: u16,
    /// Supervision timeout (10 ms units).
    pub supervision_timeout: u16,
}

impl LinkTimingRequest {
    /// Fixed low-latency, low-jitter policy suited to periodic notification.
    pub const fn low_latency(peer: PeerAddress) -> Self {
        Self {
            peer,
            min_interval: CONN_INTERVAL_UNITS,
            max_interval: CONN_INTERVAL_UNITS,
            latency: PERIPHERAL_LATENCY,
            supervision_timeout: SUPERVISION_TIMEOUT_UNITS,
        }
    }

    pub fn min_interval_us(&self) -> u32 {
        u32::from(self.min_interval) * CONN_INTERVAL_UNIT_US
    }

    pub fn max_interval_us(&self) -> u32 {
        u32::from(self.max_interval) * CONN_INTERVAL_UNIT_US
    }

    pub fn supervision_timeout_ms(&self) -> u32 {
        u32::from(self.supervision_timeout) * SUPERVISION_UNIT_MS
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectionState
// ───────────────────────────────────────────────────────────────

/// Whether a central is currently connected.
///
/// The firmware holds exactly one of these in a `static`; tests create
/// their own.  Writes use `Release` and reads `Acquire`, so the status loop
/// sees a disconnect no later than its next read after the callback returns.
#[derive(Debug, Default)]
pub struct ConnectionState {
    connected: AtomicBool,
}

impl ConnectionState {
    /// A disconnected link.
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Store the new status and return the previous one.
    pub fn set_connected(&self, connected: bool) -> bool {
        self.connected.swap(connected, Ordering::AcqRel)
    }
}
