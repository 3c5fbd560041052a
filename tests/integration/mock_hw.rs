//! Mock adapters for integration tests.
//!
//! Record every port call so tests can assert on the full history without
//! touching a radio or PWM registers.

use blelight::app::events::AppEvent;
use blelight::app::intensity::DutyVector;
use blelight::app::link::{LinkTimingRequest, PeerAddress};
use blelight::app::ports::{EventSink, PwmPort, RadioPort, SensorPort};
use blelight::error::{ActuatorError, CommsError, Error, Result};

// ── MockRadio ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRadio {
    pub timing_requests: Vec<LinkTimingRequest>,
    pub notifications: Vec<Vec<u8>>,
    /// Make `request_link_timing` fail with this stack code.
    pub reject_timing: Option<i32>,
}

impl RadioPort for MockRadio {
    fn request_link_timing(&mut self, request: &LinkTimingRequest) -> Result<()> {
        self.timing_requests.push(*request);
        match self.reject_timing {
            Some(code) => Err(CommsError::LinkUpdateFailed(code).into()),
            None => Ok(()),
        }
    }

    fn notify(&mut self, value: &[u8]) -> Result<()> {
        self.notifications.push(value.to_vec());
        Ok(())
    }
}

// ── MockPwm ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPwm {
    /// `(channel, duty)` in call order.
    pub calls: Vec<(usize, u8)>,
    /// Channel whose writes fail.
    pub broken_channel: Option<usize>,
}

#[allow(dead_code)]
impl MockPwm {
    /// Most recent duty per channel, zero if never written.
    pub fn levels(&self) -> DutyVector {
        let mut levels = [0; 3];
        for &(channel, duty) in &self.calls {
            if let Some(level) = levels.get_mut(channel) {
                *level = duty;
            }
        }
        levels
    }
}

impl PwmPort for MockPwm {
    fn set_duty(&mut self, channel: usize, duty: u8) -> Result<()> {
        if self.broken_channel == Some(channel) {
            return Err(ActuatorError::PwmWriteFailed.into());
        }
        self.calls.push((channel, duty));
        Ok(())
    }
}

// ── MockSensor ────────────────────────────────────────────────

pub struct MockSensor {
    pub raw: u16,
    pub reads: u32,
}

impl MockSensor {
    pub fn new(raw: u16) -> Self {
        Self { raw, reads: 0 }
    }
}

impl SensorPort for MockSensor {
    fn read_raw(&mut self) -> u16 {
        self.reads += 1;
        self.raw
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Owned copy of an [`AppEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Connected(PeerAddress, LinkTimingRequest),
    Disconnected,
    Payload(Vec<u8>),
    Lights(DutyVector),
    Status(u16, String),
    Failed(Error),
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<Recorded>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn failures(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Recorded::Failed(_)))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent<'_>) {
        self.events.push(match *event {
            AppEvent::Connected { peer, timing } => Recorded::Connected(peer, timing),
            AppEvent::Disconnected => Recorded::Disconnected,
            AppEvent::PayloadReceived(bytes) => Recorded::Payload(bytes.to_vec()),
            AppEvent::LightsApplied(duty) => Recorded::Lights(duty),
            AppEvent::StatusSampled { raw, text } => Recorded::Status(raw, text.to_owned()),
            AppEvent::CapabilityFailed(e) => Recorded::Failed(e),
        });
    }
}
