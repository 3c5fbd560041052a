//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).  Payload bytes
//! are rendered in decimal so a serial monitor shows exactly what the
//! central wrote.

use log::{debug, info, warn};

use super::utils::SpacedBytes;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent<'_>) {
        match event {
            AppEvent::Connected { peer, timing } => {
                info!(
                    "LINK  | connected peer={} | interval={}-{}us latency={} timeout={}ms",
                    peer,
                    timing.min_interval_us(),
                    timing.max_interval_us(),
                    timing.latency,
                    timing.supervision_timeout_ms(),
                );
            }
            AppEvent::Disconnected => {
                info!("LINK  | disconnected");
            }
            AppEvent::PayloadReceived(payload) => {
                info!("RX    | len={} | {}", payload.len(), SpacedBytes(payload));
            }
            AppEvent::LightsApplied(duty) => {
                info!("LIGHT | duty={:?}", duty);
            }
            AppEvent::StatusSampled { raw, text } => {
                debug!("STAT  | raw={} value={}", raw, text);
            }
            AppEvent::CapabilityFailed(e) => {
                warn!("FAULT | {}", e);
            }
        }
    }
}
