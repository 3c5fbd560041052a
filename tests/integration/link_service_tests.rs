//! Integration tests for the radio event → LinkService → PWM pipeline.
//!
//! Events are fed through `dispatch` exactly as the BLE adapter raises
//! them, and the mock adapters record what reached the outside world.

use crate::mock_hw::{MockPwm, MockRadio, Recorded, RecordingSink};

use blelight::app::events::RadioEvent;
use blelight::app::link::{ConnectionState, LinkTimingRequest, PeerAddress};
use blelight::app::service::LinkService;
use blelight::error::{ActuatorError, CommsError, Error};

const PEER: PeerAddress = PeerAddress([0x24, 0x0a, 0xc4, 0x01, 0x02, 0x03]);

struct Rig {
    radio: MockRadio,
    pwm: MockPwm,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self {
            radio: MockRadio::default(),
            pwm: MockPwm::default(),
            sink: RecordingSink::default(),
        }
    }

    fn feed(&mut self, service: &mut LinkService<'_>, event: RadioEvent<'_>) {
        service.dispatch(event, &mut self.radio, &mut self.pwm, &mut self.sink);
    }
}

// ── Connect → write → disconnect ──────────────────────────────

#[test]
fn connect_then_full_scale_write_drives_outputs() {
    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut rig = Rig::new();

    rig.feed(&mut service, RadioEvent::Connected(PEER));
    assert!(state.is_connected());
    assert_eq!(
        rig.radio.timing_requests,
        vec![LinkTimingRequest {
            peer: PEER,
            min_interval: 0x0C,
            max_interval: 0x0C,
            latency: 0,
            supervision_timeout: 400,
        }]
    );

    rig.feed(&mut service, RadioEvent::Write(&[10, 20, 30, 255]));
    assert_eq!(rig.pwm.calls, vec![(0, 10), (1, 20), (2, 30)]);

    rig.feed(&mut service, RadioEvent::Disconnected);
    assert!(!state.is_connected());

    assert_eq!(
        rig.sink.events,
        vec![
            Recorded::Connected(PEER, LinkTimingRequest::low_latency(PEER)),
            Recorded::Payload(vec![10, 20, 30, 255]),
            Recorded::Lights([10, 20, 30]),
            Recorded::Disconnected,
        ]
    );
}

#[test]
fn half_scale_write_halves_each_channel() {
    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut rig = Rig::new();

    rig.feed(&mut service, RadioEvent::Write(&[100, 0, 200, 128]));
    assert_eq!(rig.pwm.calls, vec![(0, 50), (1, 0), (2, 100)]);
}

#[test]
fn outputs_hold_last_command_across_disconnect() {
    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut rig = Rig::new();

    rig.feed(&mut service, RadioEvent::Connected(PEER));
    rig.feed(&mut service, RadioEvent::Write(&[255, 255, 255, 255]));
    rig.feed(&mut service, RadioEvent::Disconnected);

    assert_eq!(rig.pwm.levels(), [255, 255, 255]);
    assert_eq!(rig.pwm.calls.len(), 3, "disconnect must not touch the outputs");
}

// ── Rejected payloads ─────────────────────────────────────────

#[test]
fn wrong_length_writes_leave_outputs_untouched() {
    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut rig = Rig::new();

    let payloads: [&[u8]; 3] = [&[], &[1, 2, 3], &[1, 2, 3, 4, 5]];
    for payload in payloads {
        rig.feed(&mut service, RadioEvent::Write(payload));
    }

    assert!(rig.pwm.calls.is_empty());
    let stats = service.stats();
    assert_eq!(stats.writes, 3);
    assert_eq!(stats.ignored, 3);
    assert_eq!(stats.applied, 0);
    // Every write is still observed, decodable or not.
    assert_eq!(
        rig.sink
            .events
            .iter()
            .filter(|e| matches!(e, Recorded::Payload(_)))
            .count(),
        3
    );
}

#[test]
fn writes_are_applied_while_disconnected() {
    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut rig = Rig::new();

    rig.feed(&mut service, RadioEvent::Write(&[1, 2, 3, 255]));
    assert!(!state.is_connected());
    assert_eq!(rig.pwm.levels(), [1, 2, 3]);
}

// ── Lifecycle edge cases ──────────────────────────────────────

#[test]
fn repeated_connect_reissues_identical_timing_request() {
    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut rig = Rig::new();

    rig.feed(&mut service, RadioEvent::Connected(PEER));
    rig.feed(&mut service, RadioEvent::Connected(PEER));

    assert!(state.is_connected());
    assert_eq!(rig.radio.timing_requests.len(), 2);
    assert_eq!(rig.radio.timing_requests[0], rig.radio.timing_requests[1]);
    assert_eq!(service.stats().connects, 2);
}

#[test]
fn disconnect_without_connect_is_harmless() {
    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut rig = Rig::new();

    rig.feed(&mut service, RadioEvent::Disconnected);
    assert!(!state.is_connected());
    assert_eq!(rig.sink.events, vec![Recorded::Disconnected]);
}

// ── Port failures ─────────────────────────────────────────────

#[test]
fn rejected_timing_request_still_marks_connected() {
    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut rig = Rig::new();
    rig.radio.reject_timing = Some(-1);

    rig.feed(&mut service, RadioEvent::Connected(PEER));

    assert!(service.is_connected());
    assert_eq!(
        rig.sink.events[0],
        Recorded::Failed(Error::Comms(CommsError::LinkUpdateFailed(-1)))
    );
}

#[test]
fn one_broken_channel_does_not_block_the_others() {
    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut rig = Rig::new();
    rig.pwm.broken_channel = Some(1);

    rig.feed(&mut service, RadioEvent::Write(&[40, 50, 60, 255]));

    assert_eq!(rig.pwm.calls, vec![(0, 40), (2, 60)]);
    assert_eq!(rig.sink.failures(), 1);
    assert!(
        rig.sink
            .events
            .contains(&Recorded::Failed(Error::Actuator(ActuatorError::PwmWriteFailed)))
    );
}
