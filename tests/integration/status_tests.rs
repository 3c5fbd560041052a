//! Integration tests for the status loop against a live connection flag.

use crate::mock_hw::{MockPwm, MockRadio, MockSensor, Recorded, RecordingSink};

use blelight::app::events::RadioEvent;
use blelight::app::link::{ConnectionState, PeerAddress};
use blelight::app::service::LinkService;
use blelight::app::status::StatusReporter;
use blelight::config::LightConfig;

#[test]
fn status_samples_only_while_connected() {
    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut reporter = StatusReporter::new(&LightConfig::default());
    let mut radio = MockRadio::default();
    let mut pwm = MockPwm::default();
    let mut sensor = MockSensor::new(3456);
    let mut sink = RecordingSink::default();

    assert_eq!(reporter.tick(&state, &mut sensor, &mut radio, &mut sink), None);
    assert_eq!(sensor.reads, 0);

    service.dispatch(
        RadioEvent::Connected(PeerAddress([1; 6])),
        &mut radio,
        &mut pwm,
        &mut sink,
    );
    assert_eq!(
        reporter.tick(&state, &mut sensor, &mut radio, &mut sink),
        Some("1000.00")
    );
    assert_eq!(sink.events.last(), Some(&Recorded::Status(3456, "1000.00".into())));

    // The very next tick after a disconnect must observe it.
    service.dispatch(RadioEvent::Disconnected, &mut radio, &mut pwm, &mut sink);
    assert_eq!(reporter.tick(&state, &mut sensor, &mut radio, &mut sink), None);
    assert_eq!(sensor.reads, 1);
    assert_eq!(reporter.samples(), 1);
}

#[test]
fn default_config_never_notifies() {
    let state = ConnectionState::new();
    state.set_connected(true);
    let mut reporter = StatusReporter::new(&LightConfig::default());
    let mut radio = MockRadio::default();
    let mut sensor = MockSensor::new(100);
    let mut sink = RecordingSink::default();

    for _ in 0..3 {
        reporter.tick(&state, &mut sensor, &mut radio, &mut sink);
    }
    assert!(radio.notifications.is_empty());
    assert_eq!(sensor.reads, 3);
}

#[test]
fn notify_enabled_sends_formatted_text() {
    let state = ConnectionState::new();
    state.set_connected(true);
    let config = LightConfig {
        notify_status: true,
        ..LightConfig::default()
    };
    let mut reporter = StatusReporter::new(&config);
    let mut radio = MockRadio::default();
    let mut sensor = MockSensor::new(0);
    let mut sink = RecordingSink::default();

    reporter.tick(&state, &mut sensor, &mut radio, &mut sink);
    assert_eq!(radio.notifications, vec![b"0.00".to_vec()]);
}
