//! Fuzz target: `decode` + `map_intensity` + `LinkService::on_write`
//!
//! Drives arbitrary RX characteristic writes through the decoder, the
//! intensity mapper and the service write path.  None may panic, no mapped
//! duty may exceed the level it was derived from, and the service must
//! touch the outputs only for a decodable write.
//!
//! cargo fuzz run fuzz_command_decoder

#![no_main]

use blelight::app::commands::{Command, RGB_COMMAND_LEN, decode};
use blelight::app::events::AppEvent;
use blelight::app::intensity::map_intensity;
use blelight::app::link::ConnectionState;
use blelight::app::ports::{EventSink, PwmPort};
use blelight::app::service::LinkService;
use blelight::error::Result;
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct CountingPwm {
    writes: usize,
}

impl PwmPort for CountingPwm {
    fn set_duty(&mut self, channel: usize, _duty: u8) -> Result<()> {
        assert!(channel < 3, "channel index out of range");
        self.writes += 1;
        Ok(())
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent<'_>) {}
}

fuzz_target!(|data: &[u8]| {
    let decodable = match decode(data) {
        Command::RgbIntensity(cmd) => {
            assert_eq!(data.len(), RGB_COMMAND_LEN, "only 4-byte writes decode");
            let duty = map_intensity(&cmd);
            for (d, c) in duty.iter().zip(cmd.channels.iter()) {
                assert!(d <= c, "scaling must never brighten a channel");
            }
            true
        }
        Command::Unrecognized => {
            assert_ne!(data.len(), RGB_COMMAND_LEN, "every 4-byte write decodes");
            false
        }
    };

    let state = ConnectionState::new();
    let mut service = LinkService::new(&state);
    let mut pwm = CountingPwm::default();
    service.on_write(data, &mut pwm, &mut NullSink);
    assert_eq!(pwm.writes, if decodable { 3 } else { 0 });
    assert!(!state.is_connected(), "writes never change the link state");
});
