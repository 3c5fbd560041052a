//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `ble`          | RadioPort          | Bluedroid GATT server       |
//! | `hardware`     | PwmPort            | LEDC PWM (embedded-hal)     |
//! |                | SensorPort         | ESP32 ADC1                  |
//! | `log_sink`     | EventSink          | Serial log output           |

pub mod ble;
pub mod hardware;
pub mod log_sink;
pub(super) mod utils;
