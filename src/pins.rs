//! GPIO / peripheral pin assignments for the ESP32 DevKit (DOIT) board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// RGB light outputs (LEDC PWM)
// ---------------------------------------------------------------------------

/// Number of independently dimmable light outputs.
pub const NUM_CHANNELS: usize = 3;

pub const LED_R_GPIO: i32 = 2;
pub const LED_G_GPIO: i32 = 4;
pub const LED_B_GPIO: i32 = 5;

/// Output GPIOs in channel order (channel 0 = red).
pub const LED_GPIOS: [i32; NUM_CHANNELS] = [LED_R_GPIO, LED_G_GPIO, LED_B_GPIO];

// ---------------------------------------------------------------------------
// Analog sensor input
// ---------------------------------------------------------------------------

/// Analog input sampled by the status task.
pub const SENSOR_GPIO: i32 = 32;
/// GPIO 32 is ADC1 channel 4 on the ESP32.
pub const SENSOR_ADC1_CHANNEL: u32 = 4;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u8 = 8;
/// LEDC base frequency for the light outputs.
pub const LED_PWM_FREQ_HZ: u32 = 5_000;
