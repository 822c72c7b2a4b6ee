//! GPIO / peripheral pin assignments for the crossing controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Signal lamps (LEDC PWM, 8-bit)
// ---------------------------------------------------------------------------

pub const RED_LAMP_GPIO: i32 = 3;
pub const YELLOW_LAMP_GPIO: i32 = 5;
pub const GREEN_LAMP_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Brightness potentiometer (ADC1)
// ---------------------------------------------------------------------------

/// Wiper of the brightness potentiometer.  ADC1 channel 1 on the board.
pub const POT_ADC_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Operator buttons (active-low, internal pull-up, falling-edge interrupt)
// ---------------------------------------------------------------------------

/// Emergency red hold.
pub const BUTTON_RED_MODE_GPIO: i32 = 8;
/// All lamps blinking.
pub const BUTTON_BLINK_ALL_GPIO: i32 = 9;
/// Normal cycle on/off.
pub const BUTTON_TOGGLE_CYCLE_GPIO: i32 = 10;

// ---------------------------------------------------------------------------
// UART console (tuning input + status output)
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0..=255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC frequency for the signal lamps (1 kHz, flicker-free).
pub const LAMP_PWM_FREQ_HZ: u32 = 1_000;
