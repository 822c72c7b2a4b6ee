//! Status reporter.
//!
//! One comma-separated line per report:
//!
//! ```text
//! mode,blinkAll,cycleRunning,red,yellow,green,brightness
//!  1  ,   0    ,     0      , 1 ,  0   ,  0  ,   127
//! ```
//!
//! `mode` is 1 for emergency red, 2 for blink-all, 0 for a running cycle
//! and 3 for a paused cycle, checked in that order.

use core::fmt;

use serde::Serialize;

use crate::fsm::context::{ControllerState, LightState, ModeFlags};

/// Numeric mode code on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum ModeCode {
    Cycle = 0,
    Red = 1,
    BlinkAll = 2,
    Paused = 3,
}

impl ModeCode {
    pub fn from_modes(modes: &ModeFlags) -> Self {
        if modes.red_mode {
            Self::Red
        } else if modes.blink_all {
            Self::BlinkAll
        } else if modes.cycle_running {
            Self::Cycle
        } else {
            Self::Paused
        }
    }
}

/// Snapshot rendered as one status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub mode: ModeCode,
    pub modes: ModeFlags,
    pub lights: LightState,
    pub brightness: u8,
}

impl StatusReport {
    pub fn capture(state: &ControllerState, brightness: u8) -> Self {
        Self {
            mode: ModeCode::from_modes(&state.modes),
            modes: state.modes,
            lights: state.lights,
            brightness,
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{}",
            self.mode as u8,
            u8::from(self.modes.blink_all),
            u8::from(self.modes.cycle_running),
            u8::from(self.lights.red),
            u8::from(self.lights.yellow),
            u8::from(self.lights.green),
            self.brightness
        )
    }
}

/// Map a raw potentiometer reading onto `0..=full_scale`.
///
/// Integer arithmetic, truncating; readings above `adc_max` clamp.
pub fn brightness_from_adc(raw: u16, adc_max: u16, full_scale: u8) -> u8 {
    let raw = u32::from(raw.min(adc_max));
    let scaled = (raw * u32::from(full_scale))
        .checked_div(u32::from(adc_max))
        .unwrap_or(0);
    scaled.min(u32::from(full_scale)) as u8
}
