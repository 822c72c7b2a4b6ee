//! Signal lamp driver.
//!
//! Three LEDC PWM channels (CH0-2) drive the red, yellow and green lamps.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty registers via hw_init.
//! On host/test: tracks levels in-memory only.

use crate::drivers::hw_init;

pub struct LampBank {
    /// Last level written, indexed by LEDC channel.
    levels: [u8; 3],
}

impl Default for LampBank {
    fn default() -> Self {
        Self::new()
    }
}

impl LampBank {
    pub fn new() -> Self {
        Self { levels: [0; 3] }
    }

    /// Drive the lamp on `pin` at `level`.  Returns `false` if `pin` is
    /// not a lamp.
    pub fn set(&mut self, pin: i32, level: u8) -> bool {
        let Some(channel) = hw_init::ledc_channel_for(pin) else {
            return false;
        };
        hw_init::ledc_set(channel, level);
        self.levels[channel as usize] = level;
        true
    }

    pub fn level(&self, pin: i32) -> Option<u8> {
        hw_init::ledc_channel_for(pin).map(|ch| self.levels[ch as usize])
    }

    pub fn off(&mut self) {
        for channel in [
            hw_init::LEDC_CH_RED,
            hw_init::LEDC_CH_YELLOW,
            hw_init::LEDC_CH_GREEN,
        ] {
            hw_init::ledc_set(channel, 0);
            self.levels[channel as usize] = 0;
        }
    }
}
