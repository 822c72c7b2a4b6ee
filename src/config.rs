//! Controller configuration parameters
//!
//! All tunable constants for the crossing controller.  Nothing here is
//! persisted: the phase durations can be retuned at runtime over the
//! serial console, but every power cycle starts from these defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scheduler::MAX_DELAY_MS;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Phase durations (initial values, retunable) ---
    /// Red phase hold time (milliseconds)
    pub red_ms: u32,
    /// Yellow hold time, used after red and after the green blink (milliseconds)
    pub yellow_ms: u32,
    /// Steady green hold time before blinking starts (milliseconds)
    pub green_ms: u32,

    // --- Green blink ---
    /// Half-period of the green blink (milliseconds)
    pub blink_interval_ms: u32,
    /// Number of green toggles before yellow
    pub blink_toggles: u8,

    // --- Override modes ---
    /// Half-period of the all-lamps blink (milliseconds)
    pub blink_all_interval_ms: u32,
    /// Presses of the same button closer than this are treated as contact bounce
    pub button_lockout_ms: u32,

    // --- Reporting / loop timing ---
    /// Status line period (milliseconds)
    pub status_interval_ms: u32,
    /// Fixed delay between control passes (milliseconds)
    pub pass_interval_ms: u32,
    /// Console UART baud rate
    pub serial_baud: u32,
    /// Task watchdog timeout; must exceed the pass interval (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Output scaling ---
    /// PWM level written for a fully lit lamp
    pub full_scale_level: u8,
    /// Highest raw reading of the potentiometer ADC
    pub adc_max: u16,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Phases
            red_ms: 2000,
            yellow_ms: 500,
            green_ms: 2000,

            // Green blink: 6 toggles = 3 visible blinks
            blink_interval_ms: 333,
            blink_toggles: 6,

            // Overrides
            blink_all_interval_ms: 1000,
            button_lockout_ms: 50,

            // Timing
            status_interval_ms: 1000, // 1 Hz
            pass_interval_ms: 100,    // 10 Hz
            serial_baud: 9600,
            watchdog_timeout_ms: 5000,

            // Scaling
            full_scale_level: 255,
            adc_max: 1023, // 10-bit potentiometer range
        }
    }
}

impl ControllerConfig {
    /// Reject configurations that would stall or divide by zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            (self.red_ms, "red_ms"),
            (self.yellow_ms, "yellow_ms"),
            (self.green_ms, "green_ms"),
            (self.blink_interval_ms, "blink_interval_ms"),
            (self.blink_all_interval_ms, "blink_all_interval_ms"),
            (self.status_interval_ms, "status_interval_ms"),
            (self.pass_interval_ms, "pass_interval_ms"),
            (self.serial_baud, "serial_baud"),
        ];
        for (value, field) in positive {
            if value == 0 {
                return Err(ConfigError::ValidationFailed(field));
            }
        }
        let delays = [
            (self.red_ms, "red_ms"),
            (self.yellow_ms, "yellow_ms"),
            (self.green_ms, "green_ms"),
            (self.blink_interval_ms, "blink_interval_ms"),
            (self.blink_all_interval_ms, "blink_all_interval_ms"),
            (self.status_interval_ms, "status_interval_ms"),
        ];
        for (value, field) in delays {
            if value > MAX_DELAY_MS {
                return Err(ConfigError::ValidationFailed(field));
            }
        }
        if self.blink_toggles == 0 {
            return Err(ConfigError::ValidationFailed("blink_toggles"));
        }
        if self.adc_max == 0 {
            return Err(ConfigError::ValidationFailed("adc_max"));
        }
        if self.watchdog_timeout_ms <= self.pass_interval_ms {
            return Err(ConfigError::ValidationFailed("watchdog_timeout_ms"));
        }
        Ok(())
    }
}
