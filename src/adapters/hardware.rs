//! Hardware adapter: bridges real peripherals to the [`PinPort`] trait.
//!
//! Owns the lamp driver and reads the potentiometer and button pins.  This
//! is the only module in the system that touches actual hardware.  On
//! non-espidf targets the underlying drivers use cfg-gated simulation
//! stubs, and the potentiometer reading can be injected.

use log::{debug, warn};

use crate::app::ports::{PinMode, PinPort};
use crate::drivers::hw_init;
use crate::drivers::lamp::LampBank;
use crate::pins;

/// Concrete adapter that puts the board behind the pin port.
pub struct HardwareAdapter {
    lamps: LampBank,
    #[cfg(not(target_os = "espidf"))]
    sim_pot: u16,
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    /// Call after `hw_init::init_peripherals`; all lamps start dark.
    pub fn new() -> Self {
        let mut lamps = LampBank::new();
        lamps.off();
        Self {
            lamps,
            #[cfg(not(target_os = "espidf"))]
            sim_pot: 1023,
        }
    }

    pub fn lamps(&self) -> &LampBank {
        &self.lamps
    }

    /// Set the simulated potentiometer reading.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_pot(&mut self, raw: u16) {
        self.sim_pot = raw;
    }
}

// ── PinPort implementation ────────────────────────────────────

impl PinPort for HardwareAdapter {
    fn set_pin_mode(&mut self, pin: i32, mode: PinMode) {
        // Directions, pulls and PWM routing are fixed by hw_init; this only
        // cross-checks the request against the board wiring.
        let wired = match mode {
            PinMode::Output => hw_init::ledc_channel_for(pin).is_some(),
            PinMode::InputPullUp => hw_init::BUTTON_GPIOS.contains(&pin),
            PinMode::Analog => pin == pins::POT_ADC_GPIO,
        };
        if wired {
            debug!("Hardware: GPIO {} as {:?}", pin, mode);
        } else {
            warn!("Hardware: GPIO {} is not wired as {:?}", pin, mode);
        }
    }

    fn set_output_level(&mut self, pin: i32, level: u8) {
        if !self.lamps.set(pin, level) {
            warn!("Hardware: GPIO {} is not a lamp output", pin);
        }
    }

    fn read_digital(&mut self, pin: i32) -> bool {
        hw_init::gpio_read(pin)
    }

    #[cfg(target_os = "espidf")]
    fn read_analog(&mut self, pin: i32) -> u16 {
        if pin != pins::POT_ADC_GPIO {
            return 0;
        }
        hw_init::adc1_read(hw_init::ADC1_CH_POT)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_analog(&mut self, pin: i32) -> u16 {
        if pin != pins::POT_ADC_GPIO {
            return 0;
        }
        self.sim_pot
    }
}
