//! Shared mutable state threaded through the control pass.
//!
//! `ControllerState` is the single aggregate that the sequencer, the mode
//! arbiter, and the tuning channel read from and write to.  It is created
//! once at startup and only ever touched from the control pass; the
//! interrupt handlers never see it.

use serde::Serialize;

use crate::config::ControllerConfig;
use crate::pins;

use super::Phase;

// ---------------------------------------------------------------------------
// Lamps
// ---------------------------------------------------------------------------

/// One of the three signal lamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lamp {
    Red,
    Yellow,
    Green,
}

impl Lamp {
    pub const ALL: [Self; 3] = [Self::Red, Self::Yellow, Self::Green];

    /// Output pin driving this lamp.
    pub fn pin(self) -> i32 {
        match self {
            Self::Red => pins::RED_LAMP_GPIO,
            Self::Yellow => pins::YELLOW_LAMP_GPIO,
            Self::Green => pins::GREEN_LAMP_GPIO,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase durations
// ---------------------------------------------------------------------------

/// Retunable hold times, in milliseconds.  Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseDurations {
    pub red_ms: u32,
    pub yellow_ms: u32,
    pub green_ms: u32,
}

impl PhaseDurations {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            red_ms: config.red_ms,
            yellow_ms: config.yellow_ms,
            green_ms: config.green_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Lamp state
// ---------------------------------------------------------------------------

/// Logical on/off state of each lamp.
///
/// During the normal cycle at most one flag is set.  In blink-all mode the
/// three flags move together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LightState {
    pub red: bool,
    pub yellow: bool,
    pub green: bool,
}

impl LightState {
    pub fn all_off() -> Self {
        Self::default()
    }

    /// Exactly `lamp` lit.
    pub fn only(lamp: Lamp) -> Self {
        let mut s = Self::default();
        s.set(lamp, true);
        s
    }

    pub fn all(on: bool) -> Self {
        Self {
            red: on,
            yellow: on,
            green: on,
        }
    }

    pub fn is_on(&self, lamp: Lamp) -> bool {
        match lamp {
            Lamp::Red => self.red,
            Lamp::Yellow => self.yellow,
            Lamp::Green => self.green,
        }
    }

    pub fn set(&mut self, lamp: Lamp, on: bool) {
        match lamp {
            Lamp::Red => self.red = on,
            Lamp::Yellow => self.yellow = on,
            Lamp::Green => self.green = on,
        }
    }

    pub fn lit_count(&self) -> usize {
        Lamp::ALL.iter().filter(|l| self.is_on(**l)).count()
    }
}

// ---------------------------------------------------------------------------
// Mode flags
// ---------------------------------------------------------------------------

/// Operator-selected mode.
///
/// Invariant: at most one of `red_mode` / `blink_all` is set, and
/// `cycle_running` is false whenever either is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeFlags {
    pub red_mode: bool,
    pub blink_all: bool,
    pub cycle_running: bool,
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self {
            red_mode: false,
            blink_all: false,
            cycle_running: true,
        }
    }
}

impl ModeFlags {
    /// Emergency red or blink-all is active.
    pub fn override_active(&self) -> bool {
        self.red_mode || self.blink_all
    }

    /// The guard every phase callback checks before advancing.
    pub fn cycle_may_advance(&self) -> bool {
        !self.override_active() && self.cycle_running
    }

    pub fn is_consistent(&self) -> bool {
        !(self.red_mode && self.blink_all) && !(self.override_active() && self.cycle_running)
    }
}

// ---------------------------------------------------------------------------
// ControllerState
// ---------------------------------------------------------------------------

/// Everything the control pass mutates.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub durations: PhaseDurations,
    pub modes: ModeFlags,
    pub lights: LightState,
    /// Phase the sequencer last entered; `None` while stopped.
    pub phase: Option<Phase>,
    /// Current half of the all-lamps blink.
    pub blink_all_on: bool,
}

impl ControllerState {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            durations: PhaseDurations::from_config(config),
            modes: ModeFlags::default(),
            lights: LightState::all_off(),
            phase: None,
            blink_all_on: false,
        }
    }
}
