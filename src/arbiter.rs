//! Mode arbiter.
//!
//! Turns drained button intents into mode transitions.  Three modes
//! interact:
//!
//! ```text
//!              red-mode btn                    blink-all btn
//!   ┌─────────┐ ─────────▶ ┌───────────┐      ┌───────────┐
//!   │  CYCLE  │            │ EMERGENCY │      │ BLINK-ALL │
//!   │ running │ ◀───────── │    RED    │      │           │
//!   └─────────┘ red-mode   └───────────┘      └───────────┘
//!     ▲     │                                   │     ▲
//!     │     │ cycle btn                         │     │
//!     │     ▼                      blink-all btn│     │
//!   ┌─────────┐                                 ▼     │
//!   │  CYCLE  │        (either override returns to a running cycle)
//!   │ paused  │
//!   └─────────┘
//! ```
//!
//! Every transition first stops all light actions and blanks the lamps,
//! so nothing armed under the old mode can fire into the new one.

use log::{debug, info};

use crate::app::ports::PinPort;
use crate::config::ControllerConfig;
use crate::fsm::Sequencer;
use crate::fsm::context::{ControllerState, Lamp, LightState, ModeFlags};
use crate::intents::{Button, PendingIntents};
use crate::scheduler::{Scheduler, TaskId};

/// Outcome of one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied { from: ModeFlags, to: ModeFlags },
    Ignored(&'static str),
}

// ---------------------------------------------------------------------------
// Contact-bounce lockout
// ---------------------------------------------------------------------------

/// Drops a button's intent if it arrives within the lockout window of
/// that button's previously accepted intent.
pub struct Arbiter {
    lockout_ms: u32,
    last_accepted: [Option<u32>; Button::COUNT],
}

impl Arbiter {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            lockout_ms: config.button_lockout_ms,
            last_accepted: [None; Button::COUNT],
        }
    }

    pub fn debounce(&mut self, pending: PendingIntents, now_ms: u32) -> PendingIntents {
        let mut accepted = PendingIntents::default();
        for button in pending.iter() {
            let slot = &mut self.last_accepted[button as usize];
            if let Some(last) = *slot {
                if now_ms.wrapping_sub(last) < self.lockout_ms {
                    debug!("Arbiter: {} bounce dropped", button.name());
                    continue;
                }
            }
            *slot = Some(now_ms);
            accepted.insert(button);
        }
        accepted
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Disable every light action and drive all lamps off.  Idempotent.
///
/// The status report is not a light action and keeps its cadence.
pub fn stop_all_tasks(state: &mut ControllerState, sched: &mut Scheduler, pins: &mut impl PinPort) {
    sched.disable_where(TaskId::is_light_action);
    for lamp in Lamp::ALL {
        pins.set_output_level(lamp.pin(), 0);
    }
    state.lights = LightState::all_off();
    state.phase = None;
    state.blink_all_on = false;
}

/// Apply one accepted intent.
pub fn apply_intent(
    button: Button,
    now_ms: u32,
    state: &mut ControllerState,
    sched: &mut Scheduler,
    seq: &Sequencer,
    pins: &mut impl PinPort,
    config: &ControllerConfig,
) -> Transition {
    let from = state.modes;

    match button {
        Button::RedMode => {
            let red_mode = !from.red_mode;
            state.modes = ModeFlags {
                red_mode,
                blink_all: false,
                cycle_running: !red_mode,
            };
            stop_all_tasks(state, sched, pins);
            if red_mode {
                pins.set_output_level(Lamp::Red.pin(), config.full_scale_level);
                state.lights = LightState::only(Lamp::Red);
                info!("Emergency Mode: Red LED ON");
            } else {
                seq.start(sched, now_ms);
                info!("Exiting Emergency Mode, restarting cycle...");
            }
        }
        Button::BlinkAll => {
            let blink_all = !from.blink_all;
            state.modes = ModeFlags {
                red_mode: false,
                blink_all,
                cycle_running: !blink_all,
            };
            stop_all_tasks(state, sched, pins);
            if blink_all {
                sched.enable(TaskId::BlinkAll, now_ms);
                info!("Blinking Mode: All LEDs blinking...");
            } else {
                sched.disable(TaskId::BlinkAll);
                seq.start(sched, now_ms);
                info!("Stopping blinking, resuming normal cycle...");
            }
        }
        Button::ToggleCycle => {
            // Keeps `ModeFlags::is_consistent`: the cycle never runs under an override.
            if from.override_active() {
                info!("Cycle toggle ignored: override mode active");
                return Transition::Ignored("override mode active");
            }
            state.modes.cycle_running = !from.cycle_running;
            stop_all_tasks(state, sched, pins);
            if state.modes.cycle_running {
                seq.start(sched, now_ms);
                info!("Cycle ON: Restarting...");
            } else {
                info!("Cycle OFF: Stopping...");
            }
        }
    }

    Transition::Applied {
        from,
        to: state.modes,
    }
}

/// Handle a firing of the blink-all action: flip all three lamps together.
///
/// Returns `false` if blink-all is no longer the active mode.
pub fn on_blink_all_fired(
    state: &mut ControllerState,
    pins: &mut impl PinPort,
    brightness: u8,
) -> bool {
    if !state.modes.blink_all {
        debug!("Arbiter: stale blink-all firing suppressed");
        return false;
    }
    state.blink_all_on = !state.blink_all_on;
    state.lights = LightState::all(state.blink_all_on);
    let level = if state.blink_all_on { brightness } else { 0 };
    for lamp in Lamp::ALL {
        pins.set_output_level(lamp.pin(), level);
    }
    true
}
