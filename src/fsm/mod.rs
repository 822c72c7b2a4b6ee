//! Table-driven light sequencer.
//!
//! The normal cycle is an explicit enumerated state machine:
//!
//! ```text
//! ┌─────────────────┬────────────────┬──────────────────┬──────────────┬──────────────────┐
//! │ Phase           │ Lighting       │ Next             │ Hold         │ Advance          │
//! ├─────────────────┼────────────────┼──────────────────┼──────────────┼──────────────────┤
//! │ Red             │ red            │ YellowFromRed    │ red_ms       │ always           │
//! │ YellowFromRed   │ yellow         │ Green            │ yellow_ms    │ always           │
//! │ Green           │ green          │ GreenBlink       │ green_ms     │ always           │
//! │ GreenBlink      │ toggle green   │ YellowFromBlink  │ blink_ms     │ on last toggle   │
//! │ YellowFromBlink │ yellow         │ Red              │ yellow_ms    │ always           │
//! └─────────────────┴────────────────┴──────────────────┴──────────────┴──────────────────┘
//! ```
//!
//! Each phase owns exactly one registry action (its armed deadline).  When
//! that action fires, [`Sequencer::on_fired`] checks the override guard,
//! drives the lamps for the phase, and arms the next phase's action after
//! the row's hold time.  If the guard fails the firing is a no-op and the
//! chain stops, which is what makes "stop everything, later restart RED at
//! delay 0" a safe re-entry point.

pub mod context;
pub mod states;

use context::{ControllerState, Lamp, LightState, PhaseDurations};
use log::debug;
use serde::Serialize;

use crate::app::ports::PinPort;
use crate::config::ControllerConfig;
use crate::scheduler::{Scheduler, TaskId};

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Phase {
    Red = 0,
    YellowFromRed = 1,
    Green = 2,
    GreenBlink = 3,
    YellowFromBlink = 4,
}

impl Phase {
    /// Total number of phases, used to size the table array.
    pub const COUNT: usize = 5;

    /// Registry action that fires this phase.
    pub fn task(self) -> TaskId {
        match self {
            Self::Red => TaskId::Red,
            Self::YellowFromRed => TaskId::YellowAfterRed,
            Self::Green => TaskId::Green,
            Self::GreenBlink => TaskId::BlinkGreen,
            Self::YellowFromBlink => TaskId::YellowAfterBlink,
        }
    }

    pub fn from_task(task: TaskId) -> Option<Self> {
        match task {
            TaskId::Red => Some(Self::Red),
            TaskId::YellowAfterRed => Some(Self::YellowFromRed),
            TaskId::Green => Some(Self::Green),
            TaskId::BlinkGreen => Some(Self::GreenBlink),
            TaskId::YellowAfterBlink => Some(Self::YellowFromBlink),
            TaskId::BlinkAll | TaskId::SendStatus => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Table row
// ---------------------------------------------------------------------------

/// What a phase does to the lamps when its action fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lighting {
    /// Exactly this lamp at full scale, the others off.
    Steady(Lamp),
    /// Invert the green lamp; red and yellow off.
    ToggleGreen,
}

/// When a firing arms the next phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Always,
    /// Only on the final firing of a counted action.
    OnLastIteration,
}

/// Time from this phase's firing to the next phase's firing.
pub type HoldFn = fn(&PhaseDurations, &ControllerConfig) -> u32;

/// One row of the phase table.
pub struct PhaseDescriptor {
    pub phase: Phase,
    pub name: &'static str,
    pub lighting: Lighting,
    pub next: Phase,
    pub hold: HoldFn,
    pub advance: Advance,
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

pub struct Sequencer {
    /// Fixed-size table indexed by `Phase as usize`.
    table: [PhaseDescriptor; Phase::COUNT],
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            table: states::build_phase_table(),
        }
    }

    pub fn descriptor(&self, phase: Phase) -> &PhaseDescriptor {
        &self.table[phase as usize]
    }

    /// (Re)start the cycle: arm RED to fire on the next pass.
    pub fn start(&self, sched: &mut Scheduler, now_ms: u32) {
        sched.restart_delayed(Phase::Red.task(), now_ms, 0);
    }

    /// Handle the firing of `phase`'s action.
    ///
    /// Returns `false` when the override guard suppressed the firing.
    pub fn on_fired(
        &self,
        phase: Phase,
        now_ms: u32,
        ctx: &mut ControllerState,
        sched: &mut Scheduler,
        pins: &mut impl PinPort,
        config: &ControllerConfig,
    ) -> bool {
        let row = self.descriptor(phase);

        if !ctx.modes.cycle_may_advance() {
            debug!("Sequencer: {} suppressed ({:?})", row.name, ctx.modes);
            return false;
        }

        ctx.lights = match row.lighting {
            Lighting::Steady(lamp) => LightState::only(lamp),
            Lighting::ToggleGreen => LightState {
                green: !ctx.lights.green,
                ..LightState::all_off()
            },
        };
        for lamp in Lamp::ALL {
            let level = if ctx.lights.is_on(lamp) {
                config.full_scale_level
            } else {
                0
            };
            pins.set_output_level(lamp.pin(), level);
        }
        ctx.phase = Some(phase);

        let arm_next = match row.advance {
            Advance::Always => true,
            Advance::OnLastIteration => sched.is_last_iteration(phase.task()),
        };
        if arm_next {
            let hold = (row.hold)(&ctx.durations, config);
            debug!(
                "Sequencer: {} -> {} in {} ms",
                row.name,
                self.descriptor(row.next).name,
                hold
            );
            sched.restart_delayed(row.next.task(), now_ms, hold);
        }

        true
    }

    /// Length of one unguarded cycle, RED entry to the next RED entry.
    pub fn cycle_length_ms(&self, durations: &PhaseDurations, config: &ControllerConfig) -> u32 {
        self.table
            .iter()
            .map(|row| {
                let hold = (row.hold)(durations, config);
                match row.advance {
                    Advance::Always => hold,
                    // The counted action toggles `n` times one interval
                    // apart, then holds once more before advancing.
                    Advance::OnLastIteration => {
                        hold + (u32::from(config.blink_toggles) - 1) * config.blink_interval_ms
                    }
                }
            })
            .sum()
    }
}
