//! Phase table rows and hold-time functions.
//!
//! Each row is plain data plus one `fn` pointer for the hold time. No
//! closures and no heap.
//!
//! ```text
//!  RED ──red_ms──▶ YELLOW ──yellow_ms──▶ GREEN ──green_ms──▶ GREEN_BLINK (×6, 333 ms)
//!   ▲                                                            │
//!   └────────────yellow_ms──────── YELLOW ◀──────333 ms──────────┘
//! ```

use super::context::{Lamp, PhaseDurations};
use super::{Advance, Lighting, Phase, PhaseDescriptor};
use crate::config::ControllerConfig;

/// Build the static phase table.  Called once at startup.
pub fn build_phase_table() -> [PhaseDescriptor; Phase::COUNT] {
    [
        // Index 0: Red
        PhaseDescriptor {
            phase: Phase::Red,
            name: "Red",
            lighting: Lighting::Steady(Lamp::Red),
            next: Phase::YellowFromRed,
            hold: red_hold,
            advance: Advance::Always,
        },
        // Index 1: YellowFromRed
        PhaseDescriptor {
            phase: Phase::YellowFromRed,
            name: "YellowFromRed",
            lighting: Lighting::Steady(Lamp::Yellow),
            next: Phase::Green,
            hold: yellow_hold,
            advance: Advance::Always,
        },
        // Index 2: Green
        PhaseDescriptor {
            phase: Phase::Green,
            name: "Green",
            lighting: Lighting::Steady(Lamp::Green),
            next: Phase::GreenBlink,
            hold: green_hold,
            advance: Advance::Always,
        },
        // Index 3: GreenBlink
        PhaseDescriptor {
            phase: Phase::GreenBlink,
            name: "GreenBlink",
            lighting: Lighting::ToggleGreen,
            next: Phase::YellowFromBlink,
            hold: blink_hold,
            advance: Advance::OnLastIteration,
        },
        // Index 4: YellowFromBlink
        PhaseDescriptor {
            phase: Phase::YellowFromBlink,
            name: "YellowFromBlink",
            lighting: Lighting::Steady(Lamp::Yellow),
            next: Phase::Red,
            hold: yellow_hold,
            advance: Advance::Always,
        },
    ]
}

fn red_hold(d: &PhaseDurations, _config: &ControllerConfig) -> u32 {
    d.red_ms
}

fn yellow_hold(d: &PhaseDurations, _config: &ControllerConfig) -> u32 {
    d.yellow_ms
}

fn green_hold(d: &PhaseDurations, _config: &ControllerConfig) -> u32 {
    d.green_ms
}

// The last toggle stays visible for one full half-period.
fn blink_hold(_d: &PhaseDurations, config: &ControllerConfig) -> u32 {
    config.blink_interval_ms
}
