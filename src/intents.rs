//! Interrupt edge latches for the three operator buttons.
//!
//! Each button's falling-edge ISR sets one boolean and returns.  The
//! control pass reads and clears all three inside a single critical
//! section, so a press can never be lost between the read and the clear,
//! and presses repeated between two drains coalesce into one intent.
//!
//! ```text
//! ┌──────────────┐   latch()   ┌────────────────────┐  drain()  ┌────────────┐
//! │ GPIO ISR ×3  │───────────▶│ Mutex<Cell<bool>>×3│──────────▶│ run_pass   │
//! │ (falling)    │             │   (critical sect.) │           │ (arbiter)  │
//! └──────────────┘             └────────────────────┘           └────────────┘
//! ```

use core::cell::Cell;

use critical_section::Mutex;
use serde::Serialize;

/// One of the three operator buttons.  Discriminants give the fixed
/// resolution priority (lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Button {
    RedMode = 0,
    BlinkAll = 1,
    ToggleCycle = 2,
}

impl Button {
    pub const COUNT: usize = 3;

    /// Priority order used when several intents are drained together.
    pub const PRIORITY: [Self; Self::COUNT] = [Self::RedMode, Self::BlinkAll, Self::ToggleCycle];

    pub fn name(self) -> &'static str {
        match self {
            Self::RedMode => "red-mode",
            Self::BlinkAll => "blink-all",
            Self::ToggleCycle => "toggle-cycle",
        }
    }
}

/// Snapshot of the latches taken by [`IntentLatches::drain`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingIntents {
    pub red_mode: bool,
    pub blink_all: bool,
    pub toggle_cycle: bool,
}

impl PendingIntents {
    pub fn is_empty(&self) -> bool {
        !(self.red_mode || self.blink_all || self.toggle_cycle)
    }

    pub fn contains(&self, button: Button) -> bool {
        match button {
            Button::RedMode => self.red_mode,
            Button::BlinkAll => self.blink_all,
            Button::ToggleCycle => self.toggle_cycle,
        }
    }

    pub fn insert(&mut self, button: Button) {
        match button {
            Button::RedMode => self.red_mode = true,
            Button::BlinkAll => self.blink_all = true,
            Button::ToggleCycle => self.toggle_cycle = true,
        }
    }

    /// Set intents in priority order.
    pub fn iter(&self) -> impl Iterator<Item = Button> + '_ {
        Button::PRIORITY.into_iter().filter(|b| self.contains(*b))
    }
}

/// The only state shared with interrupt context.
pub struct IntentLatches {
    flags: [Mutex<Cell<bool>>; Button::COUNT],
}

impl Default for IntentLatches {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentLatches {
    pub const fn new() -> Self {
        Self {
            flags: [
                Mutex::new(Cell::new(false)),
                Mutex::new(Cell::new(false)),
                Mutex::new(Cell::new(false)),
            ],
        }
    }

    /// Record a press.  ISR-safe; does nothing else.
    pub fn latch(&self, button: Button) {
        critical_section::with(|cs| self.flags[button as usize].borrow(cs).set(true));
    }

    /// Read and clear all three flags in one critical section.
    pub fn drain(&self) -> PendingIntents {
        critical_section::with(|cs| {
            let mut pending = PendingIntents::default();
            for button in Button::PRIORITY {
                if self.flags[button as usize].borrow(cs).replace(false) {
                    pending.insert(button);
                }
            }
            pending
        })
    }
}

/// Latches written by the GPIO ISRs.
pub static LATCHES: IntentLatches = IntentLatches::new();

// ── ISR entry points ──────────────────────────────────────────

pub fn on_red_mode_edge() {
    LATCHES.latch(Button::RedMode);
}

pub fn on_blink_all_edge() {
    LATCHES.latch(Button::BlinkAll);
}

pub fn on_toggle_cycle_edge() {
    LATCHES.latch(Button::ToggleCycle);
}
