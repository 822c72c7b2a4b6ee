//! Timer/task registry.
//!
//! Holds the fixed set of named timed actions the controller uses.  The
//! registry never runs callbacks itself: [`Scheduler::tick`] returns the
//! actions that came due, and the control pass dispatches them.  That keeps
//! every action free to re-arm or disable other actions without re-entering
//! the registry.
//!
//! ```text
//!  restart_delayed(id, d) ──▶ ┌───────────────────┐
//!  enable / disable       ──▶ │     Scheduler     │ ── tick(now) ──▶ [Fired; N]
//!  set_interval           ──▶ │ [TaskEntry; N]    │                     │
//!                             └───────────────────┘                     ▼
//!                                     ▲                       Controller::dispatch
//!                                     └──────── is_current(fired) ──────┘
//! ```
//!
//! Time is a wrapping `u32` millisecond counter.  Not interrupt-safe: the
//! registry is only driven from the control pass.

use log::{debug, info};

// ═══════════════════════════════════════════════════════════════
//  Task identity and policy
// ═══════════════════════════════════════════════════════════════

/// Every timed action the controller can arm.  Registration and firing
/// order follow the discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskId {
    Red = 0,
    YellowAfterRed = 1,
    Green = 2,
    BlinkGreen = 3,
    YellowAfterBlink = 4,
    BlinkAll = 5,
    SendStatus = 6,
}

impl TaskId {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Red,
        Self::YellowAfterRed,
        Self::Green,
        Self::BlinkGreen,
        Self::YellowAfterBlink,
        Self::BlinkAll,
        Self::SendStatus,
    ];

    /// Actions that drive the lamps.  A mode switch stops all of these;
    /// the status report keeps running.
    pub fn is_light_action(self) -> bool {
        !matches!(self, Self::SendStatus)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::YellowAfterRed => "yellow-after-red",
            Self::Green => "green",
            Self::BlinkGreen => "blink-green",
            Self::YellowAfterBlink => "yellow-after-blink",
            Self::BlinkAll => "blink-all",
            Self::SendStatus => "send-status",
        }
    }
}

/// How many times an armed action fires before it disables itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Once,
    Times(u8),
    Forever,
}

impl Repeat {
    fn initial_remaining(self) -> Option<u8> {
        match self {
            Self::Once => Some(1),
            Self::Times(n) => Some(n),
            Self::Forever => None,
        }
    }
}

/// Static description of an action, handed to [`Scheduler::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub id: TaskId,
    /// Period between consecutive firings of a repeating action.
    pub interval_ms: u32,
    pub repeat: Repeat,
}

/// One due action returned from [`Scheduler::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TaskId,
    generation: u32,
}

// ═══════════════════════════════════════════════════════════════
//  Registry
// ═══════════════════════════════════════════════════════════════

/// Internal bookkeeping for a registered action.
#[derive(Debug, Clone, Copy)]
struct TaskEntry {
    spec: TaskSpec,
    enabled: bool,
    /// Absolute due time of the next firing.
    due_ms: u32,
    /// Firings left for counted actions; `None` for `Forever`.
    remaining: Option<u8>,
    /// Bumped by every external enable/disable/restart.
    generation: u32,
}

pub struct Scheduler {
    tasks: [Option<TaskEntry>; TaskId::COUNT],
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Longest delay the wrapping clock can tell apart from an overdue one.
pub const MAX_DELAY_MS: u32 = (1 << 31) - 1;

/// `true` once `now` has reached `due` on the wrapping millisecond clock.
fn deadline_reached(now_ms: u32, due_ms: u32) -> bool {
    now_ms.wrapping_sub(due_ms) <= MAX_DELAY_MS
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: [None; TaskId::COUNT],
        }
    }

    /// Register (or re-register) an action.  It starts disabled.
    pub fn register(&mut self, spec: TaskSpec) {
        info!(
            "Scheduler: registered '{}' ({} ms, {:?})",
            spec.id.name(),
            spec.interval_ms,
            spec.repeat
        );
        self.tasks[spec.id as usize] = Some(TaskEntry {
            spec,
            enabled: false,
            due_ms: 0,
            remaining: spec.repeat.initial_remaining(),
            generation: 0,
        });
    }

    /// Arm an action to fire on the next pass, with its full repeat count.
    pub fn enable(&mut self, id: TaskId, now_ms: u32) {
        self.restart_delayed(id, now_ms, 0);
    }

    /// Disarm an action.  Pending firings are dropped.
    pub fn disable(&mut self, id: TaskId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.enabled = false;
            entry.generation = entry.generation.wrapping_add(1);
        }
    }

    /// Disarm every registered action.
    pub fn disable_all(&mut self) {
        self.disable_where(|_| true);
    }

    /// Disarm every registered action matching `pred`.
    pub fn disable_where(&mut self, pred: impl Fn(TaskId) -> bool) {
        for id in TaskId::ALL {
            if pred(id) {
                self.disable(id);
            }
        }
    }

    /// Re-arm an action to fire `delay_ms` from `now_ms`, whatever its
    /// current state.  Supersedes any pending firing and restores the
    /// full repeat count.
    pub fn restart_delayed(&mut self, id: TaskId, now_ms: u32, delay_ms: u32) {
        if let Some(entry) = self.entry_mut(id) {
            entry.enabled = true;
            entry.due_ms = now_ms.wrapping_add(delay_ms);
            entry.remaining = entry.spec.repeat.initial_remaining();
            entry.generation = entry.generation.wrapping_add(1);
            debug!("Scheduler: '{}' armed for +{} ms", id.name(), delay_ms);
        }
    }

    /// Change the period of a repeating action.  The pending firing keeps
    /// its due time; the new period applies from the next reschedule.
    pub fn set_interval(&mut self, id: TaskId, interval_ms: u32) {
        if let Some(entry) = self.entry_mut(id) {
            entry.spec.interval_ms = interval_ms;
        }
    }

    pub fn interval(&self, id: TaskId) -> Option<u32> {
        self.entry(id).map(|e| e.spec.interval_ms)
    }

    pub fn is_enabled(&self, id: TaskId) -> bool {
        self.entry(id).is_some_and(|e| e.enabled)
    }

    /// `true` while dispatching the final firing of a counted action.
    /// Always `false` for `Forever` actions.
    pub fn is_last_iteration(&self, id: TaskId) -> bool {
        self.entry(id).is_some_and(|e| e.remaining == Some(0))
    }

    /// Due time of an armed action.
    pub fn due(&self, id: TaskId) -> Option<u32> {
        self.entry(id).filter(|e| e.enabled).map(|e| e.due_ms)
    }

    /// Earliest due time across all armed actions, relative to `now_ms`.
    /// Overdue actions report `now_ms`.
    pub fn next_due(&self, now_ms: u32) -> Option<u32> {
        self.tasks
            .iter()
            .flatten()
            .filter(|e| e.enabled)
            .map(|e| {
                if deadline_reached(now_ms, e.due_ms) {
                    0
                } else {
                    e.due_ms.wrapping_sub(now_ms)
                }
            })
            .min()
            .map(|wait| now_ms.wrapping_add(wait))
    }

    /// Advance the registry to `now_ms`.
    ///
    /// Returns every armed action whose due time has passed, in
    /// registration order, each at most once.  Counted actions are
    /// decremented and auto-disabled when exhausted; repeating actions are
    /// rescheduled one period after their previous due time.
    pub fn tick(&mut self, now_ms: u32) -> heapless::Vec<Fired, { TaskId::COUNT }> {
        let mut fired = heapless::Vec::new();

        for entry in self.tasks.iter_mut().flatten() {
            if !entry.enabled || !deadline_reached(now_ms, entry.due_ms) {
                continue;
            }

            if let Some(remaining) = entry.remaining.as_mut() {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    entry.enabled = false;
                }
            }
            if entry.enabled {
                entry.due_ms = entry.due_ms.wrapping_add(entry.spec.interval_ms);
            }

            // Capacity equals the number of task slots, so this cannot fail.
            let _ = fired.push(Fired {
                id: entry.spec.id,
                generation: entry.generation,
            });
        }

        fired
    }

    /// `false` if the action was disabled or re-armed after `fired` was
    /// produced; such a firing must not be dispatched.
    pub fn is_current(&self, fired: &Fired) -> bool {
        self.entry(fired.id)
            .is_some_and(|e| e.generation == fired.generation)
    }

    // ── Internal ──────────────────────────────────────────────

    fn entry(&self, id: TaskId) -> Option<&TaskEntry> {
        self.tasks[id as usize].as_ref()
    }

    fn entry_mut(&mut self, id: TaskId) -> Option<&mut TaskEntry> {
        self.tasks[id as usize].as_mut()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
