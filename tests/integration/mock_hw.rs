//! Mock pins and console for integration tests.
//!
//! Records every port call so tests can assert on the full history
//! without touching real GPIO/PWM/UART registers.  [`TestRig`] bundles a
//! controller with the mocks and steps it through synthetic time.

use std::collections::VecDeque;

use trafficlight::adapters::serial::render_event;
use trafficlight::app::events::AppEvent;
use trafficlight::app::ports::{EventSink, Line, LineOverflow, LinePort, PinMode, PinPort};
use trafficlight::app::service::Controller;
use trafficlight::config::ControllerConfig;
use trafficlight::fsm::Phase;
use trafficlight::fsm::context::{Lamp, LightState};
use trafficlight::intents::{Button, IntentLatches};
use trafficlight::status::StatusReport;

// ── Pin call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCall {
    Mode { pin: i32, mode: PinMode },
    Level { pin: i32, level: u8 },
}

// ── MockPins ──────────────────────────────────────────────────

pub struct MockPins {
    pub calls: Vec<PinCall>,
    levels: [u8; 32],
    /// Raw potentiometer reading returned by `read_analog`.
    pub pot: u16,
    /// Digital level returned for every input (pull-up idle = high).
    pub inputs_high: bool,
}

#[allow(dead_code)]
impl MockPins {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            levels: [0; 32],
            pot: 1023,
            inputs_high: true,
        }
    }

    /// Last level written to `pin`.
    pub fn level(&self, pin: i32) -> u8 {
        self.levels[pin as usize]
    }

    pub fn lamp_level(&self, lamp: Lamp) -> u8 {
        self.level(lamp.pin())
    }

    /// Lamps currently driven above zero.
    pub fn lit_lamps(&self) -> usize {
        Lamp::ALL.iter().filter(|l| self.lamp_level(**l) > 0).count()
    }

    pub fn mode_of(&self, pin: i32) -> Option<PinMode> {
        self.calls.iter().rev().find_map(|c| match c {
            PinCall::Mode { pin: p, mode } if *p == pin => Some(*mode),
            _ => None,
        })
    }
}

impl Default for MockPins {
    fn default() -> Self {
        Self::new()
    }
}

impl PinPort for MockPins {
    fn set_pin_mode(&mut self, pin: i32, mode: PinMode) {
        self.calls.push(PinCall::Mode { pin, mode });
    }

    fn set_output_level(&mut self, pin: i32, level: u8) {
        self.levels[pin as usize] = level;
        self.calls.push(PinCall::Level { pin, level });
    }

    fn read_digital(&mut self, _pin: i32) -> bool {
        self.inputs_high
    }

    fn read_analog(&mut self, _pin: i32) -> u16 {
        self.pot
    }
}

// ── MockConsole ───────────────────────────────────────────────

/// Line console that records both the structured events and the lines
/// they render to on the wire.
pub struct MockConsole {
    inbox: VecDeque<Result<Line, LineOverflow>>,
    pub events: Vec<AppEvent>,
    pub written: Vec<String>,
}

#[allow(dead_code)]
impl MockConsole {
    pub fn new() -> Self {
        Self {
            inbox: VecDeque::new(),
            events: Vec::new(),
            written: Vec::new(),
        }
    }

    /// Queue one inbound line; lines that do not fit arrive as overflow.
    pub fn send(&mut self, text: &str) {
        let mut line = Line::new();
        let queued = match line.push_str(text) {
            Ok(()) => Ok(line),
            Err(()) => Err(LineOverflow),
        };
        self.inbox.push_back(queued);
    }

    pub fn statuses(&self) -> Vec<StatusReport> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Status(report) => Some(*report),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.written.clear();
    }
}

impl Default for MockConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl LinePort for MockConsole {
    fn poll_line(&mut self) -> Option<Result<Line, LineOverflow>> {
        self.inbox.pop_front()
    }

    fn write_line(&mut self, line: &str) {
        self.written.push(line.to_string());
    }
}

impl EventSink for MockConsole {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
        render_event(event, |line| self.written.push(line.to_string()));
    }
}

// ── TestRig ───────────────────────────────────────────────────

/// A started controller plus its mocks, driven by synthetic time.
pub struct TestRig {
    pub ctl: Controller,
    pub latches: IntentLatches,
    pub pins: MockPins,
    pub console: MockConsole,
    pub now: u32,
    /// `(time, phase, lights)` whenever either changed after a pass.
    pub trace: Vec<(u32, Option<Phase>, LightState)>,
}

#[allow(dead_code)]
impl TestRig {
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        let mut ctl = Controller::new(config).expect("valid config");
        let mut pins = MockPins::new();
        let mut console = MockConsole::new();
        ctl.start(0, &mut pins, &mut console);
        Self {
            ctl,
            latches: IntentLatches::new(),
            pins,
            console,
            now: 0,
            trace: Vec::new(),
        }
    }

    /// One control pass at the current time.
    pub fn pass(&mut self) {
        self.ctl
            .run_pass(self.now, &self.latches, &mut self.pins, &mut self.console);

        let snapshot = (self.now, self.ctl.phase(), self.ctl.lights());
        let changed = self
            .trace
            .last()
            .is_none_or(|last| (last.1, last.2) != (snapshot.1, snapshot.2));
        if changed {
            self.trace.push(snapshot);
        }

        let modes = self.ctl.modes();
        assert!(modes.is_consistent(), "inconsistent modes {:?}", modes);
        if !modes.blink_all {
            assert!(
                self.ctl.lights().lit_count() <= 1,
                "lamps not exclusive at {}: {:?}",
                self.now,
                self.ctl.lights()
            );
            assert!(self.pins.lit_lamps() <= 1, "more than one lamp driven at {}", self.now);
        }
    }

    /// Run a pass at every armed deadline up to and including `until`,
    /// then leave the clock at `until`.
    pub fn run_until(&mut self, until: u32) {
        self.pass();
        while let Some(next) = self.ctl.next_deadline(self.now) {
            if next > until {
                break;
            }
            self.now = next;
            self.pass();
        }
        self.now = until;
    }

    /// Latch a press and run the pass that consumes it.
    pub fn press(&mut self, button: Button) {
        self.latches.latch(button);
        self.pass();
    }

    /// Times at which `phase` was entered.
    pub fn entries(&self, phase: Phase) -> Vec<u32> {
        let mut out = Vec::new();
        let mut prev = None;
        for (t, p, _) in &self.trace {
            if *p == Some(phase) && prev != Some(phase) {
                out.push(*t);
            }
            prev = *p;
        }
        out
    }
}
