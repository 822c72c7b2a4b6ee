//! Controller service: the hexagonal core.
//!
//! [`Controller`] owns the registry, the phase table, the arbiter, and the
//! single `ControllerState` aggregate.  It exposes a hardware-agnostic API;
//! all I/O flows through port traits injected at call sites, so the whole
//! control pass runs under test with mock adapters and synthetic time.
//!
//! ```text
//!  IntentLatches ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                    │          Controller          │
//!  PinPort ◀───────▶ │ Arbiter · Scheduler · Phases │ ◀── LinePort
//!                    └──────────────────────────────┘
//! ```
//!
//! One control pass:
//!
//! 1. drain the button latches and resolve intents (status after any press)
//! 2. tick the registry and dispatch every fired action
//! 3. re-derive lamp brightness from the potentiometer
//! 4. poll one tuning line from the console

use log::{debug, info, warn};

use crate::arbiter::{self, Arbiter, Transition};
use crate::config::ControllerConfig;
use crate::error::{Result, TuningError};
use crate::fsm::context::{ControllerState, Lamp, LightState, ModeFlags, PhaseDurations};
use crate::fsm::{Phase, Sequencer};
use crate::intents::{Button, IntentLatches};
use crate::pins;
use crate::scheduler::{Fired, Repeat, Scheduler, TaskId, TaskSpec};
use crate::status::{StatusReport, brightness_from_adc};
use crate::tuning;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{EventSink, LinePort, PinMode, PinPort};

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// The controller orchestrates all domain logic.
pub struct Controller {
    config: ControllerConfig,
    state: ControllerState,
    sched: Scheduler,
    seq: Sequencer,
    arbiter: Arbiter,
    /// Last brightness derived from the potentiometer.
    brightness: u8,
}

impl Controller {
    /// Validate `config`, build the phase table and register every action.
    ///
    /// Does **not** arm anything: call [`start`](Self::start) next.
    pub fn new(config: ControllerConfig) -> Result<Self> {
        config.validate()?;

        let mut sched = Scheduler::new();
        for spec in task_specs(&config) {
            sched.register(spec);
        }

        Ok(Self {
            state: ControllerState::new(&config),
            sched,
            seq: Sequencer::new(),
            arbiter: Arbiter::new(&config),
            brightness: config.full_scale_level,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Configure the pins, clear the registry, and start the cycle at RED
    /// with the status report running.
    pub fn start(&mut self, now_ms: u32, pins: &mut impl PinPort, sink: &mut impl EventSink) {
        for lamp in Lamp::ALL {
            pins.set_pin_mode(lamp.pin(), PinMode::Output);
            pins.set_output_level(lamp.pin(), 0);
        }
        pins.set_pin_mode(pins::POT_ADC_GPIO, PinMode::Analog);
        for (button, pin) in BUTTON_PINS {
            pins.set_pin_mode(pin, PinMode::InputPullUp);
            // Active low: a low level at boot means held or shorted.
            if !pins.read_digital(pin) {
                warn!("Button {} (GPIO {}) reads pressed at boot", button.name(), pin);
            }
        }

        self.sched.disable_all();
        self.state.modes = ModeFlags::default();
        self.state.lights = LightState::all_off();
        self.state.phase = None;
        self.state.blink_all_on = false;

        self.seq.start(&mut self.sched, now_ms);
        self.sched.enable(TaskId::SendStatus, now_ms);

        info!(
            "Controller started: red={} ms yellow={} ms green={} ms",
            self.state.durations.red_ms, self.state.durations.yellow_ms, self.state.durations.green_ms
        );
        sink.emit(&AppEvent::Started(self.state.durations));
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run one control pass at time `now_ms`.
    ///
    /// The `console` parameter satisfies **both** [`LinePort`] and
    /// [`EventSink`], so tuning input and outbound events share one
    /// serial adapter without a double mutable borrow.
    pub fn run_pass(
        &mut self,
        now_ms: u32,
        latches: &IntentLatches,
        pins: &mut impl PinPort,
        console: &mut (impl LinePort + EventSink),
    ) {
        // 1. Button intents
        let drained = latches.drain();
        let pressed = !drained.is_empty();
        let pending = self.arbiter.debounce(drained, now_ms);
        for button in pending.iter() {
            info!("Button {} pressed", button.name());
            self.handle_command(AppCommand::Press(button), now_ms, pins, console);
        }
        // Every resolution is reported, including ignored and bounced presses.
        if pressed {
            self.emit_status(pins, console);
        }

        // 2. Timed actions
        for fired in self.sched.tick(now_ms) {
            if !self.sched.is_current(&fired) {
                debug!("Controller: '{}' superseded this pass", fired.id.name());
                continue;
            }
            self.dispatch(fired, now_ms, pins, console);
        }

        // 3. Brightness
        self.refresh_brightness(pins);

        // 4. Tuning input
        self.poll_tuning(now_ms, pins, console);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an inbound command and report its outcome to `sink`.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u32,
        pins: &mut impl PinPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Press(button) => {
                let outcome = arbiter::apply_intent(
                    button,
                    now_ms,
                    &mut self.state,
                    &mut self.sched,
                    &self.seq,
                    pins,
                    &self.config,
                );
                match outcome {
                    Transition::Applied { from, to } => {
                        sink.emit(&AppEvent::ModeChanged { button, from, to });
                    }
                    Transition::Ignored(reason) => {
                        sink.emit(&AppEvent::IntentIgnored { button, reason });
                    }
                }
            }
            AppCommand::ApplyDurations(durations) => {
                tuning::apply_durations(durations, &mut self.state, &mut self.sched, now_ms);
                sink.emit(&AppEvent::TuningApplied(durations));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Earliest armed deadline, for deterministic time stepping.
    pub fn next_deadline(&self, now_ms: u32) -> Option<u32> {
        self.sched.next_due(now_ms)
    }

    pub fn modes(&self) -> ModeFlags {
        self.state.modes
    }

    pub fn lights(&self) -> LightState {
        self.state.lights
    }

    pub fn durations(&self) -> PhaseDurations {
        self.state.durations
    }

    pub fn phase(&self) -> Option<Phase> {
        self.state.phase
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Read-only view of the registry.
    pub fn scheduler(&self) -> &Scheduler {
        &self.sched
    }

    // ── Internal ──────────────────────────────────────────────

    fn dispatch(
        &mut self,
        fired: Fired,
        now_ms: u32,
        pins: &mut impl PinPort,
        sink: &mut impl EventSink,
    ) {
        match fired.id {
            TaskId::BlinkAll => {
                let level = self.read_brightness(pins);
                arbiter::on_blink_all_fired(&mut self.state, pins, level);
            }
            TaskId::SendStatus => self.emit_status(pins, sink),
            id => {
                if let Some(phase) = Phase::from_task(id) {
                    self.seq.on_fired(
                        phase,
                        now_ms,
                        &mut self.state,
                        &mut self.sched,
                        pins,
                        &self.config,
                    );
                }
            }
        }
    }

    fn read_brightness(&mut self, pins: &mut impl PinPort) -> u8 {
        let raw = pins.read_analog(pins::POT_ADC_GPIO);
        self.brightness = brightness_from_adc(raw, self.config.adc_max, self.config.full_scale_level);
        self.brightness
    }

    /// Rescale the lit lamps to the potentiometer.  Blink-all keeps the
    /// level it latched at its last toggle; emergency red stays at full scale.
    fn refresh_brightness(&mut self, pins: &mut impl PinPort) {
        if self.state.modes.blink_all {
            return;
        }
        let level = self.read_brightness(pins);
        for lamp in Lamp::ALL {
            if !self.state.lights.is_on(lamp) {
                continue;
            }
            let out = if self.state.modes.red_mode && lamp == Lamp::Red {
                self.config.full_scale_level
            } else {
                level
            };
            pins.set_output_level(lamp.pin(), out);
        }
    }

    fn emit_status(&mut self, pins: &mut impl PinPort, sink: &mut impl EventSink) {
        let level = self.read_brightness(pins);
        sink.emit(&AppEvent::Status(StatusReport::capture(&self.state, level)));
    }

    fn poll_tuning(
        &mut self,
        now_ms: u32,
        pins: &mut impl PinPort,
        console: &mut (impl LinePort + EventSink),
    ) {
        let line = match console.poll_line() {
            None => return,
            Some(Ok(line)) => line,
            Some(Err(_)) => {
                warn!("Tuning line rejected: {}", TuningError::LineTooLong);
                console.emit(&AppEvent::TuningRejected(TuningError::LineTooLong));
                return;
            }
        };
        if line.trim().is_empty() {
            return;
        }

        console.emit(&AppEvent::TuningReceived(line.clone()));
        match tuning::parse_durations(&line) {
            Ok(durations) => {
                self.handle_command(AppCommand::ApplyDurations(durations), now_ms, pins, console);
            }
            Err(e) => {
                warn!("Tuning line rejected: {}", e);
                console.emit(&AppEvent::TuningRejected(e));
            }
        }
    }
}

/// Buttons and their input pins, in priority order.
const BUTTON_PINS: [(Button, i32); Button::COUNT] = [
    (Button::RedMode, pins::BUTTON_RED_MODE_GPIO),
    (Button::BlinkAll, pins::BUTTON_BLINK_ALL_GPIO),
    (Button::ToggleCycle, pins::BUTTON_TOGGLE_CYCLE_GPIO),
];

/// Registration table for every timed action.
fn task_specs(config: &ControllerConfig) -> [TaskSpec; TaskId::COUNT] {
    let once = |id, interval_ms| TaskSpec {
        id,
        interval_ms,
        repeat: Repeat::Once,
    };
    [
        once(TaskId::Red, config.red_ms),
        once(TaskId::YellowAfterRed, config.yellow_ms),
        once(TaskId::Green, config.green_ms),
        TaskSpec {
            id: TaskId::BlinkGreen,
            interval_ms: config.blink_interval_ms,
            repeat: Repeat::Times(config.blink_toggles),
        },
        once(TaskId::YellowAfterBlink, config.yellow_ms),
        TaskSpec {
            id: TaskId::BlinkAll,
            interval_ms: config.blink_all_interval_ms,
            repeat: Repeat::Forever,
        },
        TaskSpec {
            id: TaskId::SendStatus,
            interval_ms: config.status_interval_ms,
            repeat: Repeat::Forever,
        },
    ]
}
