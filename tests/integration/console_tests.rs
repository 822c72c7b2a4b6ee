//! Integration tests for the serial tuning channel and status output.

use super::mock_hw::{MockConsole, MockPins, TestRig};

use trafficlight::adapters::hardware::HardwareAdapter;
use trafficlight::adapters::serial::SerialConsole;
use trafficlight::app::events::AppEvent;
use trafficlight::app::service::Controller;
use trafficlight::config::ControllerConfig;
use trafficlight::error::{DurationField, TuningError};
use trafficlight::fsm::Phase;
use trafficlight::fsm::context::{Lamp, PhaseDurations};
use trafficlight::intents::{Button, IntentLatches};
use trafficlight::scheduler::TaskId;

const TUNED: PhaseDurations = PhaseDurations {
    red_ms: 100,
    yellow_ms: 200,
    green_ms: 300,
};

fn rejected(rig: &TestRig) -> Vec<TuningError> {
    rig.console
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::TuningRejected(err) => Some(*err),
            _ => None,
        })
        .collect()
}

// ── Accepted lines ────────────────────────────────────────────

#[test]
fn tuning_rearms_an_armed_red_immediately() {
    let mut rig = TestRig::new();
    // Inside YELLOW after the blink: RED is armed for 6998.
    rig.run_until(6600);
    assert_eq!(rig.ctl.phase(), Some(Phase::YellowFromBlink));
    assert_eq!(rig.ctl.scheduler().due(TaskId::Red), Some(6998));
    rig.console.clear();

    rig.console.send("100,200,300");
    rig.pass();

    assert_eq!(rig.ctl.durations(), TUNED);
    assert_eq!(rig.ctl.scheduler().due(TaskId::Red), Some(6600));
    assert_eq!(rig.ctl.scheduler().interval(TaskId::Green), Some(300));
    assert_eq!(
        rig.console.written,
        vec![
            "Received data: 100,200,300",
            "updated!",
            "Red Time: 100",
            "Yellow Time: 200",
            "Green Time: 300",
        ]
    );

    // The next cycle runs on the new durations.
    rig.run_until(10_000);
    assert_eq!(rig.entries(Phase::Red)[1..], [6600, 6600 + 100 + 200 + 300 + 1998 + 200]);
    assert_eq!(rig.entries(Phase::YellowFromRed).last(), Some(&6700));
}

#[test]
fn tuning_during_red_shortens_the_pending_yellow() {
    let mut rig = TestRig::new();
    rig.run_until(1000);
    assert_eq!(rig.ctl.scheduler().due(TaskId::YellowAfterRed), Some(2000));

    rig.console.send(" 100 , 200 , 300 ");
    rig.pass();

    assert_eq!(rig.ctl.durations(), TUNED);
    assert_eq!(rig.ctl.scheduler().due(TaskId::YellowAfterRed), Some(1000));
    // RED itself is not armed, so it is left alone.
    assert!(!rig.ctl.scheduler().is_enabled(TaskId::Red));

    rig.pass();
    assert_eq!(rig.ctl.phase(), Some(Phase::YellowFromRed));
    assert_eq!(rig.ctl.scheduler().due(TaskId::Green), Some(1200));
}

#[test]
fn tuning_under_red_mode_applies_on_exit() {
    let mut rig = TestRig::new();
    rig.press(Button::RedMode);

    rig.now = 500;
    rig.console.send("100,200,300");
    rig.pass();
    assert_eq!(rig.ctl.durations(), TUNED);
    assert_eq!(rig.ctl.phase(), None);
    assert!(!rig.ctl.scheduler().is_enabled(TaskId::Red));

    rig.now = 1000;
    rig.press(Button::RedMode);
    assert_eq!(rig.ctl.phase(), Some(Phase::Red));
    assert_eq!(rig.ctl.scheduler().due(TaskId::YellowAfterRed), Some(1100));
}

// ── Rejected lines ────────────────────────────────────────────

#[test]
fn malformed_line_leaves_everything_untouched() {
    let mut rig = TestRig::new();
    rig.run_until(1000);
    let before = rig.ctl.durations();
    rig.console.clear();

    rig.console.send("abc");
    rig.pass();

    assert_eq!(rig.ctl.durations(), before);
    assert_eq!(rig.ctl.scheduler().due(TaskId::YellowAfterRed), Some(2000));
    assert_eq!(rejected(&rig), vec![TuningError::FieldCount(1)]);
    assert_eq!(
        rig.console.written,
        vec!["Received data: abc", "Failed to parse data: expected 3 fields, got 1"]
    );
}

#[test]
fn zero_and_non_numeric_fields_are_reported_by_name() {
    let mut rig = TestRig::new();

    rig.console.send("1000,0,1000");
    rig.pass();
    rig.console.send("1000,500,-3");
    rig.pass();

    assert_eq!(
        rejected(&rig),
        vec![
            TuningError::ZeroDuration(DurationField::Yellow),
            TuningError::InvalidNumber(DurationField::Green),
        ]
    );
    assert!(rig
        .console
        .written
        .contains(&"Failed to parse data: yellow time must be > 0".to_string()));
    assert_eq!(rig.ctl.durations(), PhaseDurations::from_config(rig.ctl.config()));
}

#[test]
fn durations_past_the_clock_range_are_rejected() {
    let mut rig = TestRig::new();
    rig.run_until(1000);
    rig.console.clear();

    rig.console.send("3000000000,500,2000");
    rig.pass();

    assert_eq!(
        rejected(&rig),
        vec![TuningError::DurationTooLong(DurationField::Red)]
    );
    assert!(rig
        .console
        .written
        .contains(&"Failed to parse data: red time is too long".to_string()));
    assert_eq!(rig.ctl.durations(), PhaseDurations::from_config(rig.ctl.config()));

    // RED keeps its configured hold.
    rig.run_until(7100);
    assert_eq!(rig.entries(Phase::Red), vec![0, 6998]);
    assert_eq!(rig.ctl.phase(), Some(Phase::Red));
}

#[test]
fn overlong_line_is_rejected_without_echo() {
    let mut rig = TestRig::new();
    rig.console.clear();

    rig.console.send(&"9".repeat(80));
    rig.pass();

    assert_eq!(rejected(&rig), vec![TuningError::LineTooLong]);
    assert!(!rig.console.written.iter().any(|l| l.starts_with("Received data")));
    assert!(rig
        .console
        .written
        .contains(&"Failed to parse data: line too long".to_string()));
}

#[test]
fn blank_lines_are_ignored() {
    let mut rig = TestRig::new();
    rig.pass();
    rig.console.clear();

    rig.console.send("   ");
    rig.pass();

    assert!(rig.console.events.is_empty());
}

// ── Adapters end to end ───────────────────────────────────────

#[test]
fn serial_console_carries_tuning_and_status_over_the_wire() {
    let mut ctl = Controller::new(ControllerConfig::default()).expect("valid config");
    let latches = IntentLatches::new();
    let mut hw = HardwareAdapter::new();
    let mut console = SerialConsole::new(9600).expect("sim console");

    ctl.start(0, &mut hw, &mut console);
    ctl.run_pass(0, &latches, &mut hw, &mut console);
    assert_eq!(console.take_output(), vec!["0,0,1,1,0,0,255".to_string()]);
    assert_eq!(hw.lamps().level(Lamp::Red.pin()), Some(255));

    hw.set_sim_pot(0);
    console.feed("100,200,");
    ctl.run_pass(10, &latches, &mut hw, &mut console);
    assert!(console.take_output().is_empty(), "partial line must wait");
    assert_eq!(hw.lamps().level(Lamp::Red.pin()), Some(0));

    console.feed("300\r\n");
    ctl.run_pass(20, &latches, &mut hw, &mut console);
    assert_eq!(ctl.durations(), TUNED);
    assert_eq!(
        console.take_output(),
        vec![
            "Received data: 100,200,300".to_string(),
            "updated!".to_string(),
            "Red Time: 100".to_string(),
            "Yellow Time: 200".to_string(),
            "Green Time: 300".to_string(),
        ]
    );
}

#[test]
fn button_held_at_boot_still_starts_the_cycle() {
    let mut ctl = Controller::new(ControllerConfig::default()).expect("valid config");
    let mut pins = MockPins::new();
    pins.inputs_high = false;
    let mut console = MockConsole::new();

    ctl.start(0, &mut pins, &mut console);
    ctl.run_pass(0, &IntentLatches::new(), &mut pins, &mut console);

    assert_eq!(ctl.phase(), Some(Phase::Red));
}
