//! Integration tests for the Controller → Sequencer → pins pipeline.
//!
//! Time is synthetic: the rig runs one pass at every armed deadline, so
//! phase entry times land exactly on the scheduled due times.

use super::mock_hw::TestRig;

use trafficlight::app::events::AppEvent;
use trafficlight::app::ports::PinMode;
use trafficlight::config::ControllerConfig;
use trafficlight::fsm::Phase;
use trafficlight::fsm::context::{Lamp, LightState, ModeFlags};
use trafficlight::intents::Button;
use trafficlight::pins;
use trafficlight::scheduler::TaskId;

fn cycle_ms(c: &ControllerConfig) -> u32 {
    c.red_ms + c.yellow_ms + c.green_ms + u32::from(c.blink_toggles) * c.blink_interval_ms + c.yellow_ms
}

fn no_light_action_armed(rig: &TestRig) -> bool {
    TaskId::ALL
        .iter()
        .filter(|id| id.is_light_action())
        .all(|id| !rig.ctl.scheduler().is_enabled(*id))
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_configures_pins_and_enters_red() {
    let mut rig = TestRig::new();

    for lamp in Lamp::ALL {
        assert_eq!(rig.pins.mode_of(lamp.pin()), Some(PinMode::Output));
    }
    assert_eq!(rig.pins.mode_of(pins::POT_ADC_GPIO), Some(PinMode::Analog));
    assert_eq!(
        rig.pins.mode_of(pins::BUTTON_TOGGLE_CYCLE_GPIO),
        Some(PinMode::InputPullUp)
    );
    assert_eq!(
        rig.console.events.first(),
        Some(&AppEvent::Started(rig.ctl.durations()))
    );

    rig.pass();

    assert_eq!(rig.ctl.phase(), Some(Phase::Red));
    assert_eq!(rig.ctl.lights(), LightState::only(Lamp::Red));
    assert_eq!(rig.pins.lamp_level(Lamp::Red), 255);
    assert_eq!(rig.pins.lamp_level(Lamp::Green), 0);
    assert_eq!(rig.ctl.scheduler().due(TaskId::YellowAfterRed), Some(2000));
    // Status runs in the same pass, after RED was entered.
    assert_eq!(rig.console.written, vec!["0,0,1,1,0,0,255".to_string()]);
}

// ── Normal cycle ──────────────────────────────────────────────

#[test]
fn cycle_visits_every_phase_with_exact_timing() {
    let config = ControllerConfig::default();
    let cycle = cycle_ms(&config);
    assert_eq!(cycle, 6998);

    let mut rig = TestRig::new();
    rig.run_until(2 * cycle);

    assert_eq!(rig.entries(Phase::Red), vec![0, cycle, 2 * cycle]);
    assert_eq!(rig.entries(Phase::YellowFromRed), vec![2000, cycle + 2000]);
    assert_eq!(rig.entries(Phase::Green), vec![2500, cycle + 2500]);
    assert_eq!(rig.entries(Phase::GreenBlink), vec![4500, cycle + 4500]);
    assert_eq!(rig.entries(Phase::YellowFromBlink), vec![6498, cycle + 6498]);
}

#[test]
fn green_blinks_three_times_and_ends_lit() {
    let mut rig = TestRig::new();
    rig.run_until(6497);

    let blink: Vec<(u32, bool)> = rig
        .trace
        .iter()
        .filter(|(_, phase, _)| *phase == Some(Phase::GreenBlink))
        .map(|(t, _, lights)| (*t, lights.green))
        .collect();

    let expected: Vec<(u32, bool)> = (0..6u32).map(|k| (4500 + k * 333, k % 2 == 1)).collect();
    assert_eq!(blink, expected);
    assert_eq!(rig.pins.lamp_level(Lamp::Green), 255);
}

#[test]
fn lamps_stay_exclusive_and_follow_the_pot() {
    let mut rig = TestRig::new();
    rig.pins.pot = 512;
    let cycle = cycle_ms(rig.ctl.config());

    // The rig asserts exclusivity after every pass.
    rig.run_until(3 * cycle);

    for (t, phase, lights) in &rig.trace {
        let expected = match phase {
            Some(Phase::GreenBlink) => lights.lit_count() <= 1,
            Some(_) => lights.lit_count() == 1,
            None => true,
        };
        assert!(expected, "bad lamp state at {}: {:?}", t, lights);
    }
    assert_eq!(rig.ctl.phase(), Some(Phase::Red));
    assert_eq!(rig.ctl.brightness(), 127);
    assert_eq!(rig.pins.lamp_level(Lamp::Red), 127);
}

// ── Emergency red ─────────────────────────────────────────────

#[test]
fn red_mode_twice_restores_the_running_cycle_at_red() {
    let mut rig = TestRig::new();
    rig.run_until(3000);
    assert_eq!(rig.ctl.phase(), Some(Phase::Green));

    rig.press(Button::RedMode);
    assert_eq!(
        rig.ctl.modes(),
        ModeFlags {
            red_mode: true,
            blink_all: false,
            cycle_running: false,
        }
    );
    assert_eq!(rig.ctl.lights(), LightState::only(Lamp::Red));
    assert_eq!(rig.ctl.phase(), None);
    assert_eq!(rig.pins.lamp_level(Lamp::Red), 255);
    assert_eq!(rig.pins.lamp_level(Lamp::Green), 0);
    assert!(no_light_action_armed(&rig));
    assert!(rig.ctl.scheduler().is_enabled(TaskId::SendStatus));

    // The armed blink would have fired at 4500; nothing may advance.
    rig.run_until(10_000);
    assert_eq!(rig.ctl.phase(), None);
    assert_eq!(rig.ctl.lights(), LightState::only(Lamp::Red));

    rig.press(Button::RedMode);
    assert_eq!(rig.ctl.modes(), ModeFlags::default());
    assert_eq!(rig.ctl.phase(), Some(Phase::Red));
    assert_eq!(rig.entries(Phase::Red).last(), Some(&10_000));
    assert_eq!(rig.ctl.scheduler().due(TaskId::YellowAfterRed), Some(12_000));
}

#[test]
fn red_mode_holds_full_scale_regardless_of_pot() {
    let mut rig = TestRig::new();
    rig.pins.pot = 100;
    rig.run_until(2100);

    rig.press(Button::RedMode);
    rig.run_until(5000);

    assert_eq!(rig.pins.lamp_level(Lamp::Red), 255);
    let last = rig.console.statuses().last().copied().expect("status");
    assert_eq!(last.to_string(), "1,0,0,1,0,0,24");
}

// ── Blink-all ─────────────────────────────────────────────────

#[test]
fn blink_all_mid_blink_leaves_no_stale_cycle_lamp() {
    let mut rig = TestRig::new();
    rig.run_until(5000);
    assert_eq!(rig.ctl.phase(), Some(Phase::GreenBlink));

    rig.press(Button::BlinkAll);
    let entered = rig.trace.len() - 1;
    assert!(rig.ctl.modes().blink_all);
    assert!(!rig.ctl.modes().cycle_running);
    for id in TaskId::ALL.iter().filter(|id| id.is_light_action()) {
        assert_eq!(
            rig.ctl.scheduler().is_enabled(*id),
            *id == TaskId::BlinkAll,
            "{}",
            id.name()
        );
    }
    // The blink-all action is armed for now and fires in the same pass.
    assert_eq!(rig.ctl.lights(), LightState::all(true));

    rig.run_until(9500);

    for (t, phase, lights) in &rig.trace[entered..] {
        assert_eq!(*phase, None, "cycle phase entered at {}", t);
        assert!(
            *lights == LightState::all(true) || *lights == LightState::all(false),
            "lamps out of step at {}: {:?}",
            t,
            lights
        );
    }
    // Toggles at 5000, 6000, 7000, 8000, 9000.
    assert_eq!(rig.trace.len() - entered, 5);
    let levels: Vec<u8> = Lamp::ALL.iter().map(|l| rig.pins.lamp_level(*l)).collect();
    assert_eq!(levels, vec![255, 255, 255]);

    rig.press(Button::BlinkAll);
    assert_eq!(rig.ctl.modes(), ModeFlags::default());
    assert_eq!(rig.ctl.phase(), Some(Phase::Red));
    assert!(!rig.ctl.scheduler().is_enabled(TaskId::BlinkAll));
}

#[test]
fn red_mode_cancels_blink_all() {
    let mut rig = TestRig::new();
    rig.run_until(1000);
    rig.press(Button::BlinkAll);

    rig.run_until(1500);
    rig.press(Button::RedMode);

    assert!(rig.ctl.modes().red_mode);
    assert!(!rig.ctl.modes().blink_all);
    assert!(!rig.ctl.scheduler().is_enabled(TaskId::BlinkAll));
    assert_eq!(rig.pins.lit_lamps(), 1);
    assert_eq!(rig.pins.lamp_level(Lamp::Red), 255);
}

// ── Cycle toggle ──────────────────────────────────────────────

#[test]
fn toggle_cycle_pauses_dark_and_restarts_at_red() {
    let mut rig = TestRig::new();
    rig.run_until(1000);

    rig.press(Button::ToggleCycle);
    assert!(!rig.ctl.modes().cycle_running);
    assert_eq!(rig.pins.lit_lamps(), 0);
    assert!(no_light_action_armed(&rig));
    assert_eq!(rig.console.written.last().map(String::as_str), Some("3,0,0,0,0,0,255"));

    rig.run_until(8000);
    assert_eq!(rig.ctl.phase(), None);

    rig.press(Button::ToggleCycle);
    assert!(rig.ctl.modes().cycle_running);
    assert_eq!(rig.ctl.phase(), Some(Phase::Red));
    assert_eq!(rig.entries(Phase::Red), vec![0, 8000]);
}

#[test]
fn cycle_toggle_under_override_is_ignored() {
    let mut rig = TestRig::new();
    rig.press(Button::RedMode);
    rig.console.clear();

    rig.now = 500;
    rig.press(Button::ToggleCycle);

    assert!(rig.ctl.modes().red_mode);
    assert!(!rig.ctl.modes().cycle_running);
    assert!(rig.console.events.iter().any(|e| matches!(
        e,
        AppEvent::IntentIgnored {
            button: Button::ToggleCycle,
            ..
        }
    )));
    // The ignored press is still reported, with the modes unchanged.
    let statuses = rig.console.statuses();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].to_string(), "1,0,0,1,0,0,255");
}

// ── Intent resolution ─────────────────────────────────────────

#[test]
fn same_pass_intents_resolve_in_priority_order() {
    let mut a = TestRig::new();
    a.latches.latch(Button::RedMode);
    a.latches.latch(Button::ToggleCycle);
    a.pass();

    let mut b = TestRig::new();
    b.latches.latch(Button::ToggleCycle);
    b.latches.latch(Button::RedMode);
    b.pass();

    let expected = ModeFlags {
        red_mode: true,
        blink_all: false,
        cycle_running: false,
    };
    assert_eq!(a.ctl.modes(), expected);
    assert_eq!(b.ctl.modes(), expected);
    assert_eq!(a.ctl.lights(), b.ctl.lights());
}

#[test]
fn repeated_latches_between_passes_coalesce() {
    let mut rig = TestRig::new();
    rig.latches.latch(Button::RedMode);
    rig.latches.latch(Button::RedMode);
    rig.latches.latch(Button::RedMode);
    rig.pass();

    assert!(rig.ctl.modes().red_mode);
}

#[test]
fn presses_inside_the_lockout_are_dropped() {
    let mut rig = TestRig::new();
    rig.now = 1000;
    rig.press(Button::RedMode);
    assert!(rig.ctl.modes().red_mode);

    rig.now = 1020;
    rig.console.clear();
    rig.press(Button::RedMode);
    assert!(rig.ctl.modes().red_mode, "bounce inside 50 ms must be dropped");
    assert_eq!(rig.console.statuses().len(), 1, "a bounced press still reports status");

    // Other buttons have their own window.
    rig.press(Button::BlinkAll);
    assert!(rig.ctl.modes().blink_all);

    rig.now = 1100;
    rig.press(Button::RedMode);
    assert!(rig.ctl.modes().red_mode);
}

// ── Status reporting ──────────────────────────────────────────

#[test]
fn status_runs_once_per_period_and_after_each_change() {
    let mut rig = TestRig::new();
    rig.run_until(5000);
    assert_eq!(rig.console.statuses().len(), 6);

    rig.now = 5200;
    rig.press(Button::ToggleCycle);
    assert_eq!(rig.console.statuses().len(), 7);

    // The period is not reset by a mode change.
    rig.run_until(6000);
    assert_eq!(rig.console.statuses().len(), 8);
}
