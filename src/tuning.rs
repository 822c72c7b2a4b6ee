//! Runtime tuning channel.
//!
//! The console accepts one line of the form `<redMs>,<yellowMs>,<greenMs>`.
//! A valid line replaces the phase durations; anything else is reported
//! and ignored.

use log::info;

use crate::app::ports::LINE_CAPACITY;
use crate::error::{DurationField, TuningError};
use crate::fsm::context::{ControllerState, PhaseDurations};
use crate::scheduler::{MAX_DELAY_MS, Scheduler, TaskId};

/// Parse a tuning line.  Surrounding whitespace on the line and on each
/// field is ignored.
pub fn parse_durations(line: &str) -> Result<PhaseDurations, TuningError> {
    if line.len() > LINE_CAPACITY {
        return Err(TuningError::LineTooLong);
    }

    let line = line.trim();
    let count = line.split(',').count();
    if count != DurationField::ALL.len() {
        return Err(TuningError::FieldCount(count));
    }

    let mut values = [0u32; 3];
    for ((slot, field), text) in values
        .iter_mut()
        .zip(DurationField::ALL)
        .zip(line.split(','))
    {
        let value: u32 = text
            .trim()
            .parse()
            .map_err(|_| TuningError::InvalidNumber(field))?;
        if value == 0 {
            return Err(TuningError::ZeroDuration(field));
        }
        if value > MAX_DELAY_MS {
            return Err(TuningError::DurationTooLong(field));
        }
        *slot = value;
    }

    Ok(PhaseDurations {
        red_ms: values[0],
        yellow_ms: values[1],
        green_ms: values[2],
    })
}

/// Install new durations and make them take effect now.
///
/// The RED, YELLOW-after-RED and GREEN actions get the new intervals, and
/// whichever of them is currently armed is re-armed to fire immediately.
pub fn apply_durations(
    durations: PhaseDurations,
    state: &mut ControllerState,
    sched: &mut Scheduler,
    now_ms: u32,
) {
    state.durations = durations;

    let updates = [
        (TaskId::Red, durations.red_ms),
        (TaskId::YellowAfterRed, durations.yellow_ms),
        (TaskId::Green, durations.green_ms),
    ];
    for (id, interval_ms) in updates {
        sched.set_interval(id, interval_ms);
        if sched.is_enabled(id) {
            sched.restart_delayed(id, now_ms, 0);
        }
    }

    info!(
        "Tuning: red={} ms yellow={} ms green={} ms",
        durations.red_ms, durations.yellow_ms, durations.green_ms
    );
}
