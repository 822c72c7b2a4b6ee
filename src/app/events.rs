//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  The serial console turns
//! status reports and tuning results into wire lines; everything else is
//! informational.

use crate::error::TuningError;
use crate::fsm::context::{ModeFlags, PhaseDurations};
use crate::intents::Button;
use crate::status::StatusReport;

use super::ports::Line;

/// Structured events emitted by the controller core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started the cycle with these durations.
    Started(PhaseDurations),

    /// Periodic or intent-triggered status snapshot.
    Status(StatusReport),

    /// A button intent changed the operating mode.
    ModeChanged {
        button: Button,
        from: ModeFlags,
        to: ModeFlags,
    },

    /// A drained intent was dropped without changing any mode.
    IntentIgnored {
        button: Button,
        reason: &'static str,
    },

    /// A tuning line arrived on the console (echoed before parsing).
    TuningReceived(Line),

    /// New phase durations are in effect.
    TuningApplied(PhaseDurations),

    /// A tuning line was rejected; nothing changed.
    TuningRejected(TuningError),
}
