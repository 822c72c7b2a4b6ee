//! Inbound commands to the controller.
//!
//! These are the actions the outside world (button latches, serial
//! console) can request.  The [`Controller`](super::service::Controller)
//! interprets them against the current mode.

use crate::fsm::context::PhaseDurations;
use crate::intents::Button;

/// Commands that adapters can send into the controller core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// A drained button intent.
    Press(Button),

    /// Replace the phase durations and re-arm the affected phases.
    ApplyDurations(PhaseDurations),
}
