//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger.  The serial console forwards every event here as
//! well as rendering the wire-visible ones.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(d) => {
                info!(
                    "START | red={}ms yellow={}ms green={}ms",
                    d.red_ms, d.yellow_ms, d.green_ms
                );
            }
            AppEvent::Status(report) => {
                log::debug!("STATUS | {}", report);
            }
            AppEvent::ModeChanged { button, from, to } => {
                info!(
                    "MODE | {} : red={} blink={} cycle={} -> red={} blink={} cycle={}",
                    button.name(),
                    from.red_mode,
                    from.blink_all,
                    from.cycle_running,
                    to.red_mode,
                    to.blink_all,
                    to.cycle_running,
                );
            }
            AppEvent::IntentIgnored { button, reason } => {
                info!("MODE | {} ignored: {}", button.name(), reason);
            }
            AppEvent::TuningReceived(line) => {
                info!("TUNE | received '{}'", line);
            }
            AppEvent::TuningApplied(d) => {
                info!(
                    "TUNE | applied red={}ms yellow={}ms green={}ms",
                    d.red_ms, d.yellow_ms, d.green_ms
                );
            }
            AppEvent::TuningRejected(e) => {
                warn!("TUNE | rejected: {}", e);
            }
        }
    }
}
