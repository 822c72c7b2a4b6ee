//! Port traits: the hexagonal boundary between the controller and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (pins, serial console, event sinks) implement these
//! traits.  The [`Controller`](super::service::Controller) consumes them
//! via generics, so the domain core never touches hardware directly.

use super::events::AppEvent;

/// Longest inbound console line, in bytes.
pub const LINE_CAPACITY: usize = 64;

/// One inbound console line.
pub type Line = heapless::String<LINE_CAPACITY>;

// ───────────────────────────────────────────────────────────────
// Pin port (driven adapter: domain ↔ GPIO / PWM / ADC)
// ───────────────────────────────────────────────────────────────

/// Electrical configuration of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// PWM-capable output (lamps).
    Output,
    /// Input with the internal pull-up enabled (buttons, active low).
    InputPullUp,
    /// Analog input (potentiometer).
    Analog,
}

/// Primitive pin capabilities the controller calls.
pub trait PinPort {
    fn set_pin_mode(&mut self, pin: i32, mode: PinMode);

    /// Drive an output at `level` (0 = off, 255 = full scale).
    fn set_output_level(&mut self, pin: i32, level: u8);

    /// Logic level of a digital input (`true` = high).
    fn read_digital(&mut self, pin: i32) -> bool;

    /// Raw analog reading, 0..=1023.
    fn read_analog(&mut self, pin: i32) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Line port (driven adapter: domain ↔ serial console)
// ───────────────────────────────────────────────────────────────

/// An inbound line longer than [`LINE_CAPACITY`] was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOverflow;

/// Line-buffered text console.
pub trait LinePort {
    /// Next complete inbound line, if one is ready.  Never blocks.
    fn poll_line(&mut self) -> Option<Result<Line, LineOverflow>>;

    /// Write one line (the adapter appends the terminator).
    fn write_line(&mut self, line: &str);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → console / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide how they are rendered.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
