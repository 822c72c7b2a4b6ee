//! Serial console adapter.
//!
//! Implements [`LinePort`] and [`EventSink`] over one UART:
//!
//! - inbound bytes are assembled into lines (`\n` terminated, `\r`
//!   dropped, at most [`LINE_CAPACITY`] bytes)
//! - status reports and tuning results are rendered as wire lines
//! - every event is also forwarded to the [`LogEventSink`]
//!
//! On ESP-IDF the UART is driven with raw `uart_*` sys calls at the
//! configured baud rate.  On host/test an in-memory inbox and outbox
//! stand in for the wire.

use core::fmt::Write as _;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, LINE_CAPACITY, Line, LineOverflow, LinePort};

use super::log_sink::LogEventSink;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Line assembler ────────────────────────────────────────────

/// Accumulates bytes until a line terminator.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Line,
    overflowed: bool,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte.  Returns a finished line (or its overflow) on `\n`.
    pub fn push(&mut self, byte: u8) -> Option<Result<Line, LineOverflow>> {
        match byte {
            b'\n' => {
                let line = core::mem::take(&mut self.buf);
                if core::mem::take(&mut self.overflowed) {
                    Some(Err(LineOverflow))
                } else {
                    Some(Ok(line))
                }
            }
            b'\r' => None,
            _ if self.overflowed => None,
            _ => {
                // Non-ASCII bytes cannot form a valid tuning line.
                let ch = if byte.is_ascii() { byte as char } else { '?' };
                if self.buf.push(ch).is_err() {
                    self.buf.clear();
                    self.overflowed = true;
                }
                None
            }
        }
    }
}

// ── Wire rendering ────────────────────────────────────────────

/// Render the wire-visible lines for `event`.  Events with no wire form
/// produce nothing.
pub fn render_event(event: &AppEvent, mut out: impl FnMut(&str)) {
    let mut line: heapless::String<{ LINE_CAPACITY + 32 }> = heapless::String::new();
    let mut emit = |args: core::fmt::Arguments<'_>| {
        line.clear();
        // Capacity covers the longest rendered line.
        let _ = line.write_fmt(args);
        out(line.as_str());
    };

    match event {
        AppEvent::Status(report) => emit(format_args!("{report}")),
        AppEvent::TuningReceived(data) => emit(format_args!("Received data: {data}")),
        AppEvent::TuningApplied(d) => {
            emit(format_args!("updated!"));
            emit(format_args!("Red Time: {}", d.red_ms));
            emit(format_args!("Yellow Time: {}", d.yellow_ms));
            emit(format_args!("Green Time: {}", d.green_ms));
        }
        AppEvent::TuningRejected(e) => emit(format_args!("Failed to parse data: {e}")),
        AppEvent::Started(_) | AppEvent::ModeChanged { .. } | AppEvent::IntentIgnored { .. } => {}
    }
}

// ── Console ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const CONSOLE_UART: uart_port_t = 1;

pub struct SerialConsole {
    assembler: LineAssembler,
    log: LogEventSink,
    #[cfg(not(target_os = "espidf"))]
    inbox: std::collections::VecDeque<u8>,
    #[cfg(not(target_os = "espidf"))]
    outbox: Vec<String>,
}

impl SerialConsole {
    /// Install the UART driver.
    #[cfg(target_os = "espidf")]
    pub fn new(baud: u32) -> Result<Self, crate::error::Error> {
        use crate::pins;

        let cfg = uart_config_t {
            baud_rate: baud as i32,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };
        // SAFETY: Called once from main() before the control loop.
        unsafe {
            if uart_param_config(CONSOLE_UART, &cfg) != ESP_OK as i32 {
                return Err(crate::error::Error::Init("uart config"));
            }
            if uart_set_pin(CONSOLE_UART, pins::UART_TX_GPIO, pins::UART_RX_GPIO, -1, -1) != ESP_OK as i32 {
                return Err(crate::error::Error::Init("uart pins"));
            }
            if uart_driver_install(CONSOLE_UART, 256, 256, 0, core::ptr::null_mut(), 0) != ESP_OK as i32 {
                return Err(crate::error::Error::Init("uart driver"));
            }
        }
        log::info!("Serial: UART{} at {} baud", CONSOLE_UART, baud);

        Ok(Self {
            assembler: LineAssembler::new(),
            log: LogEventSink::new(),
        })
    }

    /// In-memory console.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(baud: u32) -> Result<Self, crate::error::Error> {
        log::info!("Serial(sim): in-memory console ({} baud ignored)", baud);
        Ok(Self {
            assembler: LineAssembler::new(),
            log: LogEventSink::new(),
            inbox: std::collections::VecDeque::new(),
            outbox: Vec::new(),
        })
    }

    /// Queue inbound bytes as if they arrived on the wire.
    #[cfg(not(target_os = "espidf"))]
    pub fn feed(&mut self, text: &str) {
        self.inbox.extend(text.bytes());
    }

    /// Drain everything written so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn take_output(&mut self) -> Vec<String> {
        core::mem::take(&mut self.outbox)
    }

    #[cfg(target_os = "espidf")]
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = 0u8;
        // SAFETY: one-byte buffer, zero-tick wait: never blocks.
        let n = unsafe {
            uart_read_bytes(CONSOLE_UART, (&raw mut byte).cast(), 1, 0)
        };
        (n == 1).then_some(byte)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_byte(&mut self) -> Option<u8> {
        self.inbox.pop_front()
    }
}

impl LinePort for SerialConsole {
    fn poll_line(&mut self) -> Option<Result<Line, LineOverflow>> {
        while let Some(byte) = self.read_byte() {
            if let Some(done) = self.assembler.push(byte) {
                return Some(done);
            }
        }
        None
    }

    #[cfg(target_os = "espidf")]
    fn write_line(&mut self, line: &str) {
        // SAFETY: buffers outlive the calls; uart_write_bytes copies into
        // the driver's TX ring.
        unsafe {
            uart_write_bytes(CONSOLE_UART, line.as_ptr().cast(), line.len());
            uart_write_bytes(CONSOLE_UART, b"\r\n".as_ptr().cast(), 2);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_line(&mut self, line: &str) {
        self.outbox.push(line.to_owned());
    }
}

impl EventSink for SerialConsole {
    fn emit(&mut self, event: &AppEvent) {
        self.log.emit(event);
        let mut lines: heapless::Vec<heapless::String<{ LINE_CAPACITY + 32 }>, 4> =
            heapless::Vec::new();
        render_event(event, |l| {
            let mut owned = heapless::String::new();
            let _ = owned.push_str(l);
            let _ = lines.push(owned);
        });
        for line in &lines {
            self.write_line(line.as_str());
        }
    }
}
