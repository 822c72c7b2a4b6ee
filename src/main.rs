//! Traffic-light firmware: main entry point.
//!
//! Hexagonal architecture with a fixed-rate cooperative control pass.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    SerialConsole         Esp32TimeAdapter     │
//! │  (PinPort)          (LinePort+EventSink)  (clock)              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  Arbiter · Scheduler · Phase table · Tuning            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  GPIO ISRs ──▶ IntentLatches (critical section)                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use trafficlight::adapters::hardware::HardwareAdapter;
use trafficlight::adapters::serial::SerialConsole;
use trafficlight::adapters::time::Esp32TimeAdapter;
use trafficlight::app::service::Controller;
use trafficlight::config::ControllerConfig;
use trafficlight::drivers::{hw_init, watchdog::Watchdog};
use trafficlight::intents::LATCHES;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  TrafficLight v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (defaults only, nothing persisted) ───
    let config = ControllerConfig::default();
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config: could not serialise ({})", e),
    }

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Without lamps there is nothing useful to do.
        error!("HAL init failed: {}", e);
        return Err(anyhow::anyhow!("peripheral init: {e}"));
    }
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}; buttons disabled", e);
    }
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 4. Adapters + controller ──────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut hw = HardwareAdapter::new();
    let mut console = SerialConsole::new(config.serial_baud)
        .map_err(|e| anyhow::anyhow!("serial console: {e}"))?;
    let pass_interval_ms = config.pass_interval_ms;

    let mut controller =
        Controller::new(config).map_err(|e| anyhow::anyhow!("controller: {e}"))?;
    controller.start(clock.now_ms(), &mut hw, &mut console);

    // ── 5. Control loop ───────────────────────────────────────
    info!("Entering control loop ({} ms per pass)", pass_interval_ms);
    loop {
        controller.run_pass(clock.now_ms(), &LATCHES, &mut hw, &mut console);
        watchdog.feed();
        // esp-idf-hal also provides the ISR-safe critical-section impl.
        esp_idf_hal::delay::FreeRtos::delay_ms(pass_interval_ms);
    }
}
