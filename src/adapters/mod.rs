//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `hardware` | PinPort            | ESP32 LEDC, ADC, GPIO    |
//! | `log_sink` | EventSink          | ESP-IDF log output       |
//! | `serial`   | LinePort           | UART console             |
//! |            | EventSink          | Status / tuning lines    |
//! | `time`     | (clock)            | ESP32 system timer       |

pub mod hardware;
pub mod log_sink;
pub mod serial;
pub mod time;
