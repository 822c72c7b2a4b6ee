//! Traffic-light controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod arbiter;
pub mod config;
pub mod error;
pub mod fsm;
pub mod intents;
pub mod pins;
pub mod scheduler;
pub mod status;
pub mod tuning;

// The ESP-IDF-only modules compile on the host too; the real
// implementations are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
