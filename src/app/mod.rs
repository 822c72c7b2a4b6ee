//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the registry, sequencer, arbiter and tuning channel
//! into the per-pass control loop.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
