//! Lamp driver, hardware initialisation, and the task watchdog.

pub mod hw_init;
pub mod lamp;
pub mod watchdog;
