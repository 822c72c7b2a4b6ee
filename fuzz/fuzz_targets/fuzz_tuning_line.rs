//! Fuzz target: `parse_durations`
//!
//! Drives arbitrary text into the tuning-line parser and asserts that it
//! never panics and only accepts durations the scheduler clock can hold.
//!
//! cargo fuzz run fuzz_tuning_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use trafficlight::scheduler::MAX_DELAY_MS;
use trafficlight::tuning::parse_durations;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);

    if let Ok(d) = parse_durations(&line) {
        for ms in [d.red_ms, d.yellow_ms, d.green_ms] {
            assert!((1..=MAX_DELAY_MS).contains(&ms));
        }
        // Re-rendering an accepted line must parse to the same durations.
        let again = format!("{},{},{}", d.red_ms, d.yellow_ms, d.green_ms);
        assert_eq!(parse_durations(&again), Ok(d));
    }
});
