//! Fuzz target: `LineAssembler::push`
//!
//! Feeds arbitrary serial bytes through the console line assembler and
//! checks that completed lines always fit the buffer and never carry the
//! terminators.
//!
//! cargo fuzz run fuzz_line_assembler

#![no_main]

use libfuzzer_sys::fuzz_target;
use trafficlight::adapters::serial::LineAssembler;
use trafficlight::app::ports::LINE_CAPACITY;
use trafficlight::tuning::parse_durations;

fuzz_target!(|data: &[u8]| {
    let mut assembler = LineAssembler::new();

    for &byte in data {
        if let Some(Ok(line)) = assembler.push(byte) {
            assert!(line.len() <= LINE_CAPACITY);
            assert!(!line.contains('\n') && !line.contains('\r'));
            let _ = parse_durations(&line);
        }
    }
});
