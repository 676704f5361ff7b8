//! Fuzz target: mirrored row parsers
//!
//! Feeds arbitrary text to `split_line` and the three stream parsers and
//! verifies:
//! - No panics under arbitrary input
//! - Any state row that parses re-encodes to a line that parses back to
//!   the same snapshot
//!
//! cargo fuzz run fuzz_row_parser

#![no_main]

use fridgesim::history::HistoryRecord;
use fridgesim::history::rows::{parse_pressure, parse_state, parse_status, split_line};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let fields = split_line(line);

    if let Ok(state) = parse_state(&fields) {
        let again = HistoryRecord::State(&state).to_line();
        assert_eq!(parse_state(&split_line(&again)), Ok(state));
    }
    let _ = parse_status(&fields);
    let _ = parse_pressure(&fields);
});
