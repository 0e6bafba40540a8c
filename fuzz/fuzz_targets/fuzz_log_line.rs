//! Fuzz target: reading log-line parsing
//!
//! Parses arbitrary text as a log line and verifies:
//! - No panics under arbitrary input
//! - Any line that parses re-renders to a line that parses to the same reading
//!
//! cargo fuzz run fuzz_log_line

#![no_main]

use greenhouse::reading::Reading;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(reading) = Reading::from_log_line(text) {
        let again = Reading::from_log_line(&reading.to_log_line())
            .expect("rendered line must parse");
        // NaN never compares equal; compare the rendered form instead.
        assert_eq!(again.to_log_line(), reading.to_log_line());
    }
});
