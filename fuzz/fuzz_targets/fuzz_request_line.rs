//! Fuzz target: HTTP request-line parsing
//!
//! Feeds arbitrary bytes to `parse_request_line` and verifies:
//! - No panics under arbitrary byte inputs
//! - A parsed line has a non-empty, whitespace-free method and target
//! - Routing a parsed line never panics
//!
//! cargo fuzz run fuzz_request_line

#![no_main]

use greenhouse::web::request::parse_request_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = parse_request_line(data) {
        assert!(!line.method.is_empty());
        assert!(!line.target.is_empty());
        assert!(!line.method.contains(char::is_whitespace));
        assert!(!line.target.contains(char::is_whitespace));
        let _ = line.route();
    }
});
