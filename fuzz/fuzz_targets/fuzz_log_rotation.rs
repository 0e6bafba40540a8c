//! Fuzz target: log rotation
//!
//! Treats the input as log contents and the first byte as the retention
//! count, then verifies:
//! - No panics on arbitrary bytes, including a missing final newline
//! - After a rotation the store holds at most `keep` lines
//! - The kept bytes are a suffix of the previous contents
//!
//! cargo fuzz run fuzz_log_rotation

#![no_main]

use greenhouse::adapters::files::MemLineStore;
use greenhouse::storage::{LogPolicy, LogStore, RotationOutcome};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&keep, body)) = data.split_first() else {
        return;
    };
    let keep = usize::from(keep % 32) + 1;
    let text = String::from_utf8_lossy(body).into_owned();

    let file = MemLineStore::with_contents(&text);
    let policy = LogPolicy {
        budget_kib: 0,
        reserve_pct: 0,
        keep_lines: keep,
    };
    let outcome = LogStore::new(file.clone(), policy)
        .enforce_capacity()
        .expect("in-memory store never fails");

    let after = file.contents();
    assert!(text.ends_with(after.as_str()));
    if let RotationOutcome::Rotated { kept, .. } = outcome {
        assert_eq!(kept, keep);
        assert!(after.split_inclusive('\n').count() <= keep);
    }
});
