//! LogStore: the persisted, size-bounded reading log.
//!
//! Readings are appended one line at a time.  After every append the store
//! checks its size against the budget minus the reserve; once over, the file
//! is rewritten to its newest `keep_lines` records.
//!
//! Rotation makes one linear pass over the file, remembering only the start
//! offsets of the last `keep_lines` lines, then seeks to the oldest kept
//! offset and copies the tail out.

use std::collections::VecDeque;
use std::io::{self, BufRead, Read, Seek, SeekFrom};

use log::{debug, info};

use crate::app::ports::LineStore;
use crate::config::GreenhouseConfig;
use crate::error::{StorageFault, StorageOp};
use crate::reading::Reading;

/// Size budget and retention for the reading log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogPolicy {
    pub budget_kib: u32,
    pub reserve_pct: u8,
    pub keep_lines: usize,
}

impl LogPolicy {
    /// Largest size (bytes) the log may hold after a capacity check.
    pub fn threshold_bytes(&self) -> u64 {
        let budget = u64::from(self.budget_kib) * 1024;
        budget * u64::from(100 - self.reserve_pct.min(100)) / 100
    }
}

impl Default for LogPolicy {
    fn default() -> Self {
        Self::from(&GreenhouseConfig::default())
    }
}

impl From<&GreenhouseConfig> for LogPolicy {
    fn from(cfg: &GreenhouseConfig) -> Self {
        Self {
            budget_kib: cfg.log_budget_kib,
            reserve_pct: cfg.log_reserve_pct,
            keep_lines: cfg.log_keep_lines,
        }
    }
}

/// What a capacity check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// Size at or under the threshold; nothing read.
    WithinBudget { size_bytes: u64 },
    /// Over the threshold but already holding no more than `keep_lines`.
    NothingToTrim { lines: usize },
    /// Rewritten to the newest `kept` lines.
    Rotated { dropped: usize, kept: usize },
}

pub struct LogStore<F> {
    file: F,
    policy: LogPolicy,
}

impl<F: LineStore> LogStore<F> {
    pub fn new(file: F, policy: LogPolicy) -> Self {
        Self { file, policy }
    }

    /// Append one reading as a terminated line; flushed before returning.
    pub fn append(&mut self, reading: &Reading) -> Result<(), StorageFault> {
        self.file
            .append_line(&reading.to_log_line())
            .map_err(|e| StorageFault::new(StorageOp::Append, &e))
    }

    /// Rotate the log if it is over its threshold.
    pub fn enforce_capacity(&mut self) -> Result<RotationOutcome, StorageFault> {
        let size_bytes = self
            .file
            .size_bytes()
            .map_err(|e| StorageFault::new(StorageOp::Measure, &e))?;
        if size_bytes <= self.policy.threshold_bytes() {
            return Ok(RotationOutcome::WithinBudget { size_bytes });
        }

        let keep = self.policy.keep_lines;
        let (lines, tail) = {
            let mut reader = self
                .file
                .open_reader()
                .map_err(|e| StorageFault::new(StorageOp::Scan, &e))?;
            let (lines, cut) = scan_tail_offset(&mut reader, keep)
                .map_err(|e| StorageFault::new(StorageOp::Scan, &e))?;
            if lines <= keep {
                debug!(
                    "Logger: log is {} bytes but holds only {} lines, not rotating",
                    size_bytes, lines
                );
                return Ok(RotationOutcome::NothingToTrim { lines });
            }
            let tail = read_from(&mut reader, cut)
                .map_err(|e| StorageFault::new(StorageOp::Scan, &e))?;
            (lines, tail)
        };

        self.file
            .replace_contents(&tail)
            .map_err(|e| StorageFault::new(StorageOp::Rewrite, &e))?;

        let dropped = lines - keep;
        info!(
            "Logger: rotated log, dropped lines 1..={} and kept {}",
            dropped, keep
        );
        Ok(RotationOutcome::Rotated {
            dropped,
            kept: keep,
        })
    }

    pub fn into_inner(self) -> F {
        self.file
    }
}

/// Count the lines in `reader` and return the byte offset where the newest
/// `keep` lines begin.  A final line without a terminator still counts.
fn scan_tail_offset<R: BufRead>(reader: &mut R, keep: usize) -> io::Result<(usize, u64)> {
    let mut starts: VecDeque<u64> = VecDeque::with_capacity(keep.min(4096) + 1);
    let mut buf = Vec::with_capacity(128);
    let mut offset = 0u64;
    let mut lines = 0usize;

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        if starts.len() == keep {
            starts.pop_front();
        }
        if keep > 0 {
            starts.push_back(offset);
        }
        offset += n as u64;
        lines += 1;
    }

    Ok((lines, starts.front().copied().unwrap_or(offset)))
}

fn read_from<R: Read + Seek>(reader: &mut R, offset: u64) -> io::Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut tail = Vec::new();
    reader.read_to_end(&mut tail)?;
    Ok(tail)
}
