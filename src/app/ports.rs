//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ duty loops (domain)
//! ```
//!
//! Driven adapters (clock, sensors, relays, files, sockets, network link)
//! implement these traits.  The duty loops in [`app`](super) consume them via
//! generics, so the domain core never touches hardware or the filesystem
//! directly.
//!
//! All ports are single-threaded: the controller runs on one cooperative
//! executor, so nothing here is `Send` or `Sync`.

use core::future::Future;
use core::time::Duration;
use std::cell::RefCell;
use std::io::{self, BufRead, Seek};
use std::rc::Rc;

use chrono::NaiveDateTime;
use futures_lite::io::{AsyncRead, AsyncWrite};

use super::actuation::Actuator;
use crate::config::GreenhouseConfig;
use crate::error::{ActuatorError, SensorError};

// ───────────────────────────────────────────────────────────────
// Time (driven adapter: clock + timer → domain)
// ───────────────────────────────────────────────────────────────

/// Calendar time source.  Read at call time, never cached by the caller.
pub trait ClockPort {
    fn now(&self) -> NaiveDateTime;
}

/// Cooperative suspension point.
///
/// Every timed wait in a duty loop goes through this port; while one duty
/// is suspended here the executor runs the others.
pub trait Delay {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// The two 16-bit analog inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogChannel {
    Soil,
    Light,
}

/// One reply from the digital temperature/humidity sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Read-side port: raw sensor primitives.
pub trait SensorPort {
    /// Raw analog sample, full scale `0..=65535`.
    fn read_analog(&mut self, channel: AnalogChannel) -> Result<u16, SensorError>;

    /// Temperature and humidity.  The real part fails when polled more
    /// often than about once per second.
    fn read_climate(&mut self) -> Result<ClimateSample, SensorError>;
}

/// Lets the logging duty and the day/night gate sample the same hardware.
impl<S: SensorPort> SensorPort for Rc<RefCell<S>> {
    fn read_analog(&mut self, channel: AnalogChannel) -> Result<u16, SensorError> {
        self.borrow_mut().read_analog(channel)
    }

    fn read_climate(&mut self) -> Result<ClimateSample, SensorError> {
        self.borrow_mut().read_climate()
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: binary relay outputs.
pub trait ActuatorPort {
    /// Switch one output.  Polarity is the adapter's concern.
    fn set(&mut self, actuator: Actuator, on: bool) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Line storage (driven adapter: domain → flat files)
// ───────────────────────────────────────────────────────────────

/// Append-only record sink.
///
/// Each call writes `line` plus a `\n` terminator and flushes before
/// returning.  The backing file is opened for the duration of the call
/// only.
pub trait LineSink {
    fn append_line(&mut self, line: &str) -> io::Result<()>;
}

/// A [`LineSink`] that can also be measured, scanned and rewritten.
pub trait LineStore: LineSink {
    type Reader: BufRead + Seek;

    /// Current size in bytes.  A store that does not exist yet is empty.
    fn size_bytes(&self) -> io::Result<u64>;

    /// Open a fresh reader positioned at the start of the store.
    fn open_reader(&self) -> io::Result<Self::Reader>;

    /// Replace the whole store with `contents`.
    fn replace_contents(&mut self, contents: &[u8]) -> io::Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Network (driven adapter: sockets + link → domain)
// ───────────────────────────────────────────────────────────────

/// Source of inbound byte-stream connections.
pub trait Listener {
    type Conn: AsyncRead + AsyncWrite + Unpin;

    fn accept(&self) -> impl Future<Output = io::Result<Self::Conn>>;
}

/// Network link and wall-clock synchronisation.
pub trait LinkPort {
    fn is_connected(&self) -> bool;

    /// One reconnect attempt.
    fn reconnect(&mut self) -> io::Result<()>;

    /// One time-sync attempt against the network time source.
    fn sync_time(&mut self) -> io::Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: persistent config → domain)
// ───────────────────────────────────────────────────────────────

/// Loads the controller configuration.
///
/// Implementations MUST run [`GreenhouseConfig::validate`] before handing a
/// config back.  Invalid ranges are rejected with
/// [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Returns [`GreenhouseConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<GreenhouseConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError(io::ErrorKind),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(kind) => write!(f, "I/O error: {}", kind),
        }
    }
}

impl std::error::Error for ConfigError {}
