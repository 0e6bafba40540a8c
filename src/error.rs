//! Fault taxonomy for the greenhouse controller.
//!
//! Every fallible operation in the core funnels into one of four fault
//! families, each recovered at the boundary of the duty loop that raised
//! it:
//!
//! | Fault          | Raised by            | Recovery                          |
//! |----------------|----------------------|-----------------------------------|
//! | `SensorFault`  | SensorAcquisition    | cycle skipped, journaled          |
//! | `StorageFault` | LogStore             | journaled, logging duty stops     |
//! | `RequestFault` | StateServer          | journaled, connection dropped     |
//! | `LinkFault`    | LinkMonitor          | journaled, retried next check     |
//!
//! All variants are `Copy` so they can be journaled and returned from a
//! duty without allocation.

use core::fmt;
use std::io;

// ---------------------------------------------------------------------------
// Top-level fault
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Sensor(SensorFault),
    Storage(StorageFault),
    Request(RequestFault),
    Link(LinkFault),
    Actuator(ActuatorError),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor fault: {e}"),
            Self::Storage(e) => write!(f, "storage fault: {e}"),
            Self::Request(e) => write!(f, "request fault: {e}"),
            Self::Link(e) => write!(f, "link fault: {e}"),
            Self::Actuator(e) => write!(f, "actuator fault: {e}"),
        }
    }
}

impl std::error::Error for Fault {}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// Which physical sensor a read was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Soil,
    Light,
    Climate,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Soil => write!(f, "soil"),
            Self::Light => write!(f, "light"),
            Self::Climate => write!(f, "temperature/humidity"),
        }
    }
}

/// Low-level failure reported by a [`SensorPort`](crate::app::ports::SensorPort).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC conversion failed or timed out.
    AdcReadFailed,
    /// The digital climate sensor did not answer or failed its checksum.
    ClimateReadFailed,
    /// The climate sensor was polled again within its minimum interval.
    ReadTooSoon,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::ClimateReadFailed => write!(f, "no reply from climate sensor"),
            Self::ReadTooSoon => write!(f, "climate sensor polled too frequently"),
        }
    }
}

/// A single sensor read failed; the acquisition cycle is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFault {
    pub sensor: SensorKind,
    pub cause: SensorError,
}

impl SensorFault {
    pub const fn new(sensor: SensorKind, cause: SensorError) -> Self {
        Self { sensor, cause }
    }
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no reading from {} sensor ({})", self.sensor, self.cause)
    }
}

impl From<SensorFault> for Fault {
    fn from(e: SensorFault) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Storage faults
// ---------------------------------------------------------------------------

/// The storage step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Append,
    Measure,
    Scan,
    Rewrite,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Measure => write!(f, "size check"),
            Self::Scan => write!(f, "rotation scan"),
            Self::Rewrite => write!(f, "rotation rewrite"),
        }
    }
}

/// Append or rotation I/O failed.  Fatal for the logging duty only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageFault {
    pub op: StorageOp,
    pub kind: io::ErrorKind,
}

impl StorageFault {
    pub fn new(op: StorageOp, err: &io::Error) -> Self {
        Self {
            op,
            kind: err.kind(),
        }
    }
}

impl fmt::Display for StorageFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "log {} failed: {}", self.op, self.kind)
    }
}

impl std::error::Error for StorageFault {}

impl From<StorageFault> for Fault {
    fn from(e: StorageFault) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Request faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFault {
    /// The request line was empty, not UTF-8, or not `METHOD TARGET ...`.
    Malformed(&'static str),
    /// The client sent more header lines than the server will drain.
    TooManyHeaders,
    /// Reading the request or writing the response failed.
    Io(io::ErrorKind),
}

impl fmt::Display for RequestFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(why) => write!(f, "malformed request: {why}"),
            Self::TooManyHeaders => write!(f, "too many request headers"),
            Self::Io(kind) => write!(f, "connection I/O failed: {kind}"),
        }
    }
}

impl From<io::Error> for RequestFault {
    fn from(e: io::Error) -> Self {
        Self::Io(e.kind())
    }
}

impl From<RequestFault> for Fault {
    fn from(e: RequestFault) -> Self {
        Self::Request(e)
    }
}

// ---------------------------------------------------------------------------
// Link faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFault {
    ReconnectFailed { attempts: u8 },
    TimeSyncFailed { attempts: u8 },
}

impl fmt::Display for LinkFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReconnectFailed { attempts } => {
                write!(f, "network reconnect failed after {attempts} attempts")
            }
            Self::TimeSyncFailed { attempts } => {
                write!(f, "time sync failed after {attempts} attempts")
            }
        }
    }
}

impl From<LinkFault> for Fault {
    fn from(e: LinkFault) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// The output pin could not be driven.
    OutputWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutputWriteFailed => write!(f, "output write failed"),
        }
    }
}

impl From<ActuatorError> for Fault {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}
