//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements          | Connects to                   |
//! |---------------|---------------------|-------------------------------|
//! | `config_file` | ConfigPort          | JSON file on disk             |
//! | `files`       | LineSink, LineStore | flat files / memory buffer    |
//! | `hardware`    | SensorPort          | analog + climate sensors (sim)|
//! |               | ActuatorPort        | relay board pins (sim)        |
//! | `link`        | LinkPort            | host network link (sim)       |
//! | `tcp`         | Listener            | async-io-mini TCP listener    |
//! | `time`        | ClockPort, Delay    | UTC system clock, reactor timer|

pub mod config_file;
pub mod files;
pub mod hardware;
pub mod link;
pub mod tcp;
pub mod time;
