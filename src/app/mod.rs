//! Application core: the four duties and the state they share, zero I/O.
//!
//! This module contains the business rules for the greenhouse controller:
//! acquisition and logging, threshold actuation with the day/night gate,
//! link health, and the shared state and journal they all write to.
//! All interaction with hardware, files and sockets happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod acquisition;
pub mod actuation;
pub mod journal;
pub mod link;
pub mod ports;
pub mod state;
