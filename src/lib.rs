//! Greenhouse controller library.
//!
//! Exposes the domain core, the adapters and the runtime for integration
//! testing; `main.rs` only wires them together.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod reading;
pub mod scheduler;
pub mod storage;
pub mod web;
