//! System configuration parameters
//!
//! All tunable parameters for the greenhouse controller.  Values come from
//! an optional JSON file (see [`JsonConfigFile`](crate::adapters::config_file::JsonConfigFile));
//! any field the file omits keeps its default.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Upper bound for `history_capacity` (size of the fixed history buffer).
pub const HISTORY_MAX: usize = 64;

/// Upper bound for `journal_capacity` (size of the fixed journal buffer).
pub const JOURNAL_MAX: usize = 32;

/// Coarse logging-rate tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingRate {
    High,
    Medium,
    Low,
}

impl LoggingRate {
    /// Acquisition interval for this tier.
    pub const fn interval(self) -> Duration {
        match self {
            Self::High => Duration::from_secs(30),
            Self::Medium => Duration::from_secs(60),
            Self::Low => Duration::from_secs(300),
        }
    }
}

/// Core controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GreenhouseConfig {
    // --- Logging ---
    /// Acquisition + logging rate tier
    pub logging_rate: LoggingRate,
    /// Log file capacity budget (KiB)
    pub log_budget_kib: u32,
    /// Share of the budget held back for system files (%)
    pub log_reserve_pct: u8,
    /// Records kept when the log is rotated
    pub log_keep_lines: usize,
    /// In-memory history length (readings)
    pub history_capacity: usize,
    /// In-memory notification length (entries)
    pub journal_capacity: usize,

    // --- Irrigation ---
    /// Soil aridity limit (%); irrigate above it
    pub aridity_limit_pct: f32,
    /// Pump run time (seconds)
    pub irrigation_secs: u32,

    // --- Ventilation ---
    /// Relative humidity that starts the fan (%)
    pub humidity_vent_pct: f32,
    /// Temperature that starts the fan when humidity is fine (°C)
    pub temperature_vent_c: f32,
    /// Fan run time (seconds)
    pub ventilation_secs: u32,

    // --- Alerts ---
    /// Notify above this temperature (°C)
    pub temperature_high_c: f32,
    /// Notify below this temperature (°C)
    pub temperature_low_c: f32,

    // --- Day/night gate ---
    /// Light level under which it is considered night (%)
    pub darkness_pct: f32,
    /// Light re-sampling interval while waiting for dawn (seconds)
    pub dawn_poll_secs: u32,

    // --- Timing ---
    /// Actuator decision interval (seconds)
    pub polling_interval_secs: u32,
    /// Relay hold for the diagnostic test pages (seconds)
    pub relay_test_secs: u32,
    /// Network link health check interval (seconds)
    pub link_check_secs: u32,

    // --- Paths ---
    pub log_path: String,
    pub journal_path: String,
    pub listen_addr: String,
}

impl Default for GreenhouseConfig {
    fn default() -> Self {
        Self {
            // Logging
            logging_rate: LoggingRate::High,
            log_budget_kib: 2048,
            log_reserve_pct: 10,
            log_keep_lines: 1000,
            history_capacity: 20,
            journal_capacity: 10,

            // Irrigation
            aridity_limit_pct: 40.0,
            irrigation_secs: 1,

            // Ventilation
            humidity_vent_pct: 75.0,
            temperature_vent_c: 30.0,
            ventilation_secs: 120,

            // Alerts
            temperature_high_c: 37.0,
            temperature_low_c: 5.0,

            // Day/night gate
            darkness_pct: 5.0,
            dawn_poll_secs: 600,

            // Timing
            polling_interval_secs: 1800, // 30 min
            relay_test_secs: 1,
            link_check_secs: 600, // 10 min

            // Paths
            log_path: "logfile.csv".into(),
            journal_path: "notifications.csv".into(),
            listen_addr: "0.0.0.0:80".into(),
        }
    }
}

impl GreenhouseConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pct = 0.0..=100.0;
        if !pct.contains(&self.aridity_limit_pct) {
            return Err(ConfigError::ValidationFailed("aridity_limit_pct must be 0–100"));
        }
        if !pct.contains(&self.humidity_vent_pct) {
            return Err(ConfigError::ValidationFailed("humidity_vent_pct must be 0–100"));
        }
        if !pct.contains(&self.darkness_pct) {
            return Err(ConfigError::ValidationFailed("darkness_pct must be 0–100"));
        }
        if self.temperature_low_c >= self.temperature_high_c {
            return Err(ConfigError::ValidationFailed(
                "temperature_low_c must be < temperature_high_c",
            ));
        }
        if self.irrigation_secs == 0 || self.ventilation_secs == 0 || self.relay_test_secs == 0 {
            return Err(ConfigError::ValidationFailed("actuator run times must be > 0"));
        }
        if self.polling_interval_secs == 0 || self.dawn_poll_secs == 0 || self.link_check_secs == 0
        {
            return Err(ConfigError::ValidationFailed("intervals must be > 0"));
        }
        if self.log_budget_kib == 0 {
            return Err(ConfigError::ValidationFailed("log_budget_kib must be > 0"));
        }
        if self.log_reserve_pct >= 100 {
            return Err(ConfigError::ValidationFailed("log_reserve_pct must be 0–99"));
        }
        if self.log_keep_lines == 0 {
            return Err(ConfigError::ValidationFailed("log_keep_lines must be > 0"));
        }
        if !(1..=HISTORY_MAX).contains(&self.history_capacity) {
            return Err(ConfigError::ValidationFailed("history_capacity must be 1–64"));
        }
        if !(1..=JOURNAL_MAX).contains(&self.journal_capacity) {
            return Err(ConfigError::ValidationFailed("journal_capacity must be 1–32"));
        }
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::ValidationFailed("listen_addr must be ip:port"));
        }
        Ok(())
    }

    pub fn logging_interval(&self) -> Duration {
        self.logging_rate.interval()
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_secs.into())
    }

    pub fn link_check_interval(&self) -> Duration {
        Duration::from_secs(self.link_check_secs.into())
    }

    pub fn relay_test_hold(&self) -> Duration {
        Duration::from_secs(self.relay_test_secs.into())
    }
}
