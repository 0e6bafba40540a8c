//! Hardware adapters bridging the sensor and relay pins to the port traits.
//!
//! On the host both are simulations: [`SimulatedSensors`] produces a slow
//! day/night and climate waveform and reproduces the climate sensor's
//! minimum poll interval; [`RelayBoard`] keeps the logic level of each relay
//! pin and honours the board's polarity.

use core::f32::consts::TAU;
use core::time::Duration;
use std::time::Instant;

use log::{debug, info};

use crate::app::actuation::Actuator;
use crate::app::ports::{ActuatorPort, AnalogChannel, ClimateSample, SensorPort};
use crate::error::{ActuatorError, SensorError};

/// The climate sensor refuses reads closer together than this.
pub const CLIMATE_MIN_INTERVAL: Duration = Duration::from_secs(1);

const DAY_SECS: f32 = 86_400.0;

// ── Sensors ───────────────────────────────────────────────────

pub struct SimulatedSensors {
    start: Instant,
    /// Simulated seconds per real second.
    speedup: f32,
    last_climate: Option<Instant>,
}

impl Default for SimulatedSensors {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SimulatedSensors {
    pub fn new(speedup: f32) -> Self {
        info!("Sensors(sim): started (x{} time)", speedup);
        Self {
            start: Instant::now(),
            speedup,
            last_climate: None,
        }
    }

    /// Position in the simulated day, `0.0..1.0`.
    fn day_phase(&self) -> f32 {
        let t = self.start.elapsed().as_secs_f32() * self.speedup;
        (t % DAY_SECS) / DAY_SECS
    }
}

impl SensorPort for SimulatedSensors {
    fn read_analog(&mut self, channel: AnalogChannel) -> Result<u16, SensorError> {
        let phase = self.day_phase();
        let fraction = match channel {
            // Daylight over the first half of the cycle, dark otherwise.
            AnalogChannel::Light => (phase * TAU).sin().max(0.0),
            // Soil dries through the day and recovers overnight.
            AnalogChannel::Soil => 0.35 + 0.1 * (phase * TAU).sin(),
        };
        let raw = (fraction.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16;
        debug!("Sensors(sim): {:?} raw {}", channel, raw);
        Ok(raw)
    }

    fn read_climate(&mut self) -> Result<ClimateSample, SensorError> {
        let now = Instant::now();
        if let Some(last) = self.last_climate {
            if now.duration_since(last) < CLIMATE_MIN_INTERVAL {
                return Err(SensorError::ReadTooSoon);
            }
        }
        self.last_climate = Some(now);

        let wave = (self.day_phase() * TAU).sin();
        Ok(ClimateSample {
            temperature_c: (18.0 + 8.0 * wave).round(),
            humidity_pct: (60.0 - 15.0 * wave).round(),
        })
    }
}

// ── Relays ────────────────────────────────────────────────────

/// Logic level that switches a relay on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    /// On at logic 0; the usual opto-isolated relay board.
    ActiveLow,
}

impl Polarity {
    const fn level(self, on: bool) -> bool {
        match self {
            Self::ActiveHigh => on,
            Self::ActiveLow => !on,
        }
    }
}

/// Two relay outputs, driven off at construction.
pub struct RelayBoard {
    polarity: Polarity,
    levels: [bool; 2],
}

impl RelayBoard {
    pub fn new(polarity: Polarity) -> Self {
        let off = polarity.level(false);
        info!("Relays: {:?}, all outputs off", polarity);
        Self {
            polarity,
            levels: [off; 2],
        }
    }

    /// Current logic level of the relay pin.
    pub fn level(&self, actuator: Actuator) -> bool {
        self.levels[actuator.index()]
    }

    pub fn is_on(&self, actuator: Actuator) -> bool {
        self.level(actuator) == self.polarity.level(true)
    }
}

impl ActuatorPort for RelayBoard {
    fn set(&mut self, actuator: Actuator, on: bool) -> Result<(), ActuatorError> {
        let level = self.polarity.level(on);
        self.levels[actuator.index()] = level;
        debug!(
            "Relays: {} -> {} (pin {})",
            actuator.relay(),
            if on { "on" } else { "off" },
            u8::from(level)
        );
        Ok(())
    }
}
