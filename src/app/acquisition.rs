//! Sensor acquisition and the logging duty.
//!
//! [`SensorAcquisition`] turns raw primitives into a complete [`Reading`]
//! or a [`SensorFault`]; it never yields a partial reading.  The climate
//! sensor is read first and exactly once per call, since the real part
//! fails when polled again within about a second.
//!
//! [`DataLogger`] is the acquisition + logging duty: acquire, publish,
//! append, enforce the log budget, sleep.  A sensor fault skips the cycle;
//! a storage fault stops this duty for good (the other duties carry on).

use core::time::Duration;
use std::rc::Rc;

use log::{error, info, warn};

use super::journal::SharedJournal;
use super::ports::{AnalogChannel, ClockPort, Delay, LineStore, SensorPort};
use super::state::SharedState;
use crate::error::{SensorFault, SensorKind, StorageFault};
use crate::reading::{Reading, Stamp, normalize_pct};
use crate::storage::{LogStore, RotationOutcome};
use crate::web::render;

// ── SensorAcquisition ─────────────────────────────────────────

pub struct SensorAcquisition<S> {
    sensors: S,
    clock: Rc<dyn ClockPort>,
}

impl<S: SensorPort> SensorAcquisition<S> {
    pub fn new(sensors: S, clock: Rc<dyn ClockPort>) -> Self {
        Self { sensors, clock }
    }

    /// Read every sensor and stamp the result with the current time.
    pub fn acquire(&mut self) -> Result<Reading, SensorFault> {
        let climate = self
            .sensors
            .read_climate()
            .map_err(|e| SensorFault::new(SensorKind::Climate, e))?;
        let soil = self.analog(AnalogChannel::Soil)?;
        let light = self.analog(AnalogChannel::Light)?;
        let stamp = Stamp::from_datetime(&self.clock.now());

        Ok(Reading::new(
            stamp,
            soil,
            light,
            climate.temperature_c,
            climate.humidity_pct,
        ))
    }

    /// Fresh light level (%), independent of the last published reading.
    pub fn sample_light(&mut self) -> Result<f32, SensorFault> {
        self.analog(AnalogChannel::Light)
    }

    fn analog(&mut self, channel: AnalogChannel) -> Result<f32, SensorFault> {
        let kind = match channel {
            AnalogChannel::Soil => SensorKind::Soil,
            AnalogChannel::Light => SensorKind::Light,
        };
        self.sensors
            .read_analog(channel)
            .map(normalize_pct)
            .map_err(|e| SensorFault::new(kind, e))
    }
}

// ── DataLogger duty ───────────────────────────────────────────

/// What one logging cycle did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogCycle {
    /// A sensor failed; nothing was published or logged.
    Skipped(SensorFault),
    /// Published, appended and capacity-checked.
    Logged(RotationOutcome),
}

pub struct DataLogger<S, F, D> {
    acquisition: SensorAcquisition<S>,
    store: LogStore<F>,
    state: SharedState,
    journal: SharedJournal,
    delay: D,
    interval: Duration,
}

impl<S, F, D> DataLogger<S, F, D>
where
    S: SensorPort,
    F: LineStore,
    D: Delay,
{
    pub fn new(
        acquisition: SensorAcquisition<S>,
        store: LogStore<F>,
        state: SharedState,
        journal: SharedJournal,
        delay: D,
        interval: Duration,
    ) -> Self {
        Self {
            acquisition,
            store,
            state,
            journal,
            delay,
            interval,
        }
    }

    /// One acquisition cycle.
    pub fn step(&mut self) -> Result<LogCycle, StorageFault> {
        let reading = match self.acquisition.acquire() {
            Ok(r) => r,
            Err(fault) => {
                warn!("Logger: {}, skipping cycle", fault);
                self.journal.borrow_mut().record(&fault.to_string());
                return Ok(LogCycle::Skipped(fault));
            }
        };

        let summary = render::summary_fragment(&reading);
        self.state.borrow_mut().publish(reading.clone(), summary);
        self.store.append(&reading)?;
        let outcome = self.store.enforce_capacity()?;
        Ok(LogCycle::Logged(outcome))
    }

    /// Duty loop.  Returns only when a storage fault stops logging.
    pub async fn run(mut self) -> StorageFault {
        self.journal.borrow_mut().record("Started sensor logging");
        info!("Logger: started, interval {:?}", self.interval);

        loop {
            if let Err(fault) = self.step() {
                error!("Logger: {}, logging stopped", fault);
                self.journal
                    .borrow_mut()
                    .record(&format!("Logging stopped unexpectedly: {fault}"));
                return fault;
            }
            self.delay.sleep(self.interval).await;
        }
    }
}
