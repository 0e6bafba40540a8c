//! Actuation: the relay bank and the threshold controller duty.
//!
//! ```text
//!            ┌─────── already active: no-op ───────┐
//!            ▼                                     │
//!   Idle ──[condition]──▶ Active ──[hold elapsed]──▶ Idle + journal
//! ```
//!
//! [`ActuatorBank`] owns the outputs and the per-actuator `is_active` flags.
//! It is shared (`Rc`) between the controller and the status server's
//! relay-test pages, so both go through the same re-trigger guard.
//!
//! [`ActuatorController`] is the decision duty: each poll it reads the
//! latest published reading, either waits out the night or applies the
//! irrigation and ventilation rules, and always checks the temperature
//! bounds.

use core::cell::Cell;
use core::fmt;
use core::time::Duration;
use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};

use super::acquisition::SensorAcquisition;
use super::journal::SharedJournal;
use super::ports::{ActuatorPort, Delay, SensorPort};
use super::state::SharedState;
use crate::config::GreenhouseConfig;
use crate::error::ActuatorError;

// ── Actuators ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    /// Relay 1: irrigation pump.
    Irrigation,
    /// Relay 2: ventilation fan.
    Ventilation,
}

impl Actuator {
    pub const ALL: [Self; 2] = [Self::Irrigation, Self::Ventilation];

    pub const fn index(self) -> usize {
        match self {
            Self::Irrigation => 0,
            Self::Ventilation => 1,
        }
    }

    /// Relay name as printed on the board.
    pub const fn relay(self) -> &'static str {
        match self {
            Self::Irrigation => "Relay 1",
            Self::Ventilation => "Relay 2",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Irrigation => write!(f, "irrigation"),
            Self::Ventilation => write!(f, "ventilation"),
        }
    }
}

/// Result of one activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Ran for the full hold and switched off again.
    Completed,
    /// Rejected by the re-trigger guard; the running hold is untouched.
    AlreadyActive,
    /// The output could not be switched on.
    Failed(ActuatorError),
}

// ── ActuatorBank ──────────────────────────────────────────────

pub struct ActuatorBank<H, D> {
    outputs: RefCell<H>,
    active: [Cell<bool>; 2],
    activations: [Cell<u32>; 2],
    journal: SharedJournal,
    delay: D,
}

impl<H: ActuatorPort, D: Delay> ActuatorBank<H, D> {
    pub fn new(outputs: H, journal: SharedJournal, delay: D) -> Self {
        Self {
            outputs: RefCell::new(outputs),
            active: [Cell::new(false), Cell::new(false)],
            activations: [Cell::new(0), Cell::new(0)],
            journal,
            delay,
        }
    }

    pub fn is_active(&self, actuator: Actuator) -> bool {
        self.active[actuator.index()].get()
    }

    /// Activations started since start-up (re-trigger no-ops excluded).
    pub fn activations(&self, actuator: Actuator) -> u32 {
        self.activations[actuator.index()].get()
    }

    /// Switch `actuator` on, hold for `hold`, switch it off and journal it.
    ///
    /// The hold is a suspension point; other duties run meanwhile.  If the
    /// returned future is dropped mid-hold the output is still switched off.
    pub async fn run(&self, actuator: Actuator, hold: Duration) -> Activation {
        let slot = actuator.index();
        if self.active[slot].get() {
            debug!("Actuator: {} already activated, ignoring", actuator.relay());
            return Activation::AlreadyActive;
        }

        if let Err(e) = self.outputs.borrow_mut().set(actuator, true) {
            warn!("Actuator: could not switch on {}: {}", actuator.relay(), e);
            self.journal
                .borrow_mut()
                .record(&format!("{} could not be turned on: {}", actuator.relay(), e));
            return Activation::Failed(e);
        }

        let held = OutputHold {
            outputs: &self.outputs,
            active: &self.active[slot],
            actuator,
        };
        self.active[slot].set(true);
        self.activations[slot].set(self.activations[slot].get() + 1);
        info!("Actuator: {} ({}) on for {:?}", actuator.relay(), actuator, hold);

        self.delay.sleep(hold).await;
        drop(held);

        self.journal.borrow_mut().record(&format!(
            "{} was turned on for {} seconds.",
            actuator.relay(),
            hold.as_secs()
        ));
        Activation::Completed
    }

    /// Drive every output off.  Used at start-up.
    pub fn all_off(&self) {
        for actuator in Actuator::ALL {
            if let Err(e) = self.outputs.borrow_mut().set(actuator, false) {
                warn!("Actuator: could not switch off {}: {}", actuator.relay(), e);
            }
            self.active[actuator.index()].set(false);
        }
    }
}

/// Switches the output off and clears `is_active` when dropped.
struct OutputHold<'a, H: ActuatorPort> {
    outputs: &'a RefCell<H>,
    active: &'a Cell<bool>,
    actuator: Actuator,
}

impl<H: ActuatorPort> Drop for OutputHold<'_, H> {
    fn drop(&mut self) {
        if let Err(e) = self.outputs.borrow_mut().set(self.actuator, false) {
            warn!(
                "Actuator: could not switch off {}: {}",
                self.actuator.relay(),
                e
            );
        }
        self.active.set(false);
        info!("Actuator: {} off", self.actuator.relay());
    }
}

// ── Control rules ─────────────────────────────────────────────

/// Thresholds and timings for the decision duty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRules {
    pub aridity_limit_pct: f32,
    pub irrigation_hold: Duration,
    pub humidity_vent_pct: f32,
    pub temperature_vent_c: f32,
    pub ventilation_hold: Duration,
    pub temperature_high_c: f32,
    pub temperature_low_c: f32,
    pub darkness_pct: f32,
    pub dawn_poll: Duration,
    pub polling: Duration,
}

impl From<&GreenhouseConfig> for ControlRules {
    fn from(cfg: &GreenhouseConfig) -> Self {
        Self {
            aridity_limit_pct: cfg.aridity_limit_pct,
            irrigation_hold: Duration::from_secs(cfg.irrigation_secs.into()),
            humidity_vent_pct: cfg.humidity_vent_pct,
            temperature_vent_c: cfg.temperature_vent_c,
            ventilation_hold: Duration::from_secs(cfg.ventilation_secs.into()),
            temperature_high_c: cfg.temperature_high_c,
            temperature_low_c: cfg.temperature_low_c,
            darkness_pct: cfg.darkness_pct,
            dawn_poll: Duration::from_secs(cfg.dawn_poll_secs.into()),
            polling: cfg.polling_interval(),
        }
    }
}

impl Default for ControlRules {
    fn default() -> Self {
        Self::from(&GreenhouseConfig::default())
    }
}

/// Readings are compared on their whole part.
fn whole(v: f32) -> f32 {
    v.trunc()
}

// ── Cycle report ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentCause {
    Humidity,
    Temperature,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemperatureAlert {
    High(f32),
    Low(f32),
}

/// Everything one decision cycle did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// The cycle hit the day/night gate and made no decisions.
    pub gated: bool,
    /// Light samples taken inside the gate.
    pub gate_samples: u32,
    pub irrigation: Option<Activation>,
    pub ventilation: Option<(VentCause, Activation)>,
    pub alert: Option<TemperatureAlert>,
}

// ── ActuatorController ────────────────────────────────────────

pub struct ActuatorController<S, H, D> {
    bank: Rc<ActuatorBank<H, D>>,
    light: SensorAcquisition<S>,
    state: SharedState,
    journal: SharedJournal,
    delay: D,
    rules: ControlRules,
}

impl<S, H, D> ActuatorController<S, H, D>
where
    S: SensorPort,
    H: ActuatorPort,
    D: Delay,
{
    pub fn new(
        bank: Rc<ActuatorBank<H, D>>,
        light: SensorAcquisition<S>,
        state: SharedState,
        journal: SharedJournal,
        delay: D,
        rules: ControlRules,
    ) -> Self {
        Self {
            bank,
            light,
            state,
            journal,
            delay,
            rules,
        }
    }

    /// Duty loop: one decision cycle, then the polling interval.  Never returns.
    pub async fn run(mut self) {
        info!(
            "Actuator: controller started, polling every {:?}",
            self.rules.polling
        );
        loop {
            self.run_cycle().await;
            self.delay.sleep(self.rules.polling).await;
        }
    }

    /// One decision cycle against the latest published reading.
    ///
    /// Returns `None` when nothing has been published yet.
    pub async fn run_cycle(&mut self) -> Option<CycleReport> {
        let Some(reading) = self.state.borrow().latest().cloned() else {
            debug!("Actuator: no reading published yet, skipping cycle");
            return None;
        };
        let r = self.rules;
        let mut report = CycleReport::default();

        if whole(reading.light_pct) < r.darkness_pct {
            info!("Actuator: it's nighttime, pausing actuators until dawn");
            report.gated = true;
            report.gate_samples = self.wait_until_dawn().await;
        } else {
            if whole(reading.soil_pct) > r.aridity_limit_pct {
                info!("Actuator: dry soil detected, watering");
                report.irrigation =
                    Some(self.bank.run(Actuator::Irrigation, r.irrigation_hold).await);
            }

            let cause = if whole(reading.humidity_pct) > r.humidity_vent_pct {
                Some(VentCause::Humidity)
            } else if whole(reading.temperature_c) > r.temperature_vent_c {
                Some(VentCause::Temperature)
            } else {
                None
            };
            if let Some(cause) = cause {
                info!("Actuator: ventilating ({:?})", cause);
                let outcome = self.bank.run(Actuator::Ventilation, r.ventilation_hold).await;
                report.ventilation = Some((cause, outcome));
            }
        }

        let t = reading.temperature_c;
        if whole(t) > r.temperature_high_c {
            self.journal
                .borrow_mut()
                .record(&format!("Temperature too high: {t}C"));
            report.alert = Some(TemperatureAlert::High(t));
        } else if whole(t) < r.temperature_low_c {
            self.journal
                .borrow_mut()
                .record(&format!("Temperature too low: {t}C"));
            report.alert = Some(TemperatureAlert::Low(t));
        }

        Some(report)
    }

    /// Sample light until it reaches the darkness threshold, sleeping
    /// `dawn_poll` between samples.  A failed sample counts as dark.
    /// Returns the number of samples taken.
    async fn wait_until_dawn(&mut self) -> u32 {
        let mut samples = 0u32;
        loop {
            samples += 1;
            match self.light.sample_light() {
                Ok(light) if light >= self.rules.darkness_pct => break,
                Ok(light) => debug!("Actuator: light {}%, still dark", light),
                Err(fault) => warn!("Actuator: {}, treating as dark", fault),
            }
            self.delay.sleep(self.rules.dawn_poll).await;
        }
        info!("Actuator: dawn has been reached");
        samples
    }
}
