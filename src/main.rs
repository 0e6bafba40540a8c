//! Greenhouse controller entry point.
//!
//! Hexagonal architecture with four cooperative duties on one executor.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimulatedSensors  RelayBoard     FsLineStore   UtcClock       │
//! │  (SensorPort)      (ActuatorPort) (LineStore)   (ClockPort)    │
//! │  TcpAcceptor       HostLink       JsonConfigFile TimerDelay    │
//! │  (Listener)        (LinkPort)     (ConfigPort)  (Delay)        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  DataLogger · ActuatorController · StateServer · Link  │    │
//! │  │        StateStore · NotificationJournal (shared)       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (edge-executor + async-io-mini reactor)             │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::cell::RefCell;
use std::net::SocketAddr;
use std::rc::Rc;

use anyhow::{Context, Result};
use log::{info, warn};

use greenhouse::adapters::config_file::JsonConfigFile;
use greenhouse::adapters::files::FsLineStore;
use greenhouse::adapters::hardware::{Polarity, RelayBoard, SimulatedSensors};
use greenhouse::adapters::link::HostLink;
use greenhouse::adapters::tcp::TcpAcceptor;
use greenhouse::adapters::time::{TimerDelay, UtcClock};
use greenhouse::app::acquisition::{DataLogger, SensorAcquisition};
use greenhouse::app::actuation::{ActuatorBank, ActuatorController, ControlRules};
use greenhouse::app::journal::NotificationJournal;
use greenhouse::app::link::{LinkMonitor, RetryPolicy};
use greenhouse::app::ports::{ClockPort, ConfigPort};
use greenhouse::app::state::StateStore;
use greenhouse::config::GreenhouseConfig;
use greenhouse::scheduler::{Duty, Scheduler};
use greenhouse::storage::{LogPolicy, LogStore};
use greenhouse::web::StateServer;
use greenhouse::web::server::ServerTiming;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Greenhouse v{}                   ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config (file or defaults) ──────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => match JsonConfigFile::new(&path).load() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Config load from {} failed ({}), using defaults", path, e);
                GreenhouseConfig::default()
            }
        },
        None => {
            info!("No config file given, using defaults");
            GreenhouseConfig::default()
        }
    };
    info!(
        "Logging every {:?}, polling every {:?}",
        config.logging_interval(),
        config.polling_interval()
    );

    // ── 3. Shared state ───────────────────────────────────────
    let clock: Rc<dyn ClockPort> = Rc::new(UtcClock);
    let state = StateStore::shared(config.history_capacity);
    let journal = NotificationJournal::shared(
        config.journal_capacity,
        Box::new(FsLineStore::new(&config.journal_path)),
        clock.clone(),
    );

    // ── 4. Hardware ───────────────────────────────────────────
    let sensors = Rc::new(RefCell::new(SimulatedSensors::default()));
    let bank = Rc::new(ActuatorBank::new(
        RelayBoard::new(Polarity::ActiveLow),
        journal.clone(),
        TimerDelay,
    ));
    bank.all_off();

    // ── 5. Network link + time sync ───────────────────────────
    let mut link = LinkMonitor::new(
        HostLink::new(),
        journal.clone(),
        TimerDelay,
        config.link_check_interval(),
        RetryPolicy::default(),
    );
    if let Err(e) = futures_lite::future::block_on(link.sync_time()) {
        warn!("{}, timestamps may be off", e);
    }

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen_addr {}", config.listen_addr))?;
    let listener =
        TcpAcceptor::bind(addr).with_context(|| format!("could not listen on {addr}"))?;

    // ── 6. Duties ─────────────────────────────────────────────
    let logger = DataLogger::new(
        SensorAcquisition::new(sensors.clone(), clock.clone()),
        LogStore::new(FsLineStore::new(&config.log_path), LogPolicy::from(&config)),
        state.clone(),
        journal.clone(),
        TimerDelay,
        config.logging_interval(),
    );
    let controller = ActuatorController::new(
        bank.clone(),
        SensorAcquisition::new(sensors, clock),
        state.clone(),
        journal.clone(),
        TimerDelay,
        ControlRules::from(&config),
    );
    let server = StateServer::new(
        listener,
        state,
        journal,
        bank,
        TimerDelay,
        ServerTiming {
            relay_test_hold: config.relay_test_hold(),
            refresh: config.logging_interval(),
        },
    );

    // ── 7. Run ────────────────────────────────────────────────
    let mut scheduler = Scheduler::new();
    scheduler.spawn(Duty::Logging, logger.run());
    scheduler.spawn(Duty::Actuation, controller.run());
    scheduler.spawn(Duty::Serving, server.run());
    scheduler.spawn(Duty::LinkHealth, link.run());

    info!("System ready.");
    scheduler.run();
    Ok(())
}
