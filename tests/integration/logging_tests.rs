//! Logging-duty tests: publish/append ordering, sensor-fault skips, the
//! storage fail-stop and rotation through the duty.

use std::io;
use std::rc::Rc;
use std::time::Duration;

use futures_lite::future::{self, block_on};

use greenhouse::adapters::files::MemLineStore;
use greenhouse::app::acquisition::{DataLogger, LogCycle, SensorAcquisition};
use greenhouse::app::actuation::{Actuator, ActuatorBank, ActuatorController, ControlRules};
use greenhouse::app::journal::SharedJournal;
use greenhouse::app::state::{SharedState, StateStore};
use greenhouse::error::{Fault, SensorError, SensorKind, StorageOp};
use greenhouse::reading::Reading;
use greenhouse::scheduler::{Duty, DutyExit, Scheduler};
use greenhouse::storage::{LogPolicy, LogStore, RotationOutcome};

use crate::mock_hw::{
    FixedClock, RecordingDelay, RecordingOutputs, ScriptedSensors, journal, journal_messages,
};

type Logger = DataLogger<ScriptedSensors, MemLineStore, RecordingDelay>;

struct Rig {
    file: MemLineStore,
    delay: RecordingDelay,
    state: SharedState,
    journal: SharedJournal,
    logger: Logger,
}

fn rig(sensors: ScriptedSensors, policy: LogPolicy) -> Rig {
    let file = MemLineStore::new();
    let delay = RecordingDelay::default();
    let (journal, _jfile) = journal();
    let state = StateStore::shared(20);
    let logger = DataLogger::new(
        SensorAcquisition::new(sensors, Rc::new(FixedClock)),
        LogStore::new(file.clone(), policy),
        state.clone(),
        journal.clone(),
        delay.clone(),
        Duration::from_secs(30),
    );
    Rig {
        file,
        delay,
        state,
        journal,
        logger,
    }
}

fn healthy() -> ScriptedSensors {
    ScriptedSensors::new(45.0, 50.0, 20.0, 50.0)
}

#[test]
fn step_publishes_then_appends_one_line() {
    let mut r = rig(healthy(), LogPolicy::default());

    let outcome = r.logger.step().unwrap();
    assert!(matches!(
        outcome,
        LogCycle::Logged(RotationOutcome::WithinBudget { .. })
    ));

    let lines = r.file.lines();
    assert_eq!(lines.len(), 1);
    let logged = Reading::from_log_line(&lines[0]).unwrap();
    let state = r.state.borrow();
    assert_eq!(state.latest(), Some(&logged));
    assert_eq!(state.published(), 1);
    assert!(state.summary().contains("<li> Soil dryness: 45%</li>"));
    assert_eq!(lines[0], "12:30:5,13/12/2023,45,50,20,50");
}

#[test]
fn sensor_fault_skips_cycle_without_publishing() {
    let sensors = healthy().failing_climate(SensorError::ClimateReadFailed);
    let mut r = rig(sensors, LogPolicy::default());

    match r.logger.step().unwrap() {
        LogCycle::Skipped(fault) => assert_eq!(fault.sensor, SensorKind::Climate),
        other => panic!("expected a skipped cycle, got {other:?}"),
    }
    assert!(r.file.lines().is_empty());
    assert!(r.state.borrow().latest().is_none());
    assert_eq!(journal_messages(&r.journal).len(), 1);
}

#[test]
fn append_failure_stops_logging_after_publishing() {
    let r = rig(healthy(), LogPolicy::default());
    r.file.fail_appends(io::ErrorKind::StorageFull);

    let fault = block_on(r.logger.run());
    assert_eq!(fault.op, StorageOp::Append);
    assert_eq!(fault.kind, io::ErrorKind::StorageFull);

    // The reading was published before the append was attempted.
    assert_eq!(r.state.borrow().published(), 1);
    let messages = journal_messages(&r.journal);
    assert_eq!(messages[0], "Started sensor logging");
    assert!(messages[1].starts_with("Logging stopped unexpectedly: "));
    assert_eq!(messages.len(), 2);
    // Stopped at once, never slept.
    assert_eq!(r.delay.count(), 0);
}

#[test]
fn rotation_keeps_newest_lines() {
    let policy = LogPolicy {
        budget_kib: 1,
        reserve_pct: 0,
        keep_lines: 5,
    };
    let mut r = rig(healthy(), policy);

    let mut rotated = 0;
    for _ in 0..60 {
        if let LogCycle::Logged(RotationOutcome::Rotated { kept, .. }) = r.logger.step().unwrap() {
            assert_eq!(kept, 5);
            rotated += 1;
        }
    }
    assert!(rotated > 0);
    assert!(r.file.contents().len() as u64 <= policy.threshold_bytes());
    assert!(r.file.rewrites() >= 1);
    assert_eq!(r.file.appends(), 60);
}

#[test]
fn logging_stop_leaves_other_duties_running() {
    let r = rig(healthy(), LogPolicy::default());
    r.file.fail_appends(io::ErrorKind::PermissionDenied);

    let outputs = RecordingOutputs::default();
    let control_delay = RecordingDelay::default();
    let bank = Rc::new(ActuatorBank::new(
        outputs.clone(),
        r.journal.clone(),
        control_delay.clone(),
    ));
    let controller = ActuatorController::new(
        bank,
        SensorAcquisition::new(healthy(), Rc::new(FixedClock)),
        r.state.clone(),
        r.journal.clone(),
        control_delay.clone(),
        ControlRules::default(),
    );

    let mut s = Scheduler::new();
    s.spawn(Duty::Logging, r.logger.run());
    s.spawn(Duty::Actuation, controller.run());

    s.run_until(async {
        // Keep going until the controller has cycled a few times.
        while s.ended().is_empty() || control_delay.count() < 6 {
            future::yield_now().await;
        }
    });

    assert_eq!(s.ended(), vec![Duty::Logging]);
    match s.exit_of(Duty::Logging) {
        Some(DutyExit::Failed(Fault::Storage(fault))) => {
            assert_eq!(fault.op, StorageOp::Append);
            assert_eq!(fault.kind, io::ErrorKind::PermissionDenied);
        }
        other => panic!("unexpected logging exit: {other:?}"),
    }
    assert_eq!(s.exit_of(Duty::Actuation), None);
    assert!(outputs.switched_on(Actuator::Irrigation) >= 3);
}
