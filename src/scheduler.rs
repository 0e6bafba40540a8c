//! Cooperative duty runtime.
//!
//! All duties run as tasks on one `edge_executor::LocalExecutor`, driven
//! on the calling thread by `futures_lite::future::block_on`; timers and
//! socket readiness come from the `async-io-mini` reactor.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  block_on(executor.run(..))                                  │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  edge_executor::LocalExecutor                          │  │
//! │  │                                                        │  │
//! │  │  ┌──────────┐ ┌───────────┐ ┌──────────┐ ┌──────────┐  │  │
//! │  │  │ Logging  │ │ Actuation │ │ Serving  │ │ Link     │  │  │
//! │  │  │ 30/60/300│ │ 1800 s ⏱  │ │ accept   │ │ 600 s ⏱  │  │  │
//! │  │  └──────────┘ └───────────┘ └──────────┘ └──────────┘  │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A duty only yields at its own `.await` points, which is what lets the
//! shared state and journal live in plain `Rc<RefCell<..>>`.  No duty is
//! restarted when it ends; the others keep running.

use core::fmt;
use core::future::Future;
use std::cell::RefCell;
use std::rc::Rc;

use edge_executor::LocalExecutor;
use log::{error, info, warn};

use crate::error::{Fault, StorageFault};

/// Task slots on the executor; four duties plus headroom.
pub const MAX_TASKS: usize = 8;

/// The long-running duties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duty {
    Logging,
    Actuation,
    Serving,
    LinkHealth,
}

impl fmt::Display for Duty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logging => write!(f, "logging"),
            Self::Actuation => write!(f, "actuation"),
            Self::Serving => write!(f, "serving"),
            Self::LinkHealth => write!(f, "link-health"),
        }
    }
}

/// How a duty ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyExit {
    /// Returned without a fault.
    Finished,
    /// Stopped by a fault.
    Failed(Fault),
}

impl From<()> for DutyExit {
    fn from((): ()) -> Self {
        Self::Finished
    }
}

impl From<Fault> for DutyExit {
    fn from(fault: Fault) -> Self {
        Self::Failed(fault)
    }
}

impl From<StorageFault> for DutyExit {
    fn from(fault: StorageFault) -> Self {
        Self::Failed(fault.into())
    }
}

pub struct Scheduler<'a> {
    executor: LocalExecutor<'a, MAX_TASKS>,
    ended: Rc<RefCell<Vec<(Duty, DutyExit)>>>,
    spawned: usize,
}

impl Default for Scheduler<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Scheduler<'a> {
    pub fn new() -> Self {
        Self {
            executor: LocalExecutor::new(),
            ended: Rc::new(RefCell::new(Vec::new())),
            spawned: 0,
        }
    }

    /// Start `duty`.  How it ended, if it ever does, is logged and recorded.
    pub fn spawn<T, F>(&mut self, duty: Duty, fut: F)
    where
        T: Into<DutyExit> + 'a,
        F: Future<Output = T> + 'a,
    {
        let ended = self.ended.clone();
        self.executor
            .spawn(async move {
                let exit: DutyExit = fut.await.into();
                match exit {
                    DutyExit::Finished => warn!("Scheduler: {} duty ended", duty),
                    DutyExit::Failed(fault) => {
                        error!("Scheduler: {} duty stopped: {}", duty, fault);
                    }
                }
                ended.borrow_mut().push((duty, exit));
            })
            .detach();
        self.spawned += 1;
        info!("Scheduler: {} duty started", duty);
    }

    /// Duties that have finished, in the order they ended.
    pub fn ended(&self) -> Vec<Duty> {
        self.ended.borrow().iter().map(|&(duty, _)| duty).collect()
    }

    /// How `duty` ended, if it has.
    pub fn exit_of(&self, duty: Duty) -> Option<DutyExit> {
        self.ended
            .borrow()
            .iter()
            .find(|&&(d, _)| d == duty)
            .map(|&(_, exit)| exit)
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Drive every duty until `until` completes.
    pub fn run_until<T>(&self, until: impl Future<Output = T>) -> T {
        futures_lite::future::block_on(self.executor.run(until))
    }

    /// Drive every duty forever.
    pub fn run(&self) {
        info!("Scheduler: running {} duties", self.spawned);
        self.run_until(core::future::pending::<()>());
    }
}
