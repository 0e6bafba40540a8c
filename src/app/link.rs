//! Link-health duty and start-up time sync.
//!
//! Every check interval the link is probed; on loss it is reconnected with
//! a bounded number of attempts and exponential backoff (2 s → 4 s → 8 s …
//! capped at 60 s).  Recovery journals `"Network reconnected"`; running out
//! of attempts journals the [`LinkFault`] and waits for the next check.

use core::time::Duration;

use log::{info, warn};

use super::journal::SharedJournal;
use super::ports::{Delay, LinkPort};
use crate::error::LinkFault;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u8,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
        }
    }
}

/// Outcome of one link check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCheck {
    Healthy,
    Reconnected { attempts: u8 },
    Down(LinkFault),
}

pub struct LinkMonitor<L, D> {
    link: L,
    journal: SharedJournal,
    delay: D,
    interval: Duration,
    retry: RetryPolicy,
}

impl<L: LinkPort, D: Delay> LinkMonitor<L, D> {
    pub fn new(
        link: L,
        journal: SharedJournal,
        delay: D,
        interval: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            link,
            journal,
            delay,
            interval,
            retry,
        }
    }

    /// Duty loop: check, then wait the check interval.  Never returns.
    pub async fn run(mut self) {
        info!("Link: monitor started, checking every {:?}", self.interval);
        loop {
            self.check().await;
            self.delay.sleep(self.interval).await;
        }
    }

    pub async fn check(&mut self) -> LinkCheck {
        if self.link.is_connected() {
            return LinkCheck::Healthy;
        }
        warn!("Link: connection lost, reconnecting");
        match self.retry_with_backoff(L::reconnect).await {
            Ok(attempts) => {
                self.journal.borrow_mut().record("Network reconnected");
                LinkCheck::Reconnected { attempts }
            }
            Err(attempts) => {
                let fault = LinkFault::ReconnectFailed { attempts };
                self.journal.borrow_mut().record(&fault.to_string());
                LinkCheck::Down(fault)
            }
        }
    }

    /// Synchronise the wall clock, retrying with backoff.
    pub async fn sync_time(&mut self) -> Result<(), LinkFault> {
        match self.retry_with_backoff(L::sync_time).await {
            Ok(_) => {
                info!("Link: time synced");
                Ok(())
            }
            Err(attempts) => {
                let fault = LinkFault::TimeSyncFailed { attempts };
                self.journal.borrow_mut().record(&fault.to_string());
                Err(fault)
            }
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// `Ok(attempts used)` on success, `Err(attempts made)` when exhausted.
    async fn retry_with_backoff(
        &mut self,
        mut op: impl FnMut(&mut L) -> std::io::Result<()>,
    ) -> Result<u8, u8> {
        let mut backoff = self.retry.initial_backoff;
        for attempt in 1..=self.retry.attempts {
            match op(&mut self.link) {
                Ok(()) => return Ok(attempt),
                Err(e) => {
                    warn!(
                        "Link: attempt {}/{} failed ({}), backoff {:?}",
                        attempt, self.retry.attempts, e, backoff
                    );
                }
            }
            if attempt < self.retry.attempts {
                self.delay.sleep(backoff).await;
                backoff = (backoff * 2).min(self.retry.max_backoff);
            }
        }
        Err(self.retry.attempts)
    }
}
