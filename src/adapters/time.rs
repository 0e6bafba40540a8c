//! Time adapters.
//!
//! - [`UtcClock`]: calendar time from the system clock, always UTC.
//! - [`TimerDelay`]: cooperative sleeps on the `async-io-mini` reactor
//!   timer (wake-based, no busy-spinning).

use core::time::Duration;

use chrono::{NaiveDateTime, Utc};

use crate::app::ports::{ClockPort, Delay};

/// System wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct UtcClock;

impl ClockPort for UtcClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Reactor-driven delay.  Other executor tasks run while a sleep is pending.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimerDelay;

impl Delay for TimerDelay {
    async fn sleep(&self, duration: Duration) {
        async_io_mini::Timer::after(duration).await;
    }
}
