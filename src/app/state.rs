//! Shared controller state: the latest reading and the rolling history.
//!
//! # Concurrency contract
//!
//! [`SharedState`] is an `Rc<RefCell<StateStore>>` handed to every duty.
//! All duties run on one cooperative executor and only yield at `.await`
//! points, so a `borrow_mut()` taken and released between two awaits is
//! atomic with respect to every other duty.  No borrow may be held across
//! an `.await`.  Moving the duties onto preemptive threads requires
//! replacing the `RefCell` with a mutex.

use std::cell::RefCell;
use std::rc::Rc;

use heapless::Deque;

use crate::config::HISTORY_MAX;
use crate::reading::Reading;

// ── RollingWindow ─────────────────────────────────────────────

/// Fixed-capacity FIFO.  Pushing onto a full window evicts the oldest item.
///
/// `N` sizes the backing storage; `limit` (`1..=N`) is the configured
/// capacity actually enforced.
pub struct RollingWindow<T, const N: usize> {
    items: Deque<T, N>,
    limit: usize,
}

impl<T, const N: usize> RollingWindow<T, N> {
    pub fn new(limit: usize) -> Self {
        Self {
            items: Deque::new(),
            limit: limit.clamp(1, N),
        }
    }

    /// Append at the tail; returns the evicted head when the window was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.limit {
            self.items.pop_front()
        } else {
            None
        };
        // len < limit <= N here, so there is always room.
        let _ = self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.limit
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

// ── StateStore ────────────────────────────────────────────────

/// Column-wise transpose of the history, for client-side charting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSeries {
    /// `1..=len`, one point per stored reading.
    pub axis: Vec<u16>,
    pub soil: Vec<f32>,
    pub light: Vec<f32>,
    pub temperature: Vec<f32>,
    pub humidity: Vec<f32>,
}

/// Latest reading, rolling history and the pre-rendered summary fragment.
pub struct StateStore {
    history: RollingWindow<Reading, HISTORY_MAX>,
    summary: String,
    published: u64,
}

pub type SharedState = Rc<RefCell<StateStore>>;

impl StateStore {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history: RollingWindow::new(history_capacity),
            summary: String::new(),
            published: 0,
        }
    }

    pub fn shared(history_capacity: usize) -> SharedState {
        Rc::new(RefCell::new(Self::new(history_capacity)))
    }

    /// Publish one complete reading together with its rendered summary.
    ///
    /// The reading becomes [`latest`](Self::latest) and enters the history
    /// in the same step, so no reader can observe one without the other.
    pub fn publish(&mut self, reading: Reading, summary: String) {
        self.history.push(reading);
        self.summary = summary;
        self.published += 1;
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.history.newest()
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Reading> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Summary fragment cached from the most recent acquisition; empty
    /// before the first one.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Number of readings published since start-up.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// The axis is clamped to the number of stored readings, so every
    /// column has the same length.
    pub fn graph_series(&self) -> GraphSeries {
        let mut g = GraphSeries::default();
        for (i, r) in self.history.iter().enumerate() {
            g.axis.push(i as u16 + 1);
            g.soil.push(r.soil_pct);
            g.light.push(r.light_pct);
            g.temperature.push(r.temperature_c);
            g.humidity.push(r.humidity_pct);
        }
        g
    }
}
