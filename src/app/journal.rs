//! Notification journal: the user-visible record of events and faults.
//!
//! Every entry is kept in a bounded in-memory window (shown on the monitor
//! page) and appended to the journal file as `"<date> <time> <message>"`.
//! Recording never fails the caller; a persistence error is logged and
//! dropped.

use core::fmt::{self, Write as _};
use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};

use super::ports::{ClockPort, LineSink};
use super::state::RollingWindow;
use crate::config::JOURNAL_MAX;
use crate::reading::{SEPARATOR, Stamp};

/// Longest message kept, in bytes; longer ones are cut and end in
/// [`TRUNCATED`].
pub const MESSAGE_LEN: usize = 160;

/// Marks a cut message.
pub const TRUNCATED: &str = "...";

/// One timestamped journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEntry {
    pub stamp: Stamp,
    pub message: heapless::String<MESSAGE_LEN>,
}

impl fmt::Display for NotificationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.stamp.date, self.stamp.time, self.message)
    }
}

pub struct NotificationJournal {
    entries: RollingWindow<NotificationEntry, JOURNAL_MAX>,
    file: Box<dyn LineSink>,
    clock: Rc<dyn ClockPort>,
}

pub type SharedJournal = Rc<RefCell<NotificationJournal>>;

impl NotificationJournal {
    pub fn new(capacity: usize, file: Box<dyn LineSink>, clock: Rc<dyn ClockPort>) -> Self {
        Self {
            entries: RollingWindow::new(capacity),
            file,
            clock,
        }
    }

    pub fn shared(
        capacity: usize,
        file: Box<dyn LineSink>,
        clock: Rc<dyn ClockPort>,
    ) -> SharedJournal {
        Rc::new(RefCell::new(Self::new(capacity, file, clock)))
    }

    /// Stamp, store and persist one message.
    pub fn record(&mut self, message: &str) {
        let entry = NotificationEntry {
            stamp: Stamp::from_datetime(&self.clock.now()),
            message: sanitize(message),
        };

        let mut line = String::with_capacity(MESSAGE_LEN + 32);
        let _ = write!(line, "{entry}");
        info!("Journal: {}", line);

        if let Err(e) = self.file.append_line(&line) {
            warn!("Journal: could not persist entry: {}", e);
        }
        self.entries.push(entry);
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &NotificationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strip the field separator and fold line breaks so one message is always
/// one line of one field.
fn sanitize(message: &str) -> heapless::String<MESSAGE_LEN> {
    let mut out = heapless::String::new();
    for c in message.chars() {
        let c = match c {
            SEPARATOR => continue,
            '\r' | '\n' => ' ',
            c => c,
        };
        if out.push(c).is_err() {
            while out.len() + TRUNCATED.len() > MESSAGE_LEN {
                out.pop();
            }
            let _ = out.push_str(TRUNCATED);
            break;
        }
    }
    out
}
