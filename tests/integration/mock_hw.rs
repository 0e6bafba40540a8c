//! Mock adapters for integration tests.
//!
//! Every mock records what the domain asked of it so tests can assert on
//! the full history without real pins, sockets or timers.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use futures_lite::io::{AsyncRead, AsyncWrite};

use greenhouse::adapters::files::MemLineStore;
use greenhouse::app::actuation::Actuator;
use greenhouse::app::journal::{NotificationJournal, SharedJournal};
use greenhouse::app::ports::{
    ActuatorPort, AnalogChannel, ClimateSample, ClockPort, Delay, Listener, SensorPort,
};
use greenhouse::error::{ActuatorError, SensorError};
use greenhouse::reading::{Reading, Stamp};

// ── Clock ─────────────────────────────────────────────────────

pub struct FixedClock;

pub fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 12, 13)
        .unwrap()
        .and_hms_opt(12, 30, 5)
        .unwrap()
}

impl ClockPort for FixedClock {
    fn now(&self) -> NaiveDateTime {
        noon()
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Records every sleep and yields once instead of waiting.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    pub sleeps: Rc<RefCell<Vec<Duration>>>,
}

#[allow(dead_code)]
impl RecordingDelay {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.sleeps.borrow().len()
    }
}

impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        futures_lite::future::yield_now().await;
    }
}

// ── Sensors ───────────────────────────────────────────────────

/// Raw analog value whose normalized percentage is `pct`.
pub fn raw(pct: f32) -> u16 {
    (pct / 100.0 * 65535.0).round() as u16
}

/// Fixed soil/climate values and a scripted light sequence.  Once the
/// script runs out the last light value repeats.
pub struct ScriptedSensors {
    pub soil: u16,
    pub light: VecDeque<u16>,
    pub last_light: u16,
    pub climate: Result<ClimateSample, SensorError>,
    pub light_reads: u32,
}

#[allow(dead_code)]
impl ScriptedSensors {
    pub fn new(soil_pct: f32, light_pct: f32, temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            soil: raw(soil_pct),
            light: VecDeque::new(),
            last_light: raw(light_pct),
            climate: Ok(ClimateSample {
                temperature_c,
                humidity_pct,
            }),
            light_reads: 0,
        }
    }

    pub fn with_light_script(mut self, pcts: &[f32]) -> Self {
        self.light = pcts.iter().map(|p| raw(*p)).collect();
        self
    }

    pub fn failing_climate(mut self, e: SensorError) -> Self {
        self.climate = Err(e);
        self
    }
}

impl SensorPort for ScriptedSensors {
    fn read_analog(&mut self, channel: AnalogChannel) -> Result<u16, SensorError> {
        match channel {
            AnalogChannel::Soil => Ok(self.soil),
            AnalogChannel::Light => {
                self.light_reads += 1;
                if let Some(v) = self.light.pop_front() {
                    self.last_light = v;
                }
                Ok(self.last_light)
            }
        }
    }

    fn read_climate(&mut self) -> Result<ClimateSample, SensorError> {
        self.climate
    }
}

// ── Outputs ───────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingOutputs {
    pub calls: Rc<RefCell<Vec<(Actuator, bool)>>>,
}

#[allow(dead_code)]
impl RecordingOutputs {
    pub fn calls(&self) -> Vec<(Actuator, bool)> {
        self.calls.borrow().clone()
    }

    pub fn switched_on(&self, actuator: Actuator) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|&&(a, on)| a == actuator && on)
            .count()
    }
}

impl ActuatorPort for RecordingOutputs {
    fn set(&mut self, actuator: Actuator, on: bool) -> Result<(), ActuatorError> {
        self.calls.borrow_mut().push((actuator, on));
        Ok(())
    }
}

// ── Connections ───────────────────────────────────────────────

/// One scripted client: fixed request bytes in, response bytes captured.
#[derive(Clone)]
pub struct MockConn {
    input: Rc<RefCell<VecDeque<u8>>>,
    pub output: Rc<RefCell<Vec<u8>>>,
    pub closed: Rc<Cell<bool>>,
}

#[allow(dead_code)]
impl MockConn {
    pub fn new(request: &str) -> Self {
        Self {
            input: Rc::new(RefCell::new(request.bytes().collect())),
            output: Rc::new(RefCell::new(Vec::new())),
            closed: Rc::new(Cell::new(false)),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(&format!(
            "GET {path} HTTP/1.1\r\nHost: greenhouse\r\nAccept: text/html\r\n\r\n"
        ))
    }

    pub fn response(&self) -> String {
        String::from_utf8_lossy(&self.output.borrow()).into_owned()
    }

    pub fn unread(&self) -> usize {
        self.input.borrow().len()
    }
}

impl AsyncRead for MockConn {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let mut input = self.input.borrow_mut();
        let n = buf.len().min(input.len());
        for (slot, byte) in buf.iter_mut().zip(input.drain(..n)) {
            *slot = byte;
        }
        Poll::Ready(Ok(n))
    }
}

impl AsyncWrite for MockConn {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.output.borrow_mut().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.closed.set(true);
        Poll::Ready(Ok(()))
    }
}

/// Hands out queued connections, then waits forever.
#[derive(Default)]
pub struct MockListener {
    pub queue: RefCell<VecDeque<io::Result<MockConn>>>,
}

#[allow(dead_code)]
impl MockListener {
    pub fn with(conns: Vec<io::Result<MockConn>>) -> Self {
        Self {
            queue: RefCell::new(conns.into()),
        }
    }
}

impl Listener for MockListener {
    type Conn = MockConn;

    async fn accept(&self) -> io::Result<MockConn> {
        let next = self.queue.borrow_mut().pop_front();
        match next {
            Some(conn) => conn,
            None => futures_lite::future::pending().await,
        }
    }
}

// ── Shared fixtures ───────────────────────────────────────────

/// Journal over an in-memory file; returns the file handle for inspection.
pub fn journal() -> (SharedJournal, MemLineStore) {
    let file = MemLineStore::new();
    let j = NotificationJournal::shared(10, Box::new(file.clone()), Rc::new(FixedClock));
    (j, file)
}

pub fn reading(soil_pct: f32, light_pct: f32, temperature_c: f32, humidity_pct: f32) -> Reading {
    Reading::new(
        Stamp::from_datetime(&noon()),
        soil_pct,
        light_pct,
        temperature_c,
        humidity_pct,
    )
}

#[allow(dead_code)]
pub fn journal_messages(j: &SharedJournal) -> Vec<String> {
    j.borrow()
        .entries()
        .map(|e| e.message.as_str().to_owned())
        .collect()
}
