//! Reading value type and its persisted line form.
//!
//! A [`Reading`] is one normalized snapshot of every sensor plus the
//! calendar stamp it was taken at.  On disk it is one comma-delimited line:
//!
//! ```text
//! time,date,soil_pct,light_pct,temperature_c,humidity_pct
//! 13:59:59,13/12/2023,41.27,63.5,21,48
//! ```
//!
//! Date and time are unpadded (`D/M/YYYY`, `H:M:S`) and always UTC.

use core::fmt::{self, Write as _};
use core::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike};
use heapless::String;

/// Longest stamped time, `23:59:59`.
pub const TIME_LEN: usize = 8;

/// Longest stamped date.  Wide enough for any year chrono can represent.
pub const DATE_LEN: usize = 16;

/// Field separator of the persisted line form.
pub const SEPARATOR: char = ',';

/// Full-scale value of the 16-bit analog primitives.
const ANALOG_FULL_SCALE: f32 = 65535.0;

// ── Stamp ─────────────────────────────────────────────────────

/// Calendar stamp in the controller's display format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub time: String<TIME_LEN>,
    pub date: String<DATE_LEN>,
}

impl Stamp {
    pub fn from_datetime(at: &NaiveDateTime) -> Self {
        let mut time = String::new();
        let mut date = String::new();
        // Both buffers are sized for the widest value chrono can produce.
        let _ = write!(time, "{}:{}:{}", at.hour(), at.minute(), at.second());
        let _ = write!(date, "{}/{}/{}", at.day(), at.month(), at.year());
        Self { time, date }
    }
}

// ── Reading ───────────────────────────────────────────────────

/// One complete acquisition cycle.  Never partially populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub time: String<TIME_LEN>,
    pub date: String<DATE_LEN>,
    pub soil_pct: f32,
    pub light_pct: f32,
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl Reading {
    pub fn new(
        stamp: Stamp,
        soil_pct: f32,
        light_pct: f32,
        temperature_c: f32,
        humidity_pct: f32,
    ) -> Self {
        Self {
            time: stamp.time,
            date: stamp.date,
            soil_pct,
            light_pct,
            temperature_c,
            humidity_pct,
        }
    }

    /// Persisted line form, without the record terminator.
    pub fn to_log_line(&self) -> std::string::String {
        self.to_string()
    }

    /// Parse one persisted line.  A trailing `\n` / `\r\n` is tolerated.
    pub fn from_log_line(line: &str) -> Result<Self, ParseError> {
        line.parse()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{time}{s}{date}{s}{soil}{s}{light}{s}{temp}{s}{hum}",
            s = SEPARATOR,
            time = self.time,
            date = self.date,
            soil = self.soil_pct,
            light = self.light_pct,
            temp = self.temperature_c,
            hum = self.humidity_pct,
        )
    }
}

impl FromStr for Reading {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut fields = line.split(SEPARATOR);
        let mut next = || fields.next().ok_or(ParseError::FieldCount);

        let time = String::try_from(next()?).map_err(|()| ParseError::FieldTooLong)?;
        let date = String::try_from(next()?).map_err(|()| ParseError::FieldTooLong)?;
        let soil_pct = parse_number(next()?)?;
        let light_pct = parse_number(next()?)?;
        let temperature_c = parse_number(next()?)?;
        let humidity_pct = parse_number(next()?)?;

        if fields.next().is_some() {
            return Err(ParseError::FieldCount);
        }

        Ok(Self {
            time,
            date,
            soil_pct,
            light_pct,
            temperature_c,
            humidity_pct,
        })
    }
}

fn parse_number(field: &str) -> Result<f32, ParseError> {
    field.trim().parse().map_err(|_| ParseError::BadNumber)
}

/// Why a persisted line could not be turned back into a [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Not exactly six separated fields.
    FieldCount,
    /// A measurement field is not a decimal number.
    BadNumber,
    /// The time or date field is wider than any stamp.
    FieldTooLong,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount => write!(f, "expected 6 fields"),
            Self::BadNumber => write!(f, "measurement is not a number"),
            Self::FieldTooLong => write!(f, "time/date field too long"),
        }
    }
}

impl std::error::Error for ParseError {}

// ── Normalization ─────────────────────────────────────────────

/// Map a raw 16-bit analog sample onto 0–100 %, rounded to two decimals.
pub fn normalize_pct(raw: u16) -> f32 {
    round2(f32::from(raw) / ANALOG_FULL_SCALE * 100.0)
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}
