//! Request-line parsing, header draining and routing.
//!
//! Only the first line of a request is inspected.  The headers are still
//! read off the stream (up to the blank line) before any response is
//! written.

use futures_lite::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::app::actuation::Actuator;
use crate::error::RequestFault;

/// Most header lines drained before the request is rejected.
pub const MAX_HEADER_LINES: usize = 100;

/// Longest request or header line accepted, terminator included.
pub const MAX_LINE_BYTES: usize = 8 * 1024;

/// Pages the server knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/` and anything unrecognised.
    Home,
    /// `/relay1/on`, `/relay2/on`: diagnostic relay pulse.
    RelayTest(Actuator),
    /// `/logs/list`: history table.
    LogList,
    /// `/logs/monitor`: notification list with auto-refresh.
    Monitor,
}

const ROUTES: [(&str, Route); 4] = [
    ("/relay1/on", Route::RelayTest(Actuator::Irrigation)),
    ("/relay2/on", Route::RelayTest(Actuator::Ventilation)),
    ("/logs/list", Route::LogList),
    ("/logs/monitor", Route::Monitor),
];

impl Route {
    /// Map a method and target to a page.  Only `GET` reaches the
    /// non-home pages; targets match by prefix.
    pub fn resolve(method: &str, target: &str) -> Self {
        if method != "GET" {
            return Self::Home;
        }
        ROUTES
            .iter()
            .find(|(path, _)| target.starts_with(path))
            .map_or(Self::Home, |&(_, route)| route)
    }
}

/// `METHOD TARGET [VERSION]`, borrowed from the raw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub target: &'a str,
}

impl RequestLine<'_> {
    pub fn route(&self) -> Route {
        Route::resolve(self.method, self.target)
    }
}

pub fn parse_request_line(raw: &[u8]) -> Result<RequestLine<'_>, RequestFault> {
    let line = core::str::from_utf8(raw)
        .map_err(|_| RequestFault::Malformed("request line is not UTF-8"))?
        .trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(RequestFault::Malformed("empty request line"));
    }
    let mut parts = line.split_ascii_whitespace();
    let method = parts
        .next()
        .ok_or(RequestFault::Malformed("missing method"))?;
    let target = parts
        .next()
        .ok_or(RequestFault::Malformed("missing target"))?;
    Ok(RequestLine { method, target })
}

/// Read the request line and drain the headers.
pub async fn read_request<R>(reader: &mut R) -> Result<Route, RequestFault>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::with_capacity(128);
    read_line(reader, &mut line).await?;
    let route = parse_request_line(&line)?.route();

    let mut drained = 0usize;
    loop {
        let n = read_line(reader, &mut line).await?;
        if n == 0 || line == b"\r\n" || line == b"\n" {
            break;
        }
        drained += 1;
        if drained > MAX_HEADER_LINES {
            return Err(RequestFault::TooManyHeaders);
        }
    }

    Ok(route)
}

/// One line into `line` (cleared first), never buffering more than
/// [`MAX_LINE_BYTES`].  Returns the bytes read; 0 at EOF.
async fn read_line<R>(reader: &mut R, line: &mut Vec<u8>) -> Result<usize, RequestFault>
where
    R: AsyncBufRead + Unpin,
{
    line.clear();
    let n = (&mut *reader)
        .take(MAX_LINE_BYTES as u64)
        .read_until(b'\n', line)
        .await?;
    if n == MAX_LINE_BYTES && line.last() != Some(&b'\n') {
        return Err(RequestFault::Malformed("line too long"));
    }
    Ok(n)
}
