//! StateServer: the serial status-page duty.
//!
//! One connection at a time: read the request line, drain the headers,
//! render, write, close.  The relay-test pages pulse a relay through the
//! shared [`ActuatorBank`] and hold the connection until the pulse ends.
//! Any fault while serving is journaled and the connection dropped; the
//! accept loop itself never stops.

use core::time::Duration;
use std::rc::Rc;

use futures_lite::io::{AsyncWriteExt, BufReader};
use log::{debug, info, warn};

use super::render::{self, Page};
use super::request::{Route, read_request};
use crate::app::actuation::{Activation, Actuator, ActuatorBank};
use crate::app::journal::SharedJournal;
use crate::app::ports::{ActuatorPort, Delay, Listener};
use crate::app::state::SharedState;
use crate::error::RequestFault;

/// Pause after a failed accept before trying again.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerTiming {
    /// Relay pulse for the test pages.
    pub relay_test_hold: Duration,
    /// Monitor page reload period (the logging interval).
    pub refresh: Duration,
}

pub struct StateServer<L, H, D> {
    listener: L,
    state: SharedState,
    journal: SharedJournal,
    bank: Rc<ActuatorBank<H, D>>,
    delay: D,
    timing: ServerTiming,
}

impl<L, H, D> StateServer<L, H, D>
where
    L: Listener,
    H: ActuatorPort,
    D: Delay,
{
    pub fn new(
        listener: L,
        state: SharedState,
        journal: SharedJournal,
        bank: Rc<ActuatorBank<H, D>>,
        delay: D,
        timing: ServerTiming,
    ) -> Self {
        Self {
            listener,
            state,
            journal,
            bank,
            delay,
            timing,
        }
    }

    /// Accept loop.  Never returns.
    pub async fn run(self) {
        info!("Server: accepting connections");
        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    if let Err(fault) = self.serve(conn).await {
                        warn!("Server: {}", fault);
                        self.journal.borrow_mut().record(&fault.to_string());
                    }
                }
                Err(e) => {
                    warn!("Server: accept failed: {}", e);
                    self.delay.sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    /// Handle one connection end to end.
    pub async fn serve(&self, mut conn: L::Conn) -> Result<Route, RequestFault> {
        let route = {
            let mut reader = BufReader::new(&mut conn);
            read_request(&mut reader).await?
        };
        debug!("Server: {:?}", route);

        let body = self.respond(route).await;
        conn.write_all(render::RESPONSE_HEAD.as_bytes()).await?;
        conn.write_all(body.as_bytes()).await?;
        conn.flush().await?;
        conn.close().await?;
        Ok(route)
    }

    /// Perform the route's side effect (if any) and render its page.
    pub async fn respond(&self, route: Route) -> String {
        let relay_status = match route {
            Route::RelayTest(actuator) => Some(self.pulse(actuator).await),
            _ => None,
        };

        // No await below: the state and journal are read in one step.
        let state = self.state.borrow();
        let (title, status, content, notices) = match route {
            Route::Home => ("Home Page", String::new(), String::new(), String::new()),
            Route::RelayTest(actuator) => (
                match actuator {
                    Actuator::Irrigation => "Relay 1 has activated page",
                    Actuator::Ventilation => "Relay 2 has activated page",
                },
                relay_status.unwrap_or_default(),
                String::new(),
                String::new(),
            ),
            Route::LogList => (
                "Logs in a table page",
                "<p>Recent sensor logs reported:</p>".to_owned(),
                render::history_table(state.history()),
                String::new(),
            ),
            Route::Monitor => {
                let journal = self.journal.borrow();
                let mut notices = render::notification_list(journal.entries());
                notices.push_str(&render::refresh_script(self.timing.refresh));
                (
                    "Recent notifications of events page",
                    "Most recent notifications logged by date and time:".to_owned(),
                    String::new(),
                    notices,
                )
            }
        };

        render::page(
            &Page {
                title,
                status: &status,
                content: &content,
                notices: &notices,
            },
            state.summary(),
            &state.graph_series(),
        )
    }

    async fn pulse(&self, actuator: Actuator) -> String {
        let relay = actuator.index() + 1;
        match self.bank.run(actuator, self.timing.relay_test_hold).await {
            Activation::Completed => format!("Turned on relay{relay}"),
            Activation::AlreadyActive => format!("Relay{relay} is already running"),
            Activation::Failed(e) => format!("Relay{relay} could not be turned on: {e}"),
        }
    }
}
