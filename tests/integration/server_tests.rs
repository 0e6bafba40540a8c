//! Status-server tests over scripted connections.

use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use futures_lite::future::{self, block_on};

use greenhouse::app::actuation::{Actuator, ActuatorBank};
use greenhouse::app::journal::SharedJournal;
use greenhouse::app::state::{SharedState, StateStore};
use greenhouse::error::RequestFault;
use greenhouse::web::StateServer;
use greenhouse::web::render::RESPONSE_HEAD;
use greenhouse::web::request::Route;
use greenhouse::web::server::ServerTiming;

use crate::mock_hw::{
    MockConn, MockListener, RecordingDelay, RecordingOutputs, journal, journal_messages, reading,
};

type Server = StateServer<MockListener, RecordingOutputs, RecordingDelay>;

struct Rig {
    outputs: RecordingOutputs,
    delay: RecordingDelay,
    state: SharedState,
    journal: SharedJournal,
    server: Server,
}

fn rig(listener: MockListener) -> Rig {
    let outputs = RecordingOutputs::default();
    let delay = RecordingDelay::default();
    let (journal, _file) = journal();
    let state = StateStore::shared(20);
    let bank = Rc::new(ActuatorBank::new(
        outputs.clone(),
        journal.clone(),
        delay.clone(),
    ));
    let server = StateServer::new(
        listener,
        state.clone(),
        journal.clone(),
        bank,
        delay.clone(),
        ServerTiming {
            relay_test_hold: Duration::from_secs(1),
            refresh: Duration::from_secs(30),
        },
    );
    Rig {
        outputs,
        delay,
        state,
        journal,
        server,
    }
}

#[test]
fn home_page_is_written_and_connection_closed() {
    let r = rig(MockListener::default());
    let conn = MockConn::get("/");

    assert_eq!(block_on(r.server.serve(conn.clone())), Ok(Route::Home));

    let response = conn.response();
    assert!(response.starts_with(RESPONSE_HEAD));
    assert!(response.contains("<title>Home Page - "));
    assert!(response.contains("let data =\n[[],[],[],[],[]];"));
    assert!(conn.closed.get());
    assert_eq!(conn.unread(), 0);
}

#[test]
fn home_page_carries_latest_summary_and_graph() {
    let r = rig(MockListener::default());
    for soil in [10.0, 20.0] {
        let rd = reading(soil, 50.0, 21.5, 60.0);
        let summary = greenhouse::web::render::summary_fragment(&rd);
        r.state.borrow_mut().publish(rd, summary);
    }
    let conn = MockConn::get("/");
    block_on(r.server.serve(conn.clone())).unwrap();

    let response = conn.response();
    assert!(response.contains("<li> Soil dryness: 20%</li>"));
    assert!(!response.contains("<li> Soil dryness: 10%</li>"));
    assert!(response.contains("[[1,2],[10,20],[50,50],[21.5,21.5],[60,60]]"));
}

#[test]
fn relay_page_pulses_relay_and_journals() {
    let r = rig(MockListener::default());
    let conn = MockConn::get("/relay1/on");

    assert_eq!(
        block_on(r.server.serve(conn.clone())),
        Ok(Route::RelayTest(Actuator::Irrigation))
    );

    assert_eq!(
        r.outputs.calls(),
        vec![(Actuator::Irrigation, true), (Actuator::Irrigation, false)]
    );
    assert_eq!(r.delay.recorded(), vec![Duration::from_secs(1)]);
    let response = conn.response();
    assert!(response.contains("<title>Relay 1 has activated page"));
    assert!(response.contains("Turned on relay1"));
    assert_eq!(
        journal_messages(&r.journal),
        vec!["Relay 1 was turned on for 1 seconds.".to_owned()]
    );
}

#[test]
fn relay_two_path_drives_ventilation() {
    let r = rig(MockListener::default());
    let conn = MockConn::get("/relay2/on?from=menu");
    block_on(r.server.serve(conn.clone())).unwrap();
    assert_eq!(r.outputs.switched_on(Actuator::Ventilation), 1);
    assert!(conn.response().contains("Turned on relay2"));
}

#[test]
fn log_list_renders_history_rows() {
    let r = rig(MockListener::default());
    for i in 0..3 {
        r.state
            .borrow_mut()
            .publish(reading(i as f32, 50.0, 20.0, 50.0), String::new());
    }
    let conn = MockConn::get("/logs/list");
    block_on(r.server.serve(conn.clone())).unwrap();

    let response = conn.response();
    assert!(response.contains("<title>Logs in a table page"));
    // Header row plus one row per reading.
    assert_eq!(response.matches("<tr>").count(), 4);
}

#[test]
fn monitor_lists_notifications_and_schedules_reload() {
    let r = rig(MockListener::default());
    r.journal.borrow_mut().record("Network reconnected");
    let conn = MockConn::get("/logs/monitor");
    block_on(r.server.serve(conn.clone())).unwrap();

    let response = conn.response();
    assert!(response.contains("<title>Recent notifications of events page"));
    assert!(response.contains("<li>13/12/2023 12:30:5 Network reconnected</li>"));
    assert!(response.contains(",30000);</script>"));
}

#[test]
fn unknown_path_and_method_fall_back_to_home() {
    let r = rig(MockListener::default());
    let post = MockConn::new("POST /relay1/on HTTP/1.1\r\n\r\n");
    assert_eq!(block_on(r.server.serve(post)), Ok(Route::Home));
    let other = MockConn::get("/favicon.ico");
    assert_eq!(block_on(r.server.serve(other)), Ok(Route::Home));
    assert!(r.outputs.calls().is_empty());
}

#[test]
fn empty_request_is_malformed() {
    let r = rig(MockListener::default());
    let conn = MockConn::new("");
    assert!(matches!(
        block_on(r.server.serve(conn.clone())),
        Err(RequestFault::Malformed(_))
    ));
    assert!(conn.response().is_empty());
}

#[test]
fn accept_loop_survives_faults_and_keeps_serving() {
    let good = MockConn::get("/");
    let listener = MockListener::with(vec![
        Err(io::Error::from(io::ErrorKind::ConnectionReset)),
        Ok(MockConn::new("")),
        Ok(good.clone()),
    ]);
    let r = rig(listener);
    let served = Rc::new(Cell::new(false));

    let watcher = {
        let served = served.clone();
        let good = good.clone();
        async move {
            while !good.closed.get() {
                future::yield_now().await;
            }
            served.set(true);
        }
    };
    block_on(future::or(r.server.run(), watcher));

    assert!(served.get());
    assert!(good.response().starts_with(RESPONSE_HEAD));
    // Accept failure backs off; the malformed request is journaled.
    assert_eq!(r.delay.recorded(), vec![Duration::from_millis(500)]);
    let messages = journal_messages(&r.journal);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("malformed request"));
}
