//! End-to-end event folding: raw server frames through a fake link.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Once;

use pretty_assertions::assert_eq;
use research_app::{ClientConfig, Connector, Link, SessionController};
use research_core::{StageStatus, TaskState, INITIALIZING_STAGE_ID};
use research_transport::TransportEvent;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        client_logging::initialize_for_tests();
    });
}

#[derive(Default)]
struct FakeWire {
    sent: Vec<String>,
    inbox: VecDeque<TransportEvent>,
}

struct FakeLink {
    wire: Rc<RefCell<FakeWire>>,
}

impl Link for FakeLink {
    fn send_text(&self, text: String) {
        self.wire.borrow_mut().sent.push(text);
    }

    fn close(&self) {}

    fn try_recv(&self) -> Option<TransportEvent> {
        self.wire.borrow_mut().inbox.pop_front()
    }
}

struct FakeConnector {
    wire: Rc<RefCell<FakeWire>>,
}

impl Connector for FakeConnector {
    fn open(&mut self) -> Box<dyn Link> {
        Box::new(FakeLink {
            wire: self.wire.clone(),
        })
    }
}

/// Controller that is already connected with a run in flight.
fn running_controller() -> (SessionController, Rc<RefCell<FakeWire>>) {
    init_logging();
    let wire = Rc::new(RefCell::new(FakeWire::default()));
    let mut controller = SessionController::with_connector(
        ClientConfig::default(),
        Box::new(FakeConnector { wire: wire.clone() }),
    );
    controller.connect();
    wire.borrow_mut().inbox.push_back(TransportEvent::Opened);
    controller.pump();
    controller.start_research("rust testing");
    (controller, wire)
}

fn push_frame(wire: &Rc<RefCell<FakeWire>>, kind: &str, data: serde_json::Value) {
    let frame = serde_json::json!({
        "type": kind,
        "data": data,
        "timestamp": "2026-08-29T12:00:00Z",
    });
    wire.borrow_mut()
        .inbox
        .push_back(TransportEvent::Message(frame.to_string()));
}

#[test]
fn full_run_folds_into_a_complete_snapshot() {
    let (mut controller, wire) = running_controller();

    push_frame(&wire, "research_started", serde_json::json!({}));
    push_frame(&wire, "guardrail_started", serde_json::json!({"stage_id": "g1"}));
    push_frame(
        &wire,
        "guardrail_complete",
        serde_json::json!({"stage_id": "g1", "is_acceptable": true}),
    );
    push_frame(
        &wire,
        "search_and_filter_started",
        serde_json::json!({"stage_id": "s1", "query": "rust testing"}),
    );
    push_frame(
        &wire,
        "progress",
        serde_json::json!({"current_step": 1, "total_steps": 5}),
    );
    push_frame(
        &wire,
        "search_and_filter_completed",
        serde_json::json!({
            "stage_id": "s1",
            "total_results": 10,
            "relevant_count": 4,
            "filtered_out": 6,
            "results": [{"title": "A", "url": "https://a.example"}],
        }),
    );
    push_frame(&wire, "writing_started", serde_json::json!({"stage_id": "w1"}));
    push_frame(&wire, "writing_complete", serde_json::json!({"stage_id": "w1"}));
    push_frame(
        &wire,
        "complete",
        serde_json::json!({"response": "Rust testing is great."}),
    );

    assert!(controller.pump());

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.task, TaskState::Complete);
    assert_eq!(snapshot.response.as_deref(), Some("Rust testing is great."));
    assert_eq!(snapshot.current_step, 1);
    assert_eq!(snapshot.total_steps, 5);

    let ids: Vec<&str> = snapshot.stages.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![INITIALIZING_STAGE_ID, "g1", "s1", "w1"]);
    assert!(snapshot
        .stages
        .iter()
        .all(|stage| stage.status == StageStatus::Completed));
    assert_eq!(snapshot.stages[2].title, "Search & Filter: rust testing");
}

#[test]
fn malformed_and_unknown_frames_are_dropped() {
    let (mut controller, wire) = running_controller();
    let before = controller.snapshot();

    wire.borrow_mut()
        .inbox
        .push_back(TransportEvent::Message("not json at all".to_string()));
    push_frame(&wire, "brand_new_event_kind", serde_json::json!({"x": 1}));
    // Recognized kind with an undecodable payload.
    push_frame(&wire, "progress", serde_json::json!({"current_step": "three"}));

    controller.pump();
    assert_eq!(controller.snapshot(), before);

    // A valid frame afterwards still applies.
    push_frame(
        &wire,
        "progress",
        serde_json::json!({"current_step": 2, "total_steps": 4}),
    );
    controller.pump();
    assert_eq!(controller.snapshot().current_step, 2);
}

#[test]
fn server_stop_acknowledgement_sweeps_open_stages() {
    let (mut controller, wire) = running_controller();
    push_frame(
        &wire,
        "scrape_started",
        serde_json::json!({"stage_id": "c1", "url": "https://a.example"}),
    );
    controller.pump();

    controller.stop_research();
    assert_eq!(
        wire.borrow().sent.last().map(String::as_str),
        Some(r#"{"action":"stop"}"#)
    );
    // Nothing changes locally until the server acknowledges.
    assert_eq!(controller.snapshot().task, TaskState::Running);

    push_frame(&wire, "stopped", serde_json::json!({"has_data": true}));
    controller.pump();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.task, TaskState::Stopped);
    assert!(snapshot.stopped_with_data);
    let scrape = snapshot.stages.iter().find(|s| s.id == "c1").unwrap();
    assert_eq!(scrape.status, StageStatus::Failed);
    assert_eq!(scrape.error.as_deref(), Some("Research stopped"));
}
