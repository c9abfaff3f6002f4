//! Integration test: drive a full edit → debounce → dispatch → settle →
//! coalesced follow-up cycle against a scripted backend and virtual clock,
//! and verify the view transform ends up fitted to the mounted graph.

use profgraph_core::session::{GenerateOutcome, GenerateRequest, ViewerSession};
use profgraph_core::status::{Status, StatusKind};
use profgraph_protocol::{InputSource, Size};

const SVG: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#,
    "\n",
    r#"<svg width="600" height="300" xmlns="http://www.w3.org/2000/svg"></svg>"#,
);

/// Scripted stand-in for the HTTP backend: records every dispatched
/// request and plays back a queue of canned outcomes.
struct ScriptedBackend {
    dispatched: Vec<GenerateRequest>,
    outcomes: Vec<GenerateOutcome>,
}

impl ScriptedBackend {
    fn new(outcomes: Vec<GenerateOutcome>) -> Self {
        Self {
            dispatched: Vec::new(),
            outcomes,
        }
    }

    fn dispatch(&mut self, request: GenerateRequest) -> GenerateOutcome {
        self.dispatched.push(request);
        self.outcomes.remove(0)
    }
}

#[test]
fn edit_generate_coalesce_and_fit() {
    let mut session = ViewerSession::new();
    let mut backend = ScriptedBackend::new(vec![
        GenerateOutcome::Svg(SVG.into()),
        GenerateOutcome::Svg(SVG.into()),
    ]);

    session.set_source(
        InputSource::from_bytes("bench.pstats", b"fake profile".to_vec()),
        0.0,
    );
    assert_eq!(session.status(), &Status::success("Detected format: pstats"));

    // Rapid slider edits; nothing dispatches during the quiet period.
    for step in 1..=10 {
        session.options_mut().node_threshold = f64::from(step) * 5.0;
        session.options_changed(f64::from(step) * 20.0);
        assert!(session.poll(f64::from(step) * 20.0 + 1.0).is_none());
    }

    // One debounced dispatch, carrying the final slider value.
    let request = session.poll(600.0).expect("debounce fires at 200+400ms");
    assert!((request.options.node_threshold - 50.0).abs() < f64::EPSILON);
    assert_eq!(session.status(), &Status::info("Generating..."));

    // An edit lands while the request is in flight: coalesced, not queued.
    session.options_mut().edge_threshold = 12.0;
    session.options_changed(650.0);
    assert!(session.poll(2_000.0).is_none(), "no second in-flight request");

    // First request settles; the stale result still mounts.
    let outcome = backend.dispatch(request);
    session.apply_outcome(outcome, 2_000.0);
    assert_eq!(session.status(), &Status::success("Ready"));
    assert!(session.mounted().is_some());

    // Deferred fit: the host measures the laid-out content and fits.
    assert!(session.take_pending_fit());
    let container = Size::new(1200.0, 900.0);
    let mounted = session.mounted().expect("mounted above");
    let scale = session.viewport().scale();
    let on_screen = Size::new(mounted.width * scale, mounted.height * scale);
    session.viewport_mut().fit_to_view(container, on_screen);
    // 600x300 into 1200x900: width limits, 2.0 * 0.95.
    assert!((session.viewport().scale() - 1.9).abs() < 1e-9);

    // The coalesced follow-up fires one debounce after completion and
    // carries the mid-flight edit.
    let follow_up = session.poll(2_400.0).expect("follow-up dispatch");
    assert!((follow_up.options.edge_threshold - 12.0).abs() < f64::EPSILON);
    let outcome = backend.dispatch(follow_up);
    session.apply_outcome(outcome, 2_500.0);

    assert_eq!(backend.dispatched.len(), 2);
    assert!(session.poll(100_000.0).is_none(), "nothing left to dispatch");
}

#[test]
fn network_failure_then_recovery() {
    let mut session = ViewerSession::new();
    let mut backend = ScriptedBackend::new(vec![
        GenerateOutcome::Transport("dns lookup failed".into()),
        GenerateOutcome::Svg(SVG.into()),
    ]);

    session.set_source(InputSource::Path("/data/run.callgrind".into()), 0.0);
    let request = session.generate_now().expect("manual dispatch");
    let outcome = backend.dispatch(request);
    session.apply_outcome(outcome, 100.0);

    // Exactly one error report, scheduler back to idle.
    assert_eq!(
        session.status(),
        &Status::error("Request failed: dns lookup failed")
    );
    assert!(!session.is_generating());
    assert!(session.mounted().is_none());

    // A later trigger dispatches normally; no automatic retry happened.
    session.options_changed(500.0);
    let request = session.poll(900.0).expect("recovered dispatch");
    let outcome = backend.dispatch(request);
    session.apply_outcome(outcome, 1_000.0);
    assert_eq!(session.status().kind, StatusKind::Success);
    assert_eq!(backend.dispatched.len(), 2);
}
