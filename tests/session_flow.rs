//! End-to-end runs of the session state machine, driven purely through events.

use flow_betweenness_explorer::session::{
	BetweennessResult, CalculateResponse, CalculationRequest, ClickTarget, Emphasis, Session,
	SessionEffect, SessionError, SessionEvent, UploadResponse, ValidationError,
};

fn upload(json: &str) -> SessionEvent {
	SessionEvent::Uploaded(UploadResponse::parse(json).unwrap())
}

fn abc() -> SessionEvent {
	upload(
		r#"{"nodes": ["A", "B", "C"], "edges": [
			{"source": "A", "target": "B", "weight": 2},
			{"source": "B", "target": "C", "weight": 3}]}"#,
	)
}

fn ok(results: &[(&str, f64)]) -> CalculateResponse {
	CalculateResponse::ok(
		results
			.iter()
			.map(|(edge, score)| BetweennessResult {
				edge: edge.to_string(),
				score: *score,
			})
			.collect(),
	)
}

fn request(session: &mut Session) -> CalculationRequest {
	match session.handle(SessionEvent::CalculateRequested).unwrap() {
		SessionEffect::Dispatch(request) => request,
		other => panic!("expected dispatch, got {other:?}"),
	}
}

#[test]
fn upload_select_compute_render() {
	let mut session = Session::default();
	assert_eq!(session.handle(abc()).unwrap(), SessionEffect::GraphReplaced);

	let candidates = session
		.handle(SessionEvent::SourceChosen("A".into()))
		.unwrap();
	assert_eq!(candidates, SessionEffect::Candidates(vec!["B".into()]));

	session.handle(SessionEvent::SinkToggled("B".into())).unwrap();
	assert!(session.ready_to_compute());

	let req = request(&mut session);
	assert_eq!(req.source, "A");
	assert_eq!(req.sinks, ["B"]);
	assert!(req.rejected.is_empty());

	let effect = session
		.handle(SessionEvent::CalculationFinished {
			request: req,
			response: ok(&[("A-B", 0.5)]),
		})
		.unwrap();
	assert_eq!(effect, SessionEffect::Committed { added: 1 });

	let visuals = session.visuals();
	assert_eq!(visuals[0].edge, "A-B");
	assert_eq!(visuals[0].emphasis, Emphasis::Highlighted);
	assert_eq!(visuals[0].label.as_deref(), Some("0.5000"));
	assert_eq!(visuals[1].edge, "B-C");
	assert_eq!(visuals[1].emphasis, Emphasis::Neutral);
	assert_eq!(session.visuals(), visuals);
}

#[test]
fn empty_results_are_not_an_error() {
	let mut session = Session::default();
	session.handle(abc()).unwrap();
	session.handle(SessionEvent::SourceChosen("A".into())).unwrap();
	session.handle(SessionEvent::SinkToggled("B".into())).unwrap();
	let req = request(&mut session);

	let effect = session
		.handle(SessionEvent::CalculationFinished {
			request: req,
			response: ok(&[]),
		})
		.unwrap();
	assert_eq!(effect, SessionEffect::Committed { added: 0 });
	assert!(session.visuals().iter().all(|v| v.emphasis == Emphasis::Neutral));
	assert!(session.report().is_empty());
}

#[test]
fn bodies_missing_required_fields_are_errors() {
	let mut session = Session::default();
	session.handle(abc()).unwrap();

	let err = session.handle(upload(r#"{"nodes": [1, 2]}"#)).unwrap_err();
	assert!(matches!(
		err,
		SessionError::Validation(ValidationError::Malformed(_))
	));
	assert!(session.graph().contains_node("A"));
	assert_eq!(session.generation(), 1);

	session.handle(SessionEvent::SourceChosen("A".into())).unwrap();
	session.handle(SessionEvent::SinkToggled("B".into())).unwrap();
	let req = request(&mut session);
	let err = session
		.handle(SessionEvent::CalculationFinished {
			request: req,
			response: CalculateResponse::parse(r#"{"message": "Internal Server Error"}"#).unwrap(),
		})
		.unwrap_err();
	assert!(matches!(err, SessionError::Computation(_)));
	assert!(session.results().is_empty());
}

#[test]
fn rapid_double_click_passes_the_guard_once() {
	let mut session = Session::default();
	session.handle(abc()).unwrap();
	session.handle(SessionEvent::SourceChosen("A".into())).unwrap();
	session.handle(SessionEvent::SinkToggled("B".into())).unwrap();

	request(&mut session);
	let err = session.handle(SessionEvent::CalculateRequested).unwrap_err();
	assert_eq!(err.to_string(), "Edge A-B has already been added.");
	assert!(session.results().is_empty());
}

#[test]
fn removal_restores_neutral_but_keeps_the_pair_blocked() {
	let mut session = Session::default();
	session.handle(abc()).unwrap();
	session.handle(SessionEvent::SourceChosen("A".into())).unwrap();
	session.handle(SessionEvent::SinkToggled("B".into())).unwrap();
	let req = request(&mut session);
	session
		.handle(SessionEvent::CalculationFinished {
			request: req,
			response: ok(&[("A-B", 0.5)]),
		})
		.unwrap();

	let SessionEffect::Removed(outcome) = session
		.handle(SessionEvent::ResultRemoved("A-B".into()))
		.unwrap()
	else {
		panic!("expected removal");
	};
	assert_eq!(outcome.removed, 1);
	assert_eq!(outcome.dropped_sources, ["A"]);
	assert!(session.visuals().iter().all(|v| v.emphasis == Emphasis::Neutral));

	let err = session.handle(SessionEvent::CalculateRequested).unwrap_err();
	assert!(matches!(err, SessionError::DuplicateRequest { .. }));
}

#[test]
fn reload_clears_the_guard() {
	let mut session = Session::default();
	session.handle(abc()).unwrap();
	session.handle(SessionEvent::SourceChosen("A".into())).unwrap();
	session.handle(SessionEvent::SinkToggled("B".into())).unwrap();
	request(&mut session);

	session.handle(abc()).unwrap();
	session.handle(SessionEvent::SourceChosen("A".into())).unwrap();
	session.handle(SessionEvent::SinkToggled("B".into())).unwrap();
	let req = request(&mut session);
	assert_eq!(req.generation, 2);
}

#[test]
fn out_of_order_completions_resolve_last_write_wins() {
	let mut session = Session::default();
	session.handle(abc()).unwrap();

	session.handle(SessionEvent::SourceChosen("A".into())).unwrap();
	session.handle(SessionEvent::SinkToggled("B".into())).unwrap();
	let first = request(&mut session);

	session.handle(SessionEvent::SourceChosen("B".into())).unwrap();
	session.handle(SessionEvent::SinkToggled("A".into())).unwrap();
	let second = request(&mut session);

	// The second request answers before the first.
	session
		.handle(SessionEvent::CalculationFinished {
			request: second,
			response: ok(&[("A-B", 0.12)]),
		})
		.unwrap();
	session
		.handle(SessionEvent::CalculationFinished {
			request: first,
			response: ok(&[("A-B", 0.45)]),
		})
		.unwrap();

	assert_eq!(session.visuals()[0].label.as_deref(), Some("0.4500"));
	let report = session.report();
	let sources: Vec<_> = report.rows.iter().map(|r| r.source.as_str()).collect();
	assert_eq!(sources, ["B", "A"]);
}

#[test]
fn invalid_sink_leaves_selection_unchanged() {
	let mut session = Session::default();
	session.handle(abc()).unwrap();
	session.handle(SessionEvent::SourceChosen("A".into())).unwrap();
	assert!(session.handle(SessionEvent::SinkToggled("C".into())).is_err());
	assert!(session.handle(SessionEvent::SinkToggled("A".into())).is_err());
	assert!(session.selection().state().sinks.is_empty());
	assert!(!session.ready_to_compute());
}

#[test]
fn clicking_an_unknown_edge_is_reported() {
	let mut session = Session::default();
	session.handle(abc()).unwrap();
	let err = session
		.handle(SessionEvent::Clicked(ClickTarget::Edge("C-A".into())))
		.unwrap_err();
	assert_eq!(err, SessionError::UnknownEdge("C-A".into()));
}
