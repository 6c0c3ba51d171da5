//! Conversation flow tests
//!
//! Drive the Conductor end to end against a [`ScriptedBackend`] and check the
//! externally visible behavior: what ends up in the log, when the transport
//! is called, what the emergency banner shows, and how the busy state gates
//! further submissions.

use buddy_conductor::{
    ChatResponse, Citation, Conductor, ConductorConfig, ConductorState, ExchangeOutcome,
    IgnoreReason, LateResponsePolicy, MessageRole, Region, ScriptedBackend, Submission,
    SurfaceEvent, TransportError, QUICK_ACTIONS,
};
use pretty_assertions::assert_eq;
use tokio_test::{assert_pending, task};

fn conductor_with(backend: &ScriptedBackend) -> Conductor<ScriptedBackend> {
    Conductor::new(backend.clone(), ConductorConfig::default())
}

fn conductor_with_policy(
    backend: &ScriptedBackend,
    late_responses: LateResponsePolicy,
) -> Conductor<ScriptedBackend> {
    Conductor::new(
        backend.clone(),
        ConductorConfig {
            late_responses,
            ..ConductorConfig::default()
        },
    )
}

fn roles_and_contents(conductor: &Conductor<ScriptedBackend>) -> Vec<(MessageRole, String)> {
    conductor
        .messages()
        .iter()
        .map(|m| (m.role(), m.content().to_string()))
        .collect()
}

// =============================================================================
// Round trips
// =============================================================================

#[tokio::test]
async fn test_simple_answer_round_trip() {
    let backend = ScriptedBackend::new()
        .with_reply("small cut on finger", ChatResponse::answer("Apply pressure"));
    let mut conductor = conductor_with(&backend);

    let submission = conductor.submit("small cut on finger").await;

    assert!(submission.is_accepted());
    assert_eq!(
        roles_and_contents(&conductor),
        vec![
            (MessageRole::User, "small cut on finger".to_string()),
            (MessageRole::Assistant, "Apply pressure".to_string()),
        ]
    );
    assert!(conductor.messages()[1].citations().is_empty());
    assert_eq!(conductor.state(), ConductorState::Idle);
    assert!(conductor.last_error().is_none());
    assert!(conductor.emergency_banner().is_none());
}

#[tokio::test]
async fn test_emergency_answer_drives_banner() {
    let citation = Citation::new("NHS Choking", "Give up to 5 back blows");
    let backend = ScriptedBackend::new().with_reply(
        "choking",
        ChatResponse::answer("Call now")
            .with_emergency(Some("999"))
            .with_citation(citation.clone()),
    );
    let mut conductor = conductor_with(&backend);

    conductor.submit("choking").await;

    let banner = conductor.emergency_banner().expect("banner should be active");
    assert_eq!(banner.emergency_number, "999");
    assert_eq!(banner.message_id, conductor.messages()[1].id());
    assert_eq!(conductor.messages()[1].citations(), &[citation]);
}

#[tokio::test]
async fn test_request_carries_session_and_region() {
    let backend = ScriptedBackend::new()
        .with_reply("burn", ChatResponse::answer("Cool it"))
        .with_reply("burn again", ChatResponse::answer("Keep cooling"));
    let mut conductor = conductor_with(&backend);

    conductor.submit("burn").await;
    conductor.set_region(Region::Eu);
    conductor.submit("burn again").await;

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].region, Region::Uk);
    assert_eq!(calls[1].region, Region::Eu);
    assert_eq!(&calls[0].session_id, conductor.session_id());
    assert_eq!(calls[0].session_id, calls[1].session_id);
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_log_order_follows_acceptance_with_failures() {
    let backend = ScriptedBackend::new()
        .with_reply("one", ChatResponse::answer("first answer"))
        .with_failure("two", TransportError::Network("connection reset".to_string()))
        .with_reply("three", ChatResponse::answer("third answer"));
    let mut conductor = conductor_with(&backend);

    conductor.submit("one").await;
    conductor.submit("two").await;
    conductor.submit("three").await;

    assert_eq!(
        roles_and_contents(&conductor),
        vec![
            (MessageRole::User, "one".to_string()),
            (MessageRole::Assistant, "first answer".to_string()),
            (MessageRole::User, "two".to_string()),
            (MessageRole::User, "three".to_string()),
            (MessageRole::Assistant, "third answer".to_string()),
        ]
    );
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_blank_input_is_a_no_op() {
    let backend = ScriptedBackend::new();
    let mut conductor = conductor_with(&backend);

    for text in ["", "   ", "\n\t  "] {
        let submission = conductor.submit(text).await;
        assert_eq!(submission, Submission::Ignored(IgnoreReason::EmptyInput));
    }

    assert!(conductor.messages().is_empty());
    assert_eq!(backend.call_count(), 0);
    assert_eq!(conductor.state(), ConductorState::Idle);
}

#[tokio::test]
async fn test_blank_input_keeps_previous_error() {
    let backend = ScriptedBackend::new()
        .with_failure("cut", TransportError::Network("offline".to_string()));
    let mut conductor = conductor_with(&backend);

    conductor.submit("cut").await;
    conductor.submit("  ").await;

    assert!(conductor.last_error().is_some());
}

// =============================================================================
// Busy state
// =============================================================================

#[tokio::test]
async fn test_submissions_ignored_while_awaiting_response() {
    let backend = ScriptedBackend::new();
    let gate = backend.push_pending();
    let mut conductor = conductor_with(&backend);

    assert!(conductor.dispatch("bleeding").is_accepted());
    assert_eq!(conductor.state(), ConductorState::AwaitingResponse);
    assert!(!conductor.accepts_input());

    assert_eq!(
        conductor.dispatch("another question"),
        Submission::Ignored(IgnoreReason::Busy)
    );
    assert_eq!(
        conductor.quick_action(0),
        Submission::Ignored(IgnoreReason::Busy)
    );
    assert_eq!(
        conductor.handle_event(SurfaceEvent::submit("typed")),
        Some(Submission::Ignored(IgnoreReason::Busy))
    );
    assert_eq!(conductor.messages().len(), 1);

    gate.release(Ok(ChatResponse::answer("Press firmly")));
    let outcome = conductor.wait_for_response().await;

    assert!(matches!(outcome, Some(ExchangeOutcome::Answered { .. })));
    assert_eq!(backend.call_count(), 1);
    assert_eq!(conductor.messages().len(), 2);
    assert!(conductor.accepts_input());
}

#[tokio::test]
async fn test_hung_transport_keeps_conductor_busy() {
    let backend = ScriptedBackend::new();
    let _gate = backend.push_pending();
    let mut conductor = conductor_with(&backend);

    conductor.dispatch("help");

    {
        let mut wait = task::spawn(conductor.wait_for_response());
        assert_pending!(wait.poll());
    }

    // Dropping the wait future does not abandon the exchange
    assert_eq!(conductor.state(), ConductorState::AwaitingResponse);
    assert!(conductor.poll_response().is_none());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_failure_keeps_user_message_and_sets_error() {
    let backend = ScriptedBackend::new().with_failure(
        "poison",
        TransportError::Status {
            status: 503,
            detail: "AI service is not configured".to_string(),
        },
    );
    let mut conductor = conductor_with(&backend);

    conductor.submit("poison").await;

    assert_eq!(
        roles_and_contents(&conductor),
        vec![(MessageRole::User, "poison".to_string())]
    );
    let error = conductor.last_error().expect("error should be recorded");
    assert!(error.contains("AI service is not configured"));
    assert_eq!(conductor.state(), ConductorState::Idle);
}

#[tokio::test]
async fn test_next_submission_clears_error() {
    let backend = ScriptedBackend::new()
        .with_failure("first", TransportError::Decode("missing field".to_string()))
        .with_reply("second", ChatResponse::answer("ok"));
    let mut conductor = conductor_with(&backend);

    conductor.submit("first").await;
    assert!(conductor.last_error().is_some());

    let submission = conductor.dispatch("second");
    assert!(submission.is_accepted());
    assert!(conductor.last_error().is_none());
    conductor.wait_for_response().await;
    assert!(conductor.last_error().is_none());
}

#[tokio::test]
async fn test_new_error_replaces_previous() {
    let backend = ScriptedBackend::new()
        .with_failure("a", TransportError::Network("first".to_string()))
        .with_failure("b", TransportError::Network("second".to_string()));
    let mut conductor = conductor_with(&backend);

    conductor.submit("a").await;
    conductor.submit("b").await;

    assert!(conductor.last_error().unwrap().contains("second"));
}

// =============================================================================
// Emergency watcher through the conductor
// =============================================================================

#[tokio::test]
async fn test_banner_survives_later_calm_answer() {
    let backend = ScriptedBackend::new()
        .with_reply("not breathing", ChatResponse::answer("Start CPR").with_emergency(Some("999")))
        .with_reply("what next", ChatResponse::answer("Keep going until help arrives"));
    let mut conductor = conductor_with(&backend);

    conductor.submit("not breathing").await;
    conductor.submit("what next").await;

    let banner = conductor.emergency_banner().unwrap();
    assert_eq!(banner.emergency_number, "999");
    assert_eq!(banner.message_id, conductor.messages()[1].id());
}

#[tokio::test]
async fn test_banner_uses_selected_region_when_number_missing() {
    let backend = ScriptedBackend::new()
        .with_reply("overdose", ChatResponse::answer("Call now").with_emergency(None));
    let mut conductor = conductor_with(&backend);
    conductor.set_region(Region::Us);

    conductor.submit("overdose").await;
    assert_eq!(conductor.emergency_banner().unwrap().emergency_number, "911");

    conductor.handle_event(SurfaceEvent::RegionChanged { region: Region::Eu });
    assert_eq!(conductor.emergency_banner().unwrap().emergency_number, "112");
}

#[tokio::test]
async fn test_no_banner_without_flagged_answers() {
    let backend = ScriptedBackend::new()
        .with_reply("a", ChatResponse::answer("one"))
        .with_reply("b", ChatResponse::answer("two"))
        .with_reply("c", ChatResponse::answer("three"));
    let mut conductor = conductor_with(&backend);

    for text in ["a", "b", "c"] {
        conductor.submit(text).await;
    }
    assert!(conductor.emergency_banner().is_none());
}

// =============================================================================
// Clear
// =============================================================================

#[tokio::test]
async fn test_clear_resets_log_and_banner() {
    let backend = ScriptedBackend::new()
        .with_reply("choking", ChatResponse::answer("Call now").with_emergency(Some("999")));
    let mut conductor = conductor_with(&backend);

    conductor.submit("choking").await;
    assert!(conductor.emergency_banner().is_some());

    conductor.handle_event(SurfaceEvent::ClearConversation);

    assert!(conductor.messages().is_empty());
    assert!(conductor.emergency_banner().is_none());
}

#[tokio::test]
async fn test_late_response_applied_after_clear_by_default() {
    let backend = ScriptedBackend::new();
    let gate = backend.push_pending();
    let mut conductor = conductor_with(&backend);

    conductor.dispatch("burn");
    conductor.clear_conversation();
    assert!(conductor.messages().is_empty());
    assert_eq!(conductor.state(), ConductorState::AwaitingResponse);

    gate.release(Ok(ChatResponse::answer("Cool under running water")));
    conductor.wait_for_response().await;

    assert_eq!(
        roles_and_contents(&conductor),
        vec![(MessageRole::Assistant, "Cool under running water".to_string())]
    );
    assert_eq!(conductor.state(), ConductorState::Idle);
}

#[tokio::test]
async fn test_late_response_discarded_when_fenced() {
    let backend = ScriptedBackend::new();
    let gate = backend.push_pending();
    let mut conductor = conductor_with_policy(&backend, LateResponsePolicy::DiscardAfterClear);

    conductor.dispatch("burn");
    conductor.clear_conversation();

    gate.release(Err(TransportError::Network("timeout".to_string())));
    let outcome = conductor.wait_for_response().await;

    assert_eq!(outcome, Some(ExchangeOutcome::Discarded));
    assert!(conductor.messages().is_empty());
    assert!(conductor.last_error().is_none());
    assert_eq!(conductor.state(), ConductorState::Idle);
}

#[tokio::test]
async fn test_fenced_policy_applies_responses_without_clear() {
    let backend = ScriptedBackend::new().with_reply("sprain", ChatResponse::answer("Rest it"));
    let mut conductor = conductor_with_policy(&backend, LateResponsePolicy::DiscardAfterClear);

    conductor.submit("sprain").await;

    assert_eq!(conductor.messages().len(), 2);
}

// =============================================================================
// Region selector
// =============================================================================

#[tokio::test]
async fn test_region_change_mid_flight_affects_next_request_only() {
    let backend = ScriptedBackend::new();
    let gate = backend.push_pending();
    backend.push(buddy_conductor::backend::ScriptedReply::Ready(Ok(
        ChatResponse::answer("second"),
    )));
    let mut conductor = conductor_with(&backend);

    conductor.dispatch("first");
    conductor.set_region(Region::Us);
    gate.release(Ok(ChatResponse::answer("first")));
    conductor.wait_for_response().await;
    conductor.submit("second").await;

    let regions: Vec<Region> = backend.calls().iter().map(|c| c.region).collect();
    assert_eq!(regions, vec![Region::Uk, Region::Us]);
}

// =============================================================================
// Quick actions
// =============================================================================

#[tokio::test]
async fn test_quick_action_is_the_same_as_typing() {
    let action = &QUICK_ACTIONS[1];
    let backend = ScriptedBackend::new()
        .with_reply(action.text, ChatResponse::answer("Back blows").with_emergency(Some("999")));
    let mut conductor = conductor_with(&backend);

    let submission = conductor.handle_event(SurfaceEvent::QuickAction { index: 1 });
    assert!(submission.is_some_and(|s| s.is_accepted()));
    conductor.wait_for_response().await;

    assert_eq!(backend.calls()[0].message, action.text);
    assert_eq!(conductor.messages()[0].content(), action.text);
    assert!(conductor.emergency_banner().is_some());
}

#[tokio::test]
async fn test_unknown_quick_action_is_ignored() {
    let backend = ScriptedBackend::new();
    let mut conductor = conductor_with(&backend);

    assert_eq!(
        conductor.quick_action(QUICK_ACTIONS.len()),
        Submission::Ignored(IgnoreReason::UnknownQuickAction)
    );
    assert!(conductor.messages().is_empty());
    assert_eq!(backend.call_count(), 0);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_check_does_not_touch_state() {
    let conductor = conductor_with(&ScriptedBackend::new().unhealthy());
    assert!(!conductor.health_check().await);
    assert_eq!(conductor.state(), ConductorState::Idle);
    assert!(conductor.messages().is_empty());
}
