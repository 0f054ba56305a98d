//! Integration tests for the risk assessment flow.
//!
//! These tests drive `RiskFlowEngine` end-to-end against the mock backend
//! loaded with the sample catalog:
//! 1. Category and event selection
//! 2. The eight-question questionnaire with its lock rules
//! 3. Completion, archiving and reset
//! 4. Concurrency and timeout behavior

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use syd_cyber::adapters::{MockBackend, MockOperation, RecordingNotifier};
use syd_cyber::application::{ChangeDecision, FlowSettings, RiskFlowEngine, RiskFlowError, Tracking};
use syd_cyber::domain::chat::{ChatState, ChatStore, MessageKind};
use syd_cyber::domain::risk::{describe_control, FlowStep, QuestionNumber};
use syd_cyber::ports::{BackendError, NoticeLevel, TrackedEventType, TrackingContext};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    engine: RiskFlowEngine,
    backend: Arc<MockBackend>,
    notifier: RecordingNotifier,
    tracking: Tracking,
}

fn harness_with(backend: MockBackend, settings: FlowSettings) -> Harness {
    let backend = Arc::new(backend);
    let notifier = RecordingNotifier::new();
    let tracking = Tracking::new(backend.clone(), TrackingContext::anonymous());
    let engine = RiskFlowEngine::new(
        backend.clone(),
        Arc::new(ChatStore::new()),
        Arc::new(notifier.clone()),
    )
    .with_settings(settings)
    .with_tracking(tracking.clone());
    Harness {
        engine,
        backend,
        notifier,
        tracking,
    }
}

fn harness() -> Harness {
    harness_with(MockBackend::with_sample_catalog(), FlowSettings::default())
}

fn question(n: usize) -> FlowStep {
    FlowStep::question(QuestionNumber::new(n).unwrap())
}

fn count_kind(state: &ChatState, kind: MessageKind) -> usize {
    state.messages().iter().filter(|m| m.kind() == kind).count()
}

/// Drives the flow to question `n` of event 101 in the "danni" category.
async fn reach_question(engine: &RiskFlowEngine, n: usize) {
    engine.start().unwrap();
    engine.select_category("danni").await.unwrap();
    engine.select_event("101").await.unwrap();
    engine.confirm_description().await.unwrap();
    for _ in 1..n {
        engine.answer_question(1).await.unwrap();
    }
    assert_eq!(engine.step(), question(n));
}

async fn complete_assessment(engine: &RiskFlowEngine) {
    reach_question(engine, 8).await;
    engine.answer_question(1).await.unwrap();
    assert_eq!(engine.step(), FlowStep::AssessmentComplete);
}

// =============================================================================
// Selection
// =============================================================================

#[tokio::test]
async fn start_is_idempotent() {
    let h = harness();

    h.engine.start().unwrap();
    h.engine.start().unwrap();

    let state = h.engine.state();
    assert_eq!(state.step(), FlowStep::WaitingCategory);
    assert_eq!(count_kind(&state, MessageKind::RiskCategories), 1);
}

#[tokio::test]
async fn selecting_category_lists_its_events() {
    let h = harness();
    h.engine.start().unwrap();

    h.engine.select_category("danni").await.unwrap();

    let state = h.engine.state();
    assert_eq!(state.step(), FlowStep::WaitingEvent);
    assert_eq!(state.selected_category(), Some("Damage_Danni"));
    assert_eq!(state.events().len(), 4);
    assert_eq!(count_kind(&state, MessageKind::RiskEvents), 1);

    h.tracking.flush().await;
    let tracked = h.backend.tracked_events();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].event_type, TrackedEventType::CategorySelected);
}

#[tokio::test]
async fn unknown_event_code_leaves_step_unchanged() {
    let h = harness();
    h.engine.start().unwrap();
    h.engine.select_category("danni").await.unwrap();

    let result = h.engine.select_event("003").await;

    assert!(matches!(result, Err(RiskFlowError::NotFound(_))));
    assert_eq!(h.engine.step(), FlowStep::WaitingEvent);
    assert_eq!(h.engine.state().selected_event(), None);
    assert_eq!(h.backend.call_count(MockOperation::FetchEventDetails), 0);
}

#[tokio::test]
async fn backing_out_of_a_description_returns_to_events() {
    let h = harness();
    h.engine.start().unwrap();
    h.engine.select_category("danni").await.unwrap();
    h.engine.select_event("102").await.unwrap();
    assert_eq!(h.engine.step(), FlowStep::WaitingChoice);

    h.engine.back_to_events().unwrap();

    let state = h.engine.state();
    assert_eq!(state.step(), FlowStep::WaitingEvent);
    assert_eq!(state.selected_event(), None);
    assert_eq!(count_kind(&state, MessageKind::RiskDescription), 0);
}

// =============================================================================
// Questionnaire
// =============================================================================

#[tokio::test]
async fn go_back_is_refused_on_first_question() {
    let h = harness();
    reach_question(&h.engine, 1).await;
    let before = h.engine.state();

    assert!(!h.engine.can_go_back());
    assert!(matches!(h.engine.go_back(), Err(RiskFlowError::InvalidStep(_))));
    assert_eq!(h.engine.state(), before);
}

#[tokio::test]
async fn go_back_from_third_question_discards_second_answer() {
    let h = harness();
    reach_question(&h.engine, 3).await;
    assert_eq!(h.engine.state().answers().len(), 2);

    h.engine.go_back().unwrap();

    let state = h.engine.state();
    assert_eq!(state.step(), question(2));
    assert_eq!(state.answers().len(), 1);
    assert!(state.answers().contains("impatto_finanziario"));
    assert!(!state.answers().contains("perdita_economica"));
}

#[tokio::test]
async fn invalid_choice_does_not_advance() {
    let h = harness();
    reach_question(&h.engine, 2).await;

    let result = h.engine.answer_question(9).await;

    assert!(matches!(result, Err(RiskFlowError::InvalidAnswer(_))));
    assert_eq!(h.engine.step(), question(2));
    assert_eq!(h.engine.state().answers().len(), 1);
}

#[tokio::test]
async fn control_answer_sets_description() {
    let h = harness();
    reach_question(&h.engine, 7).await;

    h.engine.answer_question(1).await.unwrap();

    let state = h.engine.state();
    assert_eq!(state.step(), question(8));
    assert_eq!(state.control_description(), Some(describe_control("++").as_str()));
    assert_eq!(count_kind(&state, MessageKind::ControlDescription), 1);
}

#[tokio::test]
async fn hard_lock_refuses_event_change_without_mutation() {
    let h = harness();
    reach_question(&h.engine, 7).await;
    let before = h.engine.state();

    assert_eq!(h.engine.request_event_change("999"), ChangeDecision::Locked);
    assert_eq!(h.engine.request_category_change("sistemi"), ChangeDecision::Locked);
    assert!(!h.engine.can_go_back());
    assert!(matches!(h.engine.go_back(), Err(RiskFlowError::Locked(_))));
    assert_eq!(h.engine.state(), before);
}

#[tokio::test]
async fn change_requests_before_the_lock_need_confirmation() {
    let h = harness();
    reach_question(&h.engine, 3).await;

    assert_eq!(h.engine.request_category_change("danni"), ChangeDecision::NoChange);
    assert_eq!(h.engine.request_event_change("101"), ChangeDecision::NoChange);
    assert_eq!(
        h.engine.request_category_change("sistemi"),
        ChangeDecision::NeedsConfirmation
    );

    h.engine.clean_restart_assessment(Some("103")).await.unwrap();

    let state = h.engine.state();
    assert_eq!(state.step(), FlowStep::WaitingChoice);
    assert_eq!(state.selected_event(), Some("103"));
    assert!(state.answers().is_empty());
    assert_eq!(count_kind(&state, MessageKind::RiskDescription), 1);
}

#[tokio::test]
async fn completion_records_one_answer_per_field() {
    let h = harness();

    complete_assessment(&h.engine).await;

    let state = h.engine.state();
    assert!(state.answers().covers_exactly(state.fields()));
    assert!(state.outcome().is_some());

    let saved = h.backend.saved_assessments();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].event_code, "101");
    assert_eq!(saved[0].category, "Damage_Danni");
    assert_eq!(saved[0].answers.len(), 8);

    h.tracking.flush().await;
    let kinds: Vec<_> = h
        .backend
        .tracked_events()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert!(kinds.contains(&TrackedEventType::RiskEvaluated));
    assert_eq!(
        kinds
            .iter()
            .filter(|k| **k == TrackedEventType::AssessmentQuestionAnswered)
            .count(),
        8
    );
}

#[tokio::test]
async fn failed_save_keeps_last_question_open() {
    let h = harness();
    reach_question(&h.engine, 8).await;
    h.backend.fail_next(
        MockOperation::SaveAssessment,
        BackendError::Rejected("database offline".to_string()),
    );

    let result = h.engine.answer_question(2).await;

    assert!(matches!(result, Err(RiskFlowError::NetworkFailure(_))));
    let state = h.engine.state();
    assert_eq!(state.step(), question(8));
    assert_eq!(state.answers().len(), 7);
    assert!(!state.is_typing());
    assert_eq!(h.notifier.count(NoticeLevel::Error), 1);

    h.engine.answer_question(2).await.unwrap();
    assert_eq!(h.engine.step(), FlowStep::AssessmentComplete);
}

// =============================================================================
// Completion and reset
// =============================================================================

#[tokio::test]
async fn finalize_archives_report_and_reset_returns_to_idle() {
    let h = harness();
    complete_assessment(&h.engine).await;

    h.engine.finalize_report().unwrap();
    assert_eq!(h.engine.step(), FlowStep::Completed);
    assert_eq!(h.engine.state().completed_reports().len(), 1);

    let messages_before = h.engine.state().messages().len();
    h.engine.reset();

    let state = h.engine.state();
    assert_eq!(state.step(), FlowStep::Idle);
    assert_eq!(state.selected_category(), None);
    assert!(state.answers().is_empty());
    assert_eq!(state.completed_reports().len(), 1);
    assert_eq!(state.messages().len(), messages_before);
}

#[tokio::test]
async fn second_assessment_in_same_chat() {
    let h = harness();
    complete_assessment(&h.engine).await;
    h.engine.finalize_report().unwrap();

    h.engine.handle_user_input("altro").await.unwrap();

    let state = h.engine.state();
    assert_eq!(state.step(), FlowStep::WaitingEvent);
    assert_eq!(state.selected_category(), Some("Damage_Danni"));
    assert_eq!(state.completed_reports().len(), 1);
}

#[tokio::test]
async fn chat_input_walks_the_whole_flow() {
    let h = harness();

    h.engine.handle_user_input("rischi").await.unwrap();
    h.engine.handle_user_input("danni").await.unwrap();
    h.engine.handle_user_input("101").await.unwrap();
    h.engine.handle_user_input("si").await.unwrap();
    for _ in 0..8 {
        h.engine.handle_user_input("1").await.unwrap();
    }
    assert_eq!(h.engine.step(), FlowStep::AssessmentComplete);

    h.engine.handle_user_input("report").await.unwrap();
    assert_eq!(h.engine.step(), FlowStep::Completed);
}

// =============================================================================
// Concurrency and timeouts
// =============================================================================

#[tokio::test]
async fn concurrent_operation_is_rejected_as_busy() {
    let h = harness_with(
        MockBackend::with_sample_catalog().with_delay(Duration::from_millis(100)),
        FlowSettings::default(),
    );
    h.engine.start().unwrap();

    let (first, second) = tokio::join!(h.engine.select_category("danni"), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(h.engine.is_busy());
        h.engine.select_category("sistemi").await
    });

    assert!(first.is_ok());
    assert_eq!(second, Err(RiskFlowError::Busy));
    assert_eq!(h.engine.state().selected_category(), Some("Damage_Danni"));
    assert!(!h.engine.is_busy());
}

#[tokio::test]
async fn hung_backend_times_out_without_advancing() {
    let h = harness_with(
        MockBackend::with_sample_catalog().with_delay(Duration::from_millis(200)),
        FlowSettings {
            operation_timeout: Duration::from_millis(30),
        },
    );
    h.engine.start().unwrap();

    let result = h.engine.select_category("danni").await;

    assert!(matches!(result, Err(RiskFlowError::OperationTimedOut(_))));
    let state = h.engine.state();
    assert_eq!(state.step(), FlowStep::WaitingCategory);
    assert!(!state.is_typing());
    assert_eq!(count_kind(&state, MessageKind::Error), 1);
}

#[tokio::test]
async fn observers_fire_once_per_operation_commit() {
    let h = harness();
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();
    h.engine.store().subscribe(Arc::new(move |_: &ChatState| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    h.engine.start().unwrap();
    assert_eq!(notifications.load(Ordering::SeqCst), 1);

    h.engine.start().unwrap();
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn slow_tracker_does_not_hold_up_the_flow() {
    let tracker = Arc::new(MockBackend::new().with_delay(Duration::from_millis(800)));
    let tracking = Tracking::new(tracker.clone(), TrackingContext::anonymous());
    let engine = RiskFlowEngine::new(
        Arc::new(MockBackend::with_sample_catalog()),
        Arc::new(ChatStore::new()),
        Arc::new(RecordingNotifier::new()),
    )
    .with_tracking(tracking.clone());
    engine.start().unwrap();

    let started = Instant::now();
    engine.select_category("danni").await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(400));
    assert!(!engine.is_busy());

    engine.select_event("101").await.unwrap();
    assert_eq!(engine.step(), FlowStep::WaitingChoice);
    assert!(tracker.tracked_events().is_empty());

    tracking.flush().await;
    let tracked = tracker.tracked_events();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].event_type, TrackedEventType::CategorySelected);
}

#[tokio::test]
async fn reset_during_save_discards_the_late_outcome() {
    let h = harness_with(
        MockBackend::with_sample_catalog().with_delay(Duration::from_millis(100)),
        FlowSettings::default(),
    );
    reach_question(&h.engine, 8).await;

    let (result, ()) = tokio::join!(h.engine.answer_question(1), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        h.engine.reset();
    });

    assert!(matches!(result, Err(RiskFlowError::Superseded(_))), "{:?}", result);
    let state = h.engine.state();
    assert_eq!(state.step(), FlowStep::Idle);
    assert!(state.answers().is_empty());
    assert!(state.outcome().is_none());
    assert!(!state.is_typing());
    assert_eq!(count_kind(&state, MessageKind::AssessmentComplete), 0);
    assert_eq!(h.backend.saved_assessments().len(), 1);
    assert!(!h.engine.is_busy());
}

#[tokio::test]
async fn reset_during_category_load_keeps_the_flow_idle() {
    let h = harness_with(
        MockBackend::with_sample_catalog().with_delay(Duration::from_millis(100)),
        FlowSettings::default(),
    );
    h.engine.start().unwrap();

    let (result, ()) = tokio::join!(h.engine.select_category("danni"), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        h.engine.reset();
    });

    assert!(matches!(result, Err(RiskFlowError::Superseded(_))), "{:?}", result);
    let state = h.engine.state();
    assert_eq!(state.step(), FlowStep::Idle);
    assert_eq!(state.selected_category(), None);
    assert!(state.events().is_empty());
    assert_eq!(count_kind(&state, MessageKind::RiskEvents), 0);

    h.engine.start().unwrap();
    h.engine.select_category("danni").await.unwrap();
    assert_eq!(h.engine.step(), FlowStep::WaitingEvent);
}

#[tokio::test]
async fn back_navigation_is_busy_while_a_call_is_pending() {
    let h = harness_with(
        MockBackend::with_sample_catalog().with_delay(Duration::from_millis(100)),
        FlowSettings::default(),
    );
    h.engine.start().unwrap();
    h.engine.select_category("danni").await.unwrap();

    let (loaded, back) = tokio::join!(h.engine.select_event("101"), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        h.engine.back_to_categories()
    });
    assert!(loaded.is_ok());
    assert_eq!(back, Err(RiskFlowError::Busy));
    assert_eq!(h.engine.step(), FlowStep::WaitingChoice);
    assert_eq!(h.engine.state().selected_category(), Some("Damage_Danni"));

    let (confirmed, back) = tokio::join!(h.engine.confirm_description(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        h.engine.back_to_events()
    });
    assert!(confirmed.is_ok());
    assert_eq!(back, Err(RiskFlowError::Busy));
    assert_eq!(h.engine.step(), question(1));
    assert_eq!(h.engine.state().selected_event(), Some("101"));
}
