//! Narrative coordination: latest request wins, failures degrade quietly.

use async_trait::async_trait;
use csdesk_core::{
    assessment::TestQuestion,
    config::NarrativeConfig,
    engine::DeskEngine,
    error::{DeskError, DeskResult},
    narrative::{
        prompts, ExpectedShape, NarrativeBoard, NarrativeCoordinator, NarrativePayload,
        NarrativeRequest, NarrativeState, OfflineGenerator, Subject, TextGenerator,
    },
};
use std::{sync::Arc, time::Duration};

/// Replies with the prompt text after a delay encoded in the prompt.
struct EchoGenerator;

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, request: &NarrativeRequest) -> DeskResult<String> {
        let delay = if request.prompt.starts_with("slow") { 300 } else { 5 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(request.prompt.clone())
    }
}

/// Never answers in time.
struct StalledGenerator;

#[async_trait]
impl TextGenerator for StalledGenerator {
    async fn generate(&self, _request: &NarrativeRequest) -> DeskResult<String> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("too late".into())
    }
}

/// Always returns the same raw body.
struct FixedGenerator(&'static str);

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _request: &NarrativeRequest) -> DeskResult<String> {
        Ok(self.0.to_string())
    }
}

fn text(prompt: &str) -> NarrativeRequest {
    NarrativeRequest { prompt: prompt.to_string(), shape: ExpectedShape::Text }
}

fn config(timeout_ms: u64) -> NarrativeConfig {
    NarrativeConfig { timeout_ms }
}

#[test]
fn board_discards_stale_completions() {
    let mut board = NarrativeBoard::new();
    let old = board.begin(Subject::TeamGaps);
    let new = board.begin(Subject::TeamGaps);
    let other = board.begin(Subject::TeamStrengths);

    assert!(board.complete(&new, Ok(NarrativePayload::Text("new".into()))));
    assert!(!board.complete(&old, Ok(NarrativePayload::Text("old".into()))));
    assert_eq!(
        board.state(&Subject::TeamGaps).payload(),
        Some(&NarrativePayload::Text("new".into()))
    );
    assert!(board.is_current(&other));
    assert_eq!(board.state(&Subject::TeamStrengths), NarrativeState::Pending);
    assert_eq!(board.state(&Subject::GapInsights), NarrativeState::Idle);
}

#[tokio::test]
async fn newer_request_supersedes_slow_one() {
    let coordinator = NarrativeCoordinator::new(Arc::new(EchoGenerator), &config(2_000));

    let slow = coordinator.request(Subject::TeamGaps, text("slow answer"));
    let fast = coordinator.request(Subject::TeamGaps, text("fast answer"));

    assert!(fast.await.expect("fast task"));
    // The slow task was aborted, or ran and found itself stale.
    assert!(!slow.await.unwrap_or(false));
    assert_eq!(
        coordinator.state(&Subject::TeamGaps).payload(),
        Some(&NarrativePayload::Text("fast answer".into()))
    );
}

#[tokio::test]
async fn subjects_do_not_supersede_each_other() {
    let coordinator = NarrativeCoordinator::new(Arc::new(EchoGenerator), &config(2_000));
    let a = coordinator.request(Subject::Question("q1".into()), text("for q1"));
    let b = coordinator.request(Subject::Question("q2".into()), text("for q2"));
    assert!(a.await.expect("a"));
    assert!(b.await.expect("b"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_requests_leave_latest_applied() {
    let coordinator = Arc::new(NarrativeCoordinator::new(Arc::new(EchoGenerator), &config(2_000)));

    let callers: Vec<_> = (0..32)
        .map(|i| {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator.request(Subject::TeamGaps, text(&format!("answer {i}")))
            })
        })
        .collect();
    let mut applied = 0;
    for caller in callers {
        let handle = caller.await.expect("caller task");
        if handle.await.unwrap_or(false) {
            applied += 1;
        }
    }

    assert!(applied >= 1);
    match coordinator.state(&Subject::TeamGaps) {
        NarrativeState::Ready { payload: NarrativePayload::Text(body) } => {
            assert!(body.starts_with("answer "))
        }
        other => panic!("latest request was not applied: {other:?}"),
    }
}

#[tokio::test]
async fn timeout_marks_subject_unavailable() {
    let coordinator = NarrativeCoordinator::new(Arc::new(StalledGenerator), &config(50));
    let applied = coordinator
        .request(Subject::WorkloadReasoning, text("anything"))
        .await
        .expect("task");
    assert!(applied);

    let state = coordinator.state(&Subject::WorkloadReasoning);
    assert!(matches!(state, NarrativeState::Unavailable { .. }));
    assert_eq!(state.placeholder(), "Narrative unavailable");
}

#[tokio::test]
async fn offline_generator_is_unavailable() {
    let coordinator = NarrativeCoordinator::new(Arc::new(OfflineGenerator), &config(1_000));
    coordinator
        .request(Subject::TeamStrengths, text("strengths"))
        .await
        .expect("task");
    assert!(matches!(
        coordinator.state(&Subject::TeamStrengths),
        NarrativeState::Unavailable { .. }
    ));
}

#[tokio::test]
async fn malformed_map_is_unavailable() {
    let coordinator = NarrativeCoordinator::new(Arc::new(FixedGenerator("not json")), &config(1_000));
    let request = NarrativeRequest { prompt: "map".into(), shape: ExpectedShape::Map };
    coordinator.request(Subject::StaffRecommendations, request).await.expect("task");
    assert!(coordinator.state(&Subject::StaffRecommendations).payload().is_none());
}

#[tokio::test]
async fn fenced_map_is_parsed() {
    let body = "```json\n{\"Gam\": \"Shorten reply times\"}\n```";
    let coordinator = NarrativeCoordinator::new(Arc::new(FixedGenerator(body)), &config(1_000));
    let request = NarrativeRequest { prompt: "map".into(), shape: ExpectedShape::Map };
    coordinator.request(Subject::StaffRecommendations, request).await.expect("task");

    let state = coordinator.state(&Subject::StaffRecommendations);
    assert_eq!(
        state.payload().and_then(|p| p.lookup("Gam")),
        Some("Shorten reply times")
    );
}

#[tokio::test]
async fn engine_requests_every_dashboard_narrative() {
    let engine = DeskEngine::build_test();
    let coordinator = NarrativeCoordinator::new(Arc::new(OfflineGenerator), &config(1_000));

    let handles = engine.request_narratives(&coordinator);
    // Four seed staff score 0, so gap insights are requested too.
    assert_eq!(handles.len(), 5);
    for handle in handles {
        handle.await.expect("task");
    }

    // Scores are unaffected by missing narrative.
    assert_eq!(engine.snapshot().team_weighted_average, 55);
}

#[test]
fn gap_insights_only_cover_staff_below_threshold() {
    let engine = DeskEngine::build_test();
    let snapshot = engine.snapshot();
    let request = prompts::gap_insights(&snapshot.ranking).expect("someone below threshold");
    assert!(request.prompt.contains("Namva"));
    assert!(!request.prompt.contains("Pookie"));
    assert_eq!(request.shape, ExpectedShape::Map);

    let above: Vec<_> = snapshot.ranking.into_iter().filter(|s| s.score >= 75).collect();
    assert!(prompts::gap_insights(&above).is_none());
}

#[test]
fn distractor_prompt_needs_question_and_answer() {
    assert!(prompts::choice_distractors("  ", "Void").is_none());
    assert!(prompts::choice_distractors("Which button voids a bill?", "").is_none());

    let request = prompts::choice_distractors("Which button voids a bill?", "Void").expect("request");
    assert_eq!(request.shape, ExpectedShape::List);
    assert!(request.prompt.contains("Which button voids a bill?"));
    assert!(request.prompt.contains("Void"));

    assert_eq!(prompts::distractors_from(&NarrativePayload::Text("Refund".into())), None);
}

#[tokio::test]
async fn engine_fills_choice_distractors() {
    let engine = DeskEngine::build_test();
    let coordinator = NarrativeCoordinator::new(
        Arc::new(FixedGenerator(r#"["Refund", "Hold", "Close", "Print"]"#)),
        &config(1_000),
    );
    let mut question = TestQuestion::choice("q1", "Which button voids a bill?", "Void", &[], 4);

    let handle = engine.request_distractors(&coordinator, &question).expect("choice question");
    assert!(handle.await.expect("task"));

    let state = coordinator.state(&Subject::Question("q1".into()));
    let choices = prompts::distractors_from(state.payload().expect("ready")).expect("list");
    assert_eq!(choices, vec!["Refund", "Hold", "Close"]);
    assert!(question.set_distractors(choices));

    let written = TestQuestion::written("q2", "Explain the close-of-day steps.", 3);
    assert!(engine.request_distractors(&coordinator, &written).is_none());
}

#[test]
fn unavailable_errors_carry_a_reason() {
    let err = DeskError::NarrativeUnavailable { reason: "offline".into() };
    assert!(err.to_string().contains("offline"));
}
