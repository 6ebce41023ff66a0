//! End-to-end: commands in, recomputed dashboard out.

use chrono::{NaiveDate, TimeZone, Utc};
use csdesk_core::{
    assessment::{AssessmentRecord, TestQuestion},
    capture::{EvaluationDraft, RubricScores},
    command::DeskCommand,
    config::DeskConfig,
    engine::DeskEngine,
    error::DeskError,
    proof::{proofs_for, ProofCategory},
    qa::QaDraft,
    store::MemoryPort,
    tally::{OtherKpi, ProjectCategory, TallyField},
    workload::WorkloadCounters,
};
use std::collections::BTreeMap;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).expect("valid date")
}

fn score_of(engine: &DeskEngine, name: &str) -> u32 {
    engine
        .snapshot()
        .ranking
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.score)
        .unwrap_or_default()
}

#[test]
fn evaluation_command_updates_ranking_and_workload() {
    init_logging();
    let mut engine = DeskEngine::build_test();
    let draft = EvaluationDraft {
        staff_id: "4".into(),
        date: day(2),
        rubric: RubricScores::Maintenance {
            response_tone: 90,
            fix_speed: 90,
            accuracy: 90,
            issues_resolved: 4,
        },
        follow_up_score: 80,
        clarity_score: 80,
        onboarding_quality: 80,
        customer_feedback: 80,
        workload: WorkloadCounters { incoming_calls: 10, outgoing_calls: 0, chats: 0, tasks: 0 },
        note: String::new(),
        case_ref: String::new(),
    };

    let outcome = engine.apply(DeskCommand::AddEvaluation { draft }).expect("apply");
    assert!(outcome.record_id.is_some());
    assert_eq!(score_of(&engine, "Namva"), 90);

    let namva = outcome
        .snapshot
        .workload
        .iter()
        .find(|r| r.totals.staff_id == "4")
        .expect("Namva row");
    assert_eq!(namva.totals.weighted_units, 50);
    // Buddy TBA 1 has no load.
    assert_eq!(namva.outcome.label(), "Higher");
}

#[test]
fn rejected_command_changes_nothing() {
    init_logging();
    let mut engine = DeskEngine::build_test();
    let before = engine.snapshot();

    let mut draft = QaDraft::new("99", day(3));
    draft.set_score(0, 0, 5).expect("score");
    let err = engine.apply(DeskCommand::SaveQaAudit { draft }).expect_err("unknown staff");
    assert!(matches!(err, DeskError::Validation(_)));
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn qa_audit_feeds_composite_and_team_average() {
    init_logging();
    let mut engine = DeskEngine::build_test();
    let mut draft = QaDraft::new("6", day(4));
    for item in 0..5 {
        draft.set_score(0, item, 5).expect("score");
    }
    let outcome = engine.apply(DeskCommand::SaveQaAudit { draft }).expect("apply");

    // 25 of 65 possible
    assert_eq!(outcome.snapshot.qa.average, 38);
    assert_eq!(score_of(&engine, "Noey"), 38);
}

#[test]
fn test_submission_then_manual_grade() {
    init_logging();
    let mut engine = DeskEngine::build_test();
    let assessment = AssessmentRecord {
        id: "menu-1".into(),
        title: "Menu setup".into(),
        date: day(1),
        topic: "Menus".into(),
        questions: vec![
            TestQuestion::choice("q1", "Modifier groups live under?", "Items", &["Tables"], 5),
            TestQuestion::written("q2", "Describe a combo setup.", 5),
        ],
    };
    let answers: BTreeMap<String, String> =
        [("q1".to_string(), "Items".to_string())].into_iter().collect();

    let submitted = engine
        .apply(DeskCommand::SubmitTest {
            assessment,
            staff_name: "Noey".into(),
            answers,
            date: day(5),
        })
        .expect("submit");
    let id = submitted.record_id.expect("submission id");
    assert_eq!(score_of(&engine, "Noey"), 50);

    engine
        .apply(DeskCommand::GradeSubmission {
            submission_id: id,
            manual_score: 4,
            feedback: Some("Clear".into()),
        })
        .expect("grade");
    assert_eq!(score_of(&engine, "Noey"), 90);
}

#[test]
fn tallies_drive_sla_and_team_average() {
    init_logging();
    let mut engine = DeskEngine::build_test();
    for (category, total, met) in [
        (ProjectCategory::Restaurant, 10, 8),
        (ProjectCategory::Massage, 20, 15),
        (ProjectCategory::AiReceptionist, 5, 5),
    ] {
        engine
            .apply(DeskCommand::SetProjectSla { category, field: TallyField::Total, value: total })
            .expect("total");
        engine
            .apply(DeskCommand::SetProjectSla { category, field: TallyField::Met, value: met })
            .expect("met");
    }
    let snapshot = engine
        .apply(DeskCommand::SetOtherKpi { kpi: OtherKpi::Csat, field: TallyField::Met, value: 50 })
        .expect("kpi")
        .snapshot;

    assert_eq!(snapshot.sla.overall, 85);
    assert_eq!(snapshot.sla.total_projects, 35);
    // (44.25 + 85 + 50 + 0) / 4
    assert_eq!(snapshot.team_weighted_average, 45);
}

#[test]
fn proofs_and_peer_reviews_reach_the_profile() {
    init_logging();
    let mut engine = DeskEngine::build_test();
    let proof_id = engine
        .apply(DeskCommand::AddProof {
            staff_id: "5".into(),
            date: day(7),
            description: "Customer thanked Aim by name".into(),
            category: ProofCategory::Positive,
            image_url: None,
        })
        .expect("proof")
        .record_id
        .expect("proof id");
    engine
        .apply(DeskCommand::AddPeerReview {
            target_staff_id: "5".into(),
            reviewer_name: "Gam".into(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 8, 9, 0, 0).single().expect("timestamp"),
            teamwork: 5,
            helpfulness: 4,
            communication: 4,
            comment: "Always picks up handovers".into(),
        })
        .expect("peer review");

    let profile = engine.staff_profile("5").expect("profile");
    assert_eq!(profile.proof_count, 1);
    assert_eq!(profile.peer_review_count, 1);
    assert_eq!(profile.peer_average, 4);
    assert_eq!(engine.store().peer_reviews()[0].date, "June 2025");

    let positives = proofs_for(engine.store().proof_records(), "5", Some(ProofCategory::Positive));
    assert_eq!(positives.len(), 1);

    engine.apply(DeskCommand::RemoveProof { proof_id }).expect("remove");
    assert_eq!(engine.staff_profile("5").expect("profile").proof_count, 0);
}

#[test]
fn peer_review_scores_must_be_one_to_five() {
    init_logging();
    let mut engine = DeskEngine::build_test();
    let err = engine
        .apply(DeskCommand::AddPeerReview {
            target_staff_id: "1".into(),
            reviewer_name: "Aim".into(),
            timestamp: Utc::now(),
            teamwork: 0,
            helpfulness: 3,
            communication: 3,
            comment: "ok".into(),
        })
        .expect_err("zero score");
    assert!(matches!(err, DeskError::Validation(_)));
}

#[test]
fn unknown_staff_profile_is_not_found() {
    let engine = DeskEngine::build_test();
    assert!(matches!(
        engine.staff_profile("nobody"),
        Err(DeskError::RecordNotFound { collection: "staff", .. })
    ));
}

#[test]
fn commands_parse_from_json() {
    let raw = r#"{"cmd":"set_other_kpi","kpi":"response_speed","field":"met","value":70}"#;
    let command: DeskCommand = serde_json::from_str(raw).expect("parse");
    assert_eq!(command.name(), "set_other_kpi");

    let raw = r#"{
        "cmd": "add_evaluation",
        "draft": {
            "staffId": "1",
            "date": "2025-06-09",
            "rubric": {
                "type": "Project",
                "subCategory": "Massage",
                "onboardingCommunication": 80,
                "setupSpeed": 80,
                "sopQuality": 80,
                "daysToLive": 12,
                "stepsCompleted": 10
            },
            "followUpScore": 80,
            "clarityScore": 80,
            "onboardingQuality": 80,
            "customerFeedback": 80
        }
    }"#;
    let command: DeskCommand = serde_json::from_str(raw).expect("parse");
    let mut engine = DeskEngine::build_test();
    engine.apply(command).expect("apply");
    assert_eq!(engine.store().evaluations().len(), 5);
}

#[test]
fn state_survives_reopening_the_port() {
    init_logging();
    let config = DeskConfig::builtin();
    let mut engine = DeskEngine::open(config.clone(), Box::new(MemoryPort::new()));
    engine
        .apply(DeskCommand::SetOtherKpi { kpi: OtherKpi::ResponseSpeed, field: TallyField::Met, value: 60 })
        .expect("kpi");

    let port = engine.into_store().into_port();
    let reopened = DeskEngine::open(config, port);
    assert_eq!(reopened.store().other_kpis().response_speed.met, 60);
}
