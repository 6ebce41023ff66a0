//! Assessments: automatic scoring, written questions and manual grades.

use chrono::NaiveDate;
use csdesk_core::{
    assessment::{validate_assessment, AssessmentRecord, QuestionKind, TestQuestion},
    capture::ValidationError,
    command::DeskCommand,
    config::DeskConfig,
    engine::DeskEngine,
    error::DeskError,
    store::{DeskStore, MemoryPort},
};
use std::collections::BTreeMap;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 2).expect("valid date")
}

fn pos_basics(with_written: bool) -> AssessmentRecord {
    let mut questions = vec![
        TestQuestion::choice("q1", "Which button voids a bill?", "Void", &["Refund", "Hold"], 4),
        TestQuestion::choice("q2", "Default printer port?", "9100", &["80", "443"], 3),
    ];
    if with_written {
        questions.push(TestQuestion::written("q3", "Explain the close-of-day steps.", 3));
    } else {
        questions.push(TestQuestion::choice("q3", "Tip setting lives in?", "Settings", &["Menu"], 3));
    }
    AssessmentRecord {
        id: "pos-1".into(),
        title: "POS basics".into(),
        date: day(),
        topic: "POS".into(),
        questions,
    }
}

fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn auto_score_counts_exact_matches_only() {
    let test = pos_basics(true);
    let submission = test
        .grade("Gam", answers(&[("q1", "Void"), ("q2", "9100 "), ("q3", "Count the drawer")]), day())
        .expect("grade");
    assert_eq!(submission.auto_score, 4);
    assert_eq!(submission.total_possible_points, 10);
}

#[test]
fn written_questions_leave_submission_ungraded() {
    let test = pos_basics(true);
    let submission = test
        .grade("Gam", answers(&[("q1", "Void"), ("q2", "9100")]), day())
        .expect("grade");
    assert_eq!(submission.auto_score, 7);
    assert!(!submission.is_graded);
    assert!((submission.score_pct() - 70.0).abs() < 1e-9);
}

#[test]
fn choice_only_tests_are_graded_immediately() {
    let submission = pos_basics(false)
        .grade("Aim", answers(&[("q1", "Void"), ("q2", "9100"), ("q3", "Settings")]), day())
        .expect("grade");
    assert!(submission.is_graded);
    assert!((submission.score_pct() - 100.0).abs() < 1e-9);
}

#[test]
fn blank_staff_name_is_rejected() {
    assert_eq!(
        pos_basics(false).grade("  ", BTreeMap::new(), day()),
        Err(ValidationError::MissingField { field: "staffName" })
    );
}

#[test]
fn zero_point_test_scores_zero() {
    let free = AssessmentRecord {
        id: "free".into(),
        title: "Warm-up".into(),
        date: day(),
        topic: "none".into(),
        questions: vec![TestQuestion::choice("q1", "Ready?", "Yes", &["No"], 0)],
    };
    let submission = free.grade("Gam", answers(&[("q1", "Yes")]), day()).expect("grade");
    assert_eq!(submission.total_possible_points, 0);
    assert_eq!(submission.score_pct(), 0.0);
}

#[test]
fn assessment_needs_title_topic_and_questions() {
    let mut untitled = pos_basics(false);
    untitled.title = " ".into();
    assert_eq!(validate_assessment(&untitled), Err(ValidationError::MissingField { field: "title" }));

    let mut no_topic = pos_basics(false);
    no_topic.topic = String::new();
    assert_eq!(
        no_topic.grade("Gam", BTreeMap::new(), day()),
        Err(ValidationError::MissingField { field: "topic" })
    );

    let mut empty = pos_basics(false);
    empty.questions.clear();
    assert_eq!(validate_assessment(&empty), Err(ValidationError::MissingField { field: "questions" }));

    assert_eq!(validate_assessment(&pos_basics(true)), Ok(()));
}

#[test]
fn oversized_point_totals_are_rejected() {
    let mut huge = pos_basics(false);
    huge.questions = vec![
        TestQuestion::choice("q1", "One?", "A", &["B"], 3_000_000_000),
        TestQuestion::choice("q2", "Two?", "A", &["B"], 3_000_000_000),
    ];
    assert!(matches!(
        huge.total_possible_points(),
        Err(ValidationError::OutOfRange { field: "maxPoints", .. })
    ));
    assert!(matches!(
        huge.grade("Gam", answers(&[("q1", "A"), ("q2", "A")]), day()),
        Err(ValidationError::OutOfRange { .. })
    ));

    let mut engine = DeskEngine::build_test();
    let err = engine
        .apply(DeskCommand::SubmitTest {
            assessment: huge,
            staff_name: "Gam".into(),
            answers: answers(&[("q1", "A")]),
            date: day(),
        })
        .expect_err("overflowing points");
    assert!(matches!(err, DeskError::Validation(ValidationError::OutOfRange { .. })));
    assert!(engine.store().test_submissions().is_empty());
}

#[test]
fn score_ratio_handles_points_near_the_limit() {
    let mut big = pos_basics(false);
    big.questions = vec![
        TestQuestion::choice("q1", "One?", "A", &["B"], u32::MAX / 2),
        TestQuestion::written("q2", "Two?", u32::MAX / 2),
    ];
    let submission = big.grade("Gam", answers(&[("q1", "A")]), day()).expect("grade");
    let graded = submission
        .with_manual_grade(u32::MAX / 2, None)
        .expect("full marks");
    assert!((graded.score_pct() - 100.0).abs() < 1e-9);
}

#[test]
fn distractors_replace_only_choice_options() {
    let mut test = pos_basics(true);
    assert!(test.questions[0].set_distractors(vec!["Refund".into(), "Hold".into(), "Close".into()]));
    assert!(!test.questions[2].set_distractors(vec!["ignored".into()]));
    match &test.questions[0].kind {
        QuestionKind::Choice { distractors, .. } => assert_eq!(distractors.len(), 3),
        QuestionKind::Written => panic!("q1 is a choice question"),
    }
}

#[test]
fn manual_grade_is_bounded_by_headroom() {
    let submission = pos_basics(true)
        .grade("Gam", answers(&[("q1", "Void"), ("q2", "9100")]), day())
        .expect("grade");
    assert_eq!(submission.manual_headroom(), 3);

    assert!(matches!(
        submission.with_manual_grade(4, None),
        Err(ValidationError::OutOfRange { max: 3, .. })
    ));

    let graded = submission
        .with_manual_grade(2, Some("Good outline".into()))
        .expect("within headroom");
    assert!(graded.is_graded);
    assert_eq!(graded.manual_score, 2);
    assert_eq!(graded.manager_feedback.as_deref(), Some("Good outline"));
    assert!((graded.score_pct() - 90.0).abs() < 1e-9);
}

#[test]
fn store_grades_submissions_in_place() {
    let mut store = DeskStore::load(Box::new(MemoryPort::new()), &DeskConfig::builtin());
    let submission = pos_basics(true)
        .grade("Gam", answers(&[("q1", "Void")]), day())
        .expect("grade");
    let id = store.add_test_submission(submission).expect("add");

    let graded = store.grade_submission(&id, 3, Some("  ".into())).expect("grade");
    assert_eq!(graded.manual_score, 3);
    assert_eq!(graded.manager_feedback, None);
    assert_eq!(store.test_submissions().len(), 1);

    assert!(matches!(
        store.grade_submission("missing", 1, None),
        Err(DeskError::RecordNotFound { .. })
    ));
}
