//! Assessments and test submissions.
//!
//! Choice questions are scored automatically when the answers are
//! submitted. Written questions wait for a manager's manual grade.

use crate::{
    capture::{require, ValidationError},
    types::{new_record_id, ratio_or_zero, RecordId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum QuestionKind {
    Choice {
        correct_answer: String,
        #[serde(default)]
        distractors:    Vec<String>,
    },
    Written,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestQuestion {
    pub id:         String,
    pub question:   String,
    pub max_points: u32,
    #[serde(flatten)]
    pub kind:       QuestionKind,
}

impl TestQuestion {
    pub fn choice(id: &str, question: &str, correct: &str, distractors: &[&str], max_points: u32) -> Self {
        Self {
            id: id.to_string(),
            question: question.to_string(),
            max_points,
            kind: QuestionKind::Choice {
                correct_answer: correct.to_string(),
                distractors: distractors.iter().map(|d| d.to_string()).collect(),
            },
        }
    }

    pub fn written(id: &str, question: &str, max_points: u32) -> Self {
        Self {
            id: id.to_string(),
            question: question.to_string(),
            max_points,
            kind: QuestionKind::Written,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self.kind, QuestionKind::Written)
    }

    /// Replace a choice question's distractors. Written questions have
    /// none; returns false for them.
    pub fn set_distractors(&mut self, choices: Vec<String>) -> bool {
        match &mut self.kind {
            QuestionKind::Choice { distractors, .. } => {
                *distractors = choices;
                true
            }
            QuestionKind::Written => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id:        RecordId,
    pub title:     String,
    pub date:      NaiveDate,
    pub topic:     String,
    pub questions: Vec<TestQuestion>,
}

/// Sum `max_points`, failing instead of wrapping.
fn sum_points<'a>(mut questions: impl Iterator<Item = &'a TestQuestion>) -> Result<u32, ValidationError> {
    questions.try_fold(0u32, |acc, q| {
        acc.checked_add(q.max_points).ok_or(ValidationError::OutOfRange {
            field: "maxPoints",
            value: q.max_points,
            min:   0,
            max:   u32::MAX - acc,
        })
    })
}

impl AssessmentRecord {
    pub fn total_possible_points(&self) -> Result<u32, ValidationError> {
        sum_points(self.questions.iter())
    }

    pub fn has_written(&self) -> bool {
        self.questions.iter().any(TestQuestion::is_written)
    }

    /// Points earned on choice questions answered exactly right.
    pub fn auto_score(&self, answers: &BTreeMap<String, String>) -> Result<u32, ValidationError> {
        sum_points(self.questions.iter().filter(|q| match &q.kind {
            QuestionKind::Choice { correct_answer, .. } => answers.get(&q.id) == Some(correct_answer),
            QuestionKind::Written => false,
        }))
    }

    /// Score a set of answers into a finished submission.
    pub fn grade(
        &self,
        staff_name: &str,
        answers: BTreeMap<String, String>,
        date: NaiveDate,
    ) -> Result<TestSubmission, ValidationError> {
        validate_assessment(self)?;
        require("staffName", staff_name)?;
        Ok(TestSubmission {
            id: new_record_id(),
            test_id: self.id.clone(),
            test_title: self.title.clone(),
            staff_name: staff_name.trim().to_string(),
            auto_score: self.auto_score(&answers)?,
            manual_score: 0,
            total_possible_points: self.total_possible_points()?,
            is_graded: !self.has_written(),
            date,
            answers,
            manager_feedback: None,
        })
    }
}

/// An assessment needs a title, a topic and at least one question, and
/// its points must fit the score range.
pub fn validate_assessment(assessment: &AssessmentRecord) -> Result<(), ValidationError> {
    require("title", &assessment.title)?;
    require("topic", &assessment.topic)?;
    if assessment.questions.is_empty() {
        return Err(ValidationError::MissingField { field: "questions" });
    }
    assessment.total_possible_points()?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSubmission {
    pub id:                    RecordId,
    pub test_id:               RecordId,
    pub test_title:            String,
    /// Free text as typed by the test taker, matched to the roster by name.
    pub staff_name:            String,
    pub auto_score:            u32,
    pub manual_score:          u32,
    pub total_possible_points: u32,
    pub is_graded:             bool,
    pub date:                  NaiveDate,
    pub answers:               BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_feedback:      Option<String>,
}

impl TestSubmission {
    /// (auto + manual) / possible * 100, 0 when nothing was possible.
    pub fn score_pct(&self) -> f64 {
        ratio_or_zero(
            self.auto_score as f64 + self.manual_score as f64,
            self.total_possible_points as f64,
        ) * 100.0
    }

    /// Points still available for a manual grade.
    pub fn manual_headroom(&self) -> u32 {
        self.total_possible_points.saturating_sub(self.auto_score)
    }

    /// Record the manager's grade for the written part.
    pub fn with_manual_grade(
        &self,
        manual_score: u32,
        feedback: Option<String>,
    ) -> Result<TestSubmission, ValidationError> {
        let max = self.manual_headroom();
        if manual_score > max {
            return Err(ValidationError::OutOfRange {
                field: "manualScore",
                value: manual_score,
                min: 0,
                max,
            });
        }
        Ok(TestSubmission {
            manual_score,
            is_graded: true,
            manager_feedback: feedback.filter(|f| !f.trim().is_empty()),
            ..self.clone()
        })
    }
}

pub fn validate_submission(submission: &TestSubmission) -> Result<(), ValidationError> {
    require("staffName", &submission.staff_name)?;
    let earned = submission.auto_score as u64 + submission.manual_score as u64;
    if earned > submission.total_possible_points as u64 {
        return Err(ValidationError::OutOfRange {
            field: "autoScore + manualScore",
            value: u32::try_from(earned).unwrap_or(u32::MAX),
            min: 0,
            max: submission.total_possible_points,
        });
    }
    Ok(())
}
