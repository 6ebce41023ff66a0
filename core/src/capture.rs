//! Evaluation capture and the validation rules shared with the store.
//!
//! The evaluation form scores three criteria whose meaning depends on the
//! category. `RubricScores` carries each category's own named fields and
//! maps them onto the stored communication / speed / process-compliance
//! scores.

use crate::{
    evaluation::{EvaluationCategory, EvaluationRecord},
    staff::{Roster, StaffMember},
    tally::ProjectCategory,
    types::{new_record_id, StaffId},
    workload::WorkloadCounters,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Primary scores below this need a note or case reference.
pub const EVIDENCE_THRESHOLD: u32 = 70;

/// Anchored rating levels offered for each rubric criterion.
pub const RUBRIC_LEVELS: [u32; 5] = [100, 80, 60, 40, 20];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{field}' is required")]
    MissingField { field: &'static str },

    #[error("'{field}' = {value} is outside [{min}, {max}]")]
    OutOfRange { field: &'static str, value: u32, min: u32, max: u32 },

    #[error("scores below {threshold} need a note or case reference (lowest: {lowest})")]
    LowScoreWithoutEvidence { lowest: u32, threshold: u32 },

    #[error("unknown staff member '{staff}'")]
    UnknownStaff { staff: String },

    #[error("no section {section} item {item} in this audit")]
    NoSuchItem { section: usize, item: usize },
}

pub(crate) fn check_range(
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, value, min, max })
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

pub(crate) fn known_staff<'a>(
    roster: &'a [StaffMember],
    staff_id: &str,
) -> Result<&'a StaffMember, ValidationError> {
    roster
        .by_id(staff_id)
        .ok_or_else(|| ValidationError::UnknownStaff { staff: staff_id.to_string() })
}

/// Per-category rubric scores. Each variant names what its three
/// criteria actually measure, plus the fields only that category uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum RubricScores {
    Project {
        sub_category:             ProjectCategory,
        onboarding_communication: u32,
        setup_speed:              u32,
        sop_quality:              u32,
        days_to_live:             u32,
        steps_completed:          u32,
    },
    Maintenance {
        response_tone:   u32,
        fix_speed:       u32,
        accuracy:        u32,
        issues_resolved: u32,
    },
    SideTask {
        internal_coordination: u32,
        initiative:            u32,
        execution_quality:     u32,
        side_task_points:      u32,
    },
}

impl RubricScores {
    /// The three criteria in stored order: communication, speed, process compliance.
    pub fn criteria(&self) -> [(&'static str, u32); 3] {
        match *self {
            Self::Project { onboarding_communication, setup_speed, sop_quality, .. } => [
                ("Onboarding Communication & Clarity", onboarding_communication),
                ("Setup Speed & SLA Compliance", setup_speed),
                ("SOP & Onboarding Quality", sop_quality),
            ],
            Self::Maintenance { response_tone, fix_speed, accuracy, .. } => [
                ("Response Tone & Professionalism", response_tone),
                ("Resolution & Fix Speed", fix_speed),
                ("Accuracy & Data Integrity", accuracy),
            ],
            Self::SideTask { internal_coordination, initiative, execution_quality, .. } => [
                ("Internal Coordination", internal_coordination),
                ("Initiative & Proactivity", initiative),
                ("Execution Quality", execution_quality),
            ],
        }
    }

    pub fn category(&self) -> EvaluationCategory {
        match self {
            Self::Project { sub_category, .. } => EvaluationCategory::Project {
                sub_category: *sub_category,
            },
            Self::Maintenance { .. } => EvaluationCategory::Maintenance,
            Self::SideTask { .. }    => EvaluationCategory::SideTask,
        }
    }
}

/// Everything the manager enters on the evaluation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDraft {
    pub staff_id:           StaffId,
    pub date:               NaiveDate,
    pub rubric:             RubricScores,
    pub follow_up_score:    u32,
    pub clarity_score:      u32,
    pub onboarding_quality: u32,
    pub customer_feedback:  u32,
    #[serde(default)]
    pub workload:           WorkloadCounters,
    #[serde(default)]
    pub note:               String,
    #[serde(default)]
    pub case_ref:           String,
}

impl EvaluationDraft {
    /// Validate and turn the draft into a record ready for the store.
    pub fn build(&self, roster: &[StaffMember]) -> Result<EvaluationRecord, ValidationError> {
        let staff = known_staff(roster, &self.staff_id)?;
        let [(_, communication), (_, speed), (_, process)] = self.rubric.criteria();

        let (days_to_live, steps_completed, issues_resolved, side_task_points) = match self.rubric {
            RubricScores::Project { days_to_live, steps_completed, .. } => {
                (days_to_live, steps_completed, 0, 0)
            }
            RubricScores::Maintenance { issues_resolved, .. } => (0, 0, issues_resolved, 0),
            RubricScores::SideTask { side_task_points, .. } => (0, 0, 0, side_task_points),
        };

        let record = EvaluationRecord {
            id: new_record_id(),
            staff_id: staff.id.clone(),
            staff_name: staff.name.clone(),
            date: self.date,
            category: self.rubric.category(),
            communication_score: communication,
            speed_score: speed,
            follow_up_score: self.follow_up_score,
            clarity_score: self.clarity_score,
            process_compliance: process,
            onboarding_quality: self.onboarding_quality,
            days_to_live,
            steps_completed,
            incoming_calls: self.workload.incoming_calls,
            outgoing_calls: self.workload.outgoing_calls,
            total_chats: self.workload.chats,
            total_tasks: self.workload.tasks,
            issues_resolved,
            customer_feedback: self.customer_feedback,
            side_task_points,
            note: self.note.trim().to_string(),
            case_ref: self.case_ref.trim().to_string(),
        };
        validate_evaluation(&record, roster)?;
        Ok(record)
    }
}

/// Rules every stored evaluation must satisfy, whichever path created it.
pub fn validate_evaluation(
    record: &EvaluationRecord,
    roster: &[StaffMember],
) -> Result<(), ValidationError> {
    known_staff(roster, &record.staff_id)?;
    check_range("communicationScore", record.communication_score, 0, 100)?;
    check_range("speedScore", record.speed_score, 0, 100)?;
    check_range("followUpScore", record.follow_up_score, 0, 100)?;
    check_range("clarityScore", record.clarity_score, 0, 100)?;
    check_range("processCompliance", record.process_compliance, 0, 100)?;
    check_range("onboardingQuality", record.onboarding_quality, 0, 100)?;
    check_range("customerFeedback", record.customer_feedback, 0, 100)?;

    let lowest = record.primary_scores().into_iter().min().unwrap_or(100);
    if lowest < EVIDENCE_THRESHOLD && !record.has_evidence() {
        return Err(ValidationError::LowScoreWithoutEvidence {
            lowest,
            threshold: EVIDENCE_THRESHOLD,
        });
    }
    Ok(())
}
