use crate::{
    assessment::AssessmentRecord,
    capture::EvaluationDraft,
    proof::ProofCategory,
    qa::QaDraft,
    tally::{OtherKpi, ProjectCategory, TallyField},
    types::{RecordId, StaffId},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every mutation a manager (or test taker) can make.
/// Variants are appended, never reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DeskCommand {
    // ── Capture ───────────────────────────────────
    AddEvaluation {
        draft: EvaluationDraft,
    },
    SaveQaAudit {
        draft: QaDraft,
    },
    SubmitTest {
        assessment: AssessmentRecord,
        staff_name: String,
        answers:    BTreeMap<String, String>,
        date:       NaiveDate,
    },
    GradeSubmission {
        submission_id: RecordId,
        manual_score:  u32,
        #[serde(default)]
        feedback:      Option<String>,
    },

    // ── Internal logs ─────────────────────────────
    AddProof {
        staff_id:    StaffId,
        date:        NaiveDate,
        description: String,
        category:    ProofCategory,
        #[serde(default)]
        image_url:   Option<String>,
    },
    RemoveProof {
        proof_id: RecordId,
    },
    AddPeerReview {
        target_staff_id: StaffId,
        reviewer_name:   String,
        timestamp:       DateTime<Utc>,
        teamwork:        u8,
        helpfulness:     u8,
        communication:   u8,
        comment:         String,
    },

    // ── Tallies ───────────────────────────────────
    SetProjectSla {
        category: ProjectCategory,
        field:    TallyField,
        value:    u32,
    },
    SetOtherKpi {
        kpi:   OtherKpi,
        field: TallyField,
        value: u32,
    },
}

impl DeskCommand {
    /// Stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddEvaluation { .. }   => "add_evaluation",
            Self::SaveQaAudit { .. }     => "save_qa_audit",
            Self::SubmitTest { .. }      => "submit_test",
            Self::GradeSubmission { .. } => "grade_submission",
            Self::AddProof { .. }        => "add_proof",
            Self::RemoveProof { .. }     => "remove_proof",
            Self::AddPeerReview { .. }   => "add_peer_review",
            Self::SetProjectSla { .. }   => "set_project_sla",
            Self::SetOtherKpi { .. }     => "set_other_kpi",
        }
    }
}
