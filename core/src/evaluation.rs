//! Qualitative evaluation records.

use crate::{
    tally::{ProjectCategory, SlaTargets},
    types::{RecordId, StaffId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Evaluation category. A project evaluation always names its project type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EvaluationCategory {
    Project {
        #[serde(rename = "projectSubCategory")]
        sub_category: ProjectCategory,
    },
    Maintenance,
    SideTask,
}

impl EvaluationCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Project { .. } => "Project",
            Self::Maintenance    => "Maintenance",
            Self::SideTask       => "SideTask",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub id:         RecordId,
    pub staff_id:   StaffId,
    pub staff_name: String,
    pub date:       NaiveDate,
    #[serde(flatten)]
    pub category:   EvaluationCategory,

    pub communication_score: u32,
    pub speed_score:         u32,
    pub follow_up_score:     u32,
    pub clarity_score:       u32,
    pub process_compliance:  u32,
    pub onboarding_quality:  u32,

    pub days_to_live:    u32,
    pub steps_completed: u32,

    pub incoming_calls: u32,
    pub outgoing_calls: u32,
    pub total_chats:    u32,
    pub total_tasks:    u32,

    pub issues_resolved:   u32,
    pub customer_feedback: u32,
    pub side_task_points:  u32,

    pub note: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub case_ref: String,
}

impl EvaluationRecord {
    /// Mean of the three primary scores: communication, speed, process compliance.
    pub fn primary_average(&self) -> f64 {
        self.primary_scores().iter().map(|s| *s as f64).sum::<f64>() / 3.0
    }

    /// Mean of all six behavioural scores.
    pub fn six_dimension_average(&self) -> f64 {
        self.dimension_scores().iter().map(|(_, s)| *s as f64).sum::<f64>() / 6.0
    }

    pub fn dimension_scores(&self) -> [(&'static str, u32); 6] {
        [
            ("Communication", self.communication_score),
            ("Speed", self.speed_score),
            ("FollowUp", self.follow_up_score),
            ("Clarity", self.clarity_score),
            ("Process", self.process_compliance),
            ("Quality", self.onboarding_quality),
        ]
    }

    pub fn primary_scores(&self) -> [u32; 3] {
        [self.communication_score, self.speed_score, self.process_compliance]
    }

    pub fn has_evidence(&self) -> bool {
        !self.note.trim().is_empty() || !self.case_ref.trim().is_empty()
    }

    /// Whether a project went live within its category target.
    /// `None` for non-project evaluations.
    pub fn met_go_live_target(&self, targets: &SlaTargets) -> Option<bool> {
        match self.category {
            EvaluationCategory::Project { sub_category } => {
                Some(self.days_to_live <= targets.days_for(sub_category))
            }
            _ => None,
        }
    }
}

/// Evaluations loaded when no prior state exists.
pub fn seed_evaluations() -> Vec<EvaluationRecord> {
    let date = |d: u32| NaiveDate::from_ymd_opt(2024, 12, d).unwrap_or_default();
    vec![
        EvaluationRecord {
            id: "e1".into(),
            staff_id: "1".into(),
            staff_name: "Pookie".into(),
            date: date(1),
            category: EvaluationCategory::Project { sub_category: ProjectCategory::Restaurant },
            communication_score: 85,
            speed_score: 90,
            follow_up_score: 80,
            clarity_score: 88,
            process_compliance: 100,
            onboarding_quality: 92,
            days_to_live: 8,
            steps_completed: 10,
            incoming_calls: 5,
            outgoing_calls: 12,
            total_chats: 45,
            total_tasks: 8,
            issues_resolved: 0,
            customer_feedback: 95,
            side_task_points: 10,
            note: "Excellent restaurant setup.".into(),
            case_ref: String::new(),
        },
        EvaluationRecord {
            id: "e2".into(),
            staff_id: "2".into(),
            staff_name: "Gam".into(),
            date: date(2),
            category: EvaluationCategory::Maintenance,
            communication_score: 75,
            speed_score: 85,
            follow_up_score: 70,
            clarity_score: 80,
            process_compliance: 80,
            onboarding_quality: 75,
            days_to_live: 0,
            steps_completed: 0,
            incoming_calls: 25,
            outgoing_calls: 10,
            total_chats: 80,
            total_tasks: 20,
            issues_resolved: 15,
            customer_feedback: 85,
            side_task_points: 5,
            note: "Handled many menu updates.".into(),
            case_ref: String::new(),
        },
        EvaluationRecord {
            id: "e3".into(),
            staff_id: "3".into(),
            staff_name: "Pume".into(),
            date: date(3),
            category: EvaluationCategory::Project { sub_category: ProjectCategory::Massage },
            communication_score: 92,
            speed_score: 78,
            follow_up_score: 95,
            clarity_score: 90,
            process_compliance: 90,
            onboarding_quality: 88,
            days_to_live: 14,
            steps_completed: 9,
            incoming_calls: 8,
            outgoing_calls: 15,
            total_chats: 30,
            total_tasks: 12,
            issues_resolved: 0,
            customer_feedback: 100,
            side_task_points: 20,
            note: "Very thorough with massage system details.".into(),
            case_ref: String::new(),
        },
        EvaluationRecord {
            id: "e4".into(),
            staff_id: "5".into(),
            staff_name: "Aim".into(),
            date: date(4),
            category: EvaluationCategory::Project { sub_category: ProjectCategory::AiReceptionist },
            communication_score: 90,
            speed_score: 95,
            follow_up_score: 85,
            clarity_score: 95,
            process_compliance: 100,
            onboarding_quality: 95,
            days_to_live: 2,
            steps_completed: 10,
            incoming_calls: 12,
            outgoing_calls: 8,
            total_chats: 25,
            total_tasks: 15,
            issues_resolved: 0,
            customer_feedback: 98,
            side_task_points: 0,
            note: "Fast AI deployment.".into(),
            case_ref: String::new(),
        },
    ]
}
