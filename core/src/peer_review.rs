//! Peer reviews collected from teammates.

use crate::{
    capture::{check_range, known_staff, require, ValidationError},
    staff::StaffMember,
    types::{new_record_id, RecordId, StaffId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerReviewRecord {
    pub id:                  RecordId,
    pub target_staff_id:     StaffId,
    pub reviewer_name:       String,
    /// Review cycle label, e.g. "December 2024".
    pub date:                String,
    pub timestamp:           DateTime<Utc>,
    pub teamwork_score:      u8,
    pub helpfulness_score:   u8,
    pub communication_score: u8,
    pub comment:             String,
}

impl PeerReviewRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        target_staff_id: &str,
        reviewer_name: &str,
        timestamp: DateTime<Utc>,
        teamwork: u8,
        helpfulness: u8,
        communication: u8,
        comment: &str,
    ) -> Self {
        Self {
            id: new_record_id(),
            target_staff_id: target_staff_id.to_string(),
            reviewer_name: reviewer_name.trim().to_string(),
            date: timestamp.format("%B %Y").to_string(),
            timestamp,
            teamwork_score: teamwork,
            helpfulness_score: helpfulness,
            communication_score: communication,
            comment: comment.trim().to_string(),
        }
    }

    pub fn average(&self) -> f64 {
        (self.teamwork_score as f64 + self.helpfulness_score as f64 + self.communication_score as f64)
            / 3.0
    }
}

pub fn validate_peer_review(
    record: &PeerReviewRecord,
    roster: &[StaffMember],
) -> Result<(), ValidationError> {
    known_staff(roster, &record.target_staff_id)?;
    require("reviewerName", &record.reviewer_name)?;
    require("comment", &record.comment)?;
    check_range("teamworkScore", record.teamwork_score as u32, 1, 5)?;
    check_range("helpfulnessScore", record.helpfulness_score as u32, 1, 5)?;
    check_range("communicationScore", record.communication_score as u32, 1, 5)?;
    Ok(())
}
