//! Proof vault: dated evidence entries, optionally with an embedded image.

use crate::{
    capture::{known_staff, require, ValidationError},
    staff::StaffMember,
    types::{new_record_id, RecordId, StaffId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofCategory {
    Positive,
    Improvement,
    #[serde(rename = "Internal Note")]
    InternalNote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    pub id:          RecordId,
    pub staff_id:    StaffId,
    pub date:        NaiveDate,
    pub description: String,
    pub category:    ProofCategory,
    /// Base64 image payload, stored as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url:   Option<String>,
}

impl ProofRecord {
    pub fn new(
        staff_id: &str,
        date: NaiveDate,
        description: &str,
        category: ProofCategory,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id: new_record_id(),
            staff_id: staff_id.to_string(),
            date,
            description: description.trim().to_string(),
            category,
            image_url,
        }
    }
}

pub fn validate_proof(record: &ProofRecord, roster: &[StaffMember]) -> Result<(), ValidationError> {
    known_staff(roster, &record.staff_id)?;
    require("description", &record.description)
}

/// Proofs for one staff member, optionally narrowed to a category, newest first.
pub fn proofs_for<'a>(
    proofs: &'a [ProofRecord],
    staff_id: &str,
    category: Option<ProofCategory>,
) -> Vec<&'a ProofRecord> {
    let mut out: Vec<&ProofRecord> = proofs
        .iter()
        .filter(|p| p.staff_id == staff_id)
        .filter(|p| category.map_or(true, |c| p.category == c))
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}
