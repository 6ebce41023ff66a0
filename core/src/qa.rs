//! QA audits: a fixed three-section checklist scored per item 1–5.
//!
//! A `QaDraft` is the only mutable form of an audit. It is built from the
//! template, scored, annotated, and then committed into an immutable
//! `QARecord` for the store.

use crate::{
    capture::{check_range, known_staff, ValidationError},
    staff::StaffMember,
    types::{new_record_id, ratio_or_zero, to_percent, Percent, RecordId, StaffId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Highest score an item can receive. 0 means "not scored yet".
pub const MAX_ITEM_SCORE: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QAItem {
    pub label: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QASection {
    pub title:    String,
    pub items:    Vec<QAItem>,
    pub case_ref: String,
    pub comment:  String,
}

impl QASection {
    fn from_template(title: &str, labels: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            items: labels
                .iter()
                .map(|l| QAItem { label: l.to_string(), score: 0 })
                .collect(),
            case_ref: String::new(),
            comment:  String::new(),
        }
    }

    pub fn percentage(&self) -> Percent {
        items_percentage(self.items.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QARecord {
    pub id:                 RecordId,
    pub staff_id:           StaffId,
    pub staff_name:         String,
    pub date:               NaiveDate,
    pub sections:           Vec<QASection>,
    pub overall_percentage: Percent,
}

fn items_percentage<'a>(items: impl Iterator<Item = &'a QAItem>) -> Percent {
    let (sum, count) = items.fold((0u64, 0u64), |(s, c), i| (s + i.score as u64, c + 1));
    let possible = count * MAX_ITEM_SCORE as u64;
    to_percent(ratio_or_zero(sum as f64, possible as f64) * 100.0)
}

/// (sum of item scores) / (item count * 5) * 100, rounded. 0 for no items.
pub fn overall_percentage(sections: &[QASection]) -> Percent {
    items_percentage(sections.iter().flat_map(|s| s.items.iter()))
}

/// The fixed audit checklist: three sections of 5, 5 and 3 items.
pub fn qa_template() -> Vec<QASection> {
    vec![
        QASection::from_template(
            "1. Handling Live Projects (Project LIVE & Average Project Completion Time)",
            &[
                "Ensures smooth execution of Project Building",
                "Follows all steps correctly when setting up a new system",
                "Identifies and resolves potential issues before going live",
                "Updates project status on CRM to keep track of progress",
                "Ensures customers understand how to use their systems effectively ( Satisfaction call )",
            ],
        ),
        QASection::from_template(
            "2. Response & Resolution Time",
            &[
                "(First Response Time & Resolution Time) Respond.io / email",
                "Resolves issues efficiently while maintaining accuracy",
                "Uses professional, friendly, and service-oriented communication",
                "Asks for clarification when needed to avoid miscommunication and Follows up to ensure the issue is fully resolved and the customer is satisfied",
                "Ensures customers feel heard and valued",
            ],
        ),
        QASection::from_template(
            "3. Documentation & Accuracy",
            &[
                "Task all interactions and updates accurately in the system",
                "Avoids misinformation by cross-checking details before providing answers",
                "Adheres to company policies when handling sensitive information",
            ],
        ),
    ]
}

/// An audit in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaDraft {
    pub staff_id: StaffId,
    pub date:     NaiveDate,
    pub sections: Vec<QASection>,
}

impl QaDraft {
    pub fn new(staff_id: &str, date: NaiveDate) -> Self {
        Self {
            staff_id: staff_id.to_string(),
            date,
            sections: qa_template(),
        }
    }

    pub fn set_score(&mut self, section: usize, item: usize, score: u8) -> Result<(), ValidationError> {
        check_range("score", score as u32, 0, MAX_ITEM_SCORE as u32)?;
        let slot = self
            .sections
            .get_mut(section)
            .and_then(|s| s.items.get_mut(item))
            .ok_or(ValidationError::NoSuchItem { section, item })?;
        slot.score = score;
        Ok(())
    }

    pub fn set_case_ref(&mut self, section: usize, case_ref: &str) -> Result<(), ValidationError> {
        self.section_mut(section)?.case_ref = case_ref.to_string();
        Ok(())
    }

    pub fn set_comment(&mut self, section: usize, comment: &str) -> Result<(), ValidationError> {
        self.section_mut(section)?.comment = comment.to_string();
        Ok(())
    }

    fn section_mut(&mut self, section: usize) -> Result<&mut QASection, ValidationError> {
        self.sections
            .get_mut(section)
            .ok_or(ValidationError::NoSuchItem { section, item: 0 })
    }

    pub fn overall_percentage(&self) -> Percent {
        overall_percentage(&self.sections)
    }

    /// Freeze the draft into a record.
    pub fn commit(self, roster: &[StaffMember]) -> Result<QARecord, ValidationError> {
        let staff = known_staff(roster, &self.staff_id)?;
        let record = QARecord {
            id: new_record_id(),
            staff_id: staff.id.clone(),
            staff_name: staff.name.clone(),
            date: self.date,
            overall_percentage: overall_percentage(&self.sections),
            sections: self.sections,
        };
        validate_qa_record(&record, roster)?;
        Ok(record)
    }
}

pub fn validate_qa_record(record: &QARecord, roster: &[StaffMember]) -> Result<(), ValidationError> {
    known_staff(roster, &record.staff_id)?;
    for item in record.sections.iter().flat_map(|s| s.items.iter()) {
        check_range("score", item.score as u32, 0, MAX_ITEM_SCORE as u32)?;
    }
    check_range("overallPercentage", record.overall_percentage, 0, 100)?;
    Ok(())
}
