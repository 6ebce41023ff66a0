//! The record store.
//!
//! RULE: Only the store writes records. Every mutation is persisted
//! before it becomes visible; a failed write leaves memory unchanged.
//!
//! Seven independent documents, one per key. A document that cannot be
//! read or parsed falls back to its default and is logged; it never
//! takes the others down with it.

mod port;
mod sqlite;

pub use port::{KeyValuePort, MemoryPort};
pub use sqlite::SqlitePort;

use crate::{
    assessment::{validate_submission, TestSubmission},
    capture::validate_evaluation,
    config::DeskConfig,
    error::{DeskError, DeskResult},
    evaluation::{seed_evaluations, EvaluationRecord},
    peer_review::{validate_peer_review, PeerReviewRecord},
    proof::{validate_proof, ProofRecord},
    qa::{validate_qa_record, QARecord},
    scoring::Records,
    staff::StaffMember,
    tally::{OtherKpi, OtherKpiTallies, ProjectCategory, ProjectSlaTallies, TallyField},
    types::{new_record_id, RecordId},
};
use serde::{de::DeserializeOwned, Serialize};

/// Storage keys, one JSON document each.
pub mod keys {
    pub const EVALUATIONS: &str = "cs_evaluations_v3";
    pub const QA_RECORDS: &str = "cs_qa_records_v1";
    pub const TEST_SUBMISSIONS: &str = "cs_test_submissions_v1";
    pub const PROOF_RECORDS: &str = "cs_proof_records_v1";
    pub const PEER_REVIEWS: &str = "cs_peer_review_records_v1";
    pub const PROJECT_SLA: &str = "cs_project_sla_v1";
    pub const OTHER_KPIS: &str = "cs_other_kpis_v1";

    pub const ALL: [&str; 7] = [
        EVALUATIONS,
        QA_RECORDS,
        TEST_SUBMISSIONS,
        PROOF_RECORDS,
        PEER_REVIEWS,
        PROJECT_SLA,
        OTHER_KPIS,
    ];
}

/// Records that carry an identifier the store may need to assign.
pub trait Identified {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: RecordId);
}

macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str { &self.id }
            fn set_id(&mut self, id: RecordId) { self.id = id; }
        })*
    };
}

identified!(EvaluationRecord, QARecord, TestSubmission, ProofRecord, PeerReviewRecord);

pub struct DeskStore {
    port:             Box<dyn KeyValuePort>,
    roster:           Vec<StaffMember>,
    evaluations:      Vec<EvaluationRecord>,
    qa_records:       Vec<QARecord>,
    test_submissions: Vec<TestSubmission>,
    proof_records:    Vec<ProofRecord>,
    peer_reviews:     Vec<PeerReviewRecord>,
    project_sla:      ProjectSlaTallies,
    other_kpis:       OtherKpiTallies,
}

impl DeskStore {
    /// Restore every collection from `port`, substituting defaults for
    /// anything missing or unreadable.
    pub fn load(port: Box<dyn KeyValuePort>, config: &DeskConfig) -> Self {
        let evaluations = load_document(port.as_ref(), keys::EVALUATIONS, seed_evaluations);
        let qa_records = load_document(port.as_ref(), keys::QA_RECORDS, Vec::new);
        let test_submissions = load_document(port.as_ref(), keys::TEST_SUBMISSIONS, Vec::new);
        let proof_records = load_document(port.as_ref(), keys::PROOF_RECORDS, Vec::new);
        let peer_reviews = load_document(port.as_ref(), keys::PEER_REVIEWS, Vec::new);
        let project_sla = load_document(port.as_ref(), keys::PROJECT_SLA, || {
            ProjectSlaTallies::with_targets(&config.sla_targets)
        });
        let other_kpis = load_document(port.as_ref(), keys::OTHER_KPIS, || config.default_kpis);

        log::debug!(
            "store loaded: {} evaluations, {} qa, {} tests, {} proofs, {} peer reviews",
            evaluations.len(),
            qa_records.len(),
            test_submissions.len(),
            proof_records.len(),
            peer_reviews.len(),
        );

        Self {
            port,
            roster: config.roster.clone(),
            evaluations,
            qa_records,
            test_submissions,
            proof_records,
            peer_reviews,
            project_sla,
            other_kpis,
        }
    }

    /// Write every document, e.g. to materialise defaults on first run.
    pub fn save_all(&mut self) -> DeskResult<()> {
        let port = self.port.as_mut();
        write_document(port, keys::EVALUATIONS, &self.evaluations)?;
        write_document(port, keys::QA_RECORDS, &self.qa_records)?;
        write_document(port, keys::TEST_SUBMISSIONS, &self.test_submissions)?;
        write_document(port, keys::PROOF_RECORDS, &self.proof_records)?;
        write_document(port, keys::PEER_REVIEWS, &self.peer_reviews)?;
        write_document(port, keys::PROJECT_SLA, &self.project_sla)?;
        write_document(port, keys::OTHER_KPIS, &self.other_kpis)?;
        Ok(())
    }

    /// Hand back the port, e.g. to reload from it.
    pub fn into_port(self) -> Box<dyn KeyValuePort> {
        self.port
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn roster(&self) -> &[StaffMember] {
        &self.roster
    }

    pub fn evaluations(&self) -> &[EvaluationRecord] {
        &self.evaluations
    }

    pub fn qa_records(&self) -> &[QARecord] {
        &self.qa_records
    }

    pub fn test_submissions(&self) -> &[TestSubmission] {
        &self.test_submissions
    }

    pub fn proof_records(&self) -> &[ProofRecord] {
        &self.proof_records
    }

    pub fn peer_reviews(&self) -> &[PeerReviewRecord] {
        &self.peer_reviews
    }

    pub fn project_sla(&self) -> &ProjectSlaTallies {
        &self.project_sla
    }

    pub fn other_kpis(&self) -> &OtherKpiTallies {
        &self.other_kpis
    }

    /// Borrowed view for the scoring engine.
    pub fn records(&self) -> Records<'_> {
        Records {
            evaluations:      &self.evaluations,
            qa_records:       &self.qa_records,
            test_submissions: &self.test_submissions,
            proof_records:    &self.proof_records,
            peer_reviews:     &self.peer_reviews,
            project_sla:      &self.project_sla,
            other_kpis:       &self.other_kpis,
        }
    }

    // ── Appends ────────────────────────────────────────────────

    pub fn add_evaluation(&mut self, record: EvaluationRecord) -> DeskResult<RecordId> {
        validate_evaluation(&record, &self.roster)?;
        append(self.port.as_mut(), keys::EVALUATIONS, &mut self.evaluations, record)
    }

    pub fn add_qa_record(&mut self, record: QARecord) -> DeskResult<RecordId> {
        validate_qa_record(&record, &self.roster)?;
        append(self.port.as_mut(), keys::QA_RECORDS, &mut self.qa_records, record)
    }

    pub fn add_test_submission(&mut self, record: TestSubmission) -> DeskResult<RecordId> {
        validate_submission(&record)?;
        append(self.port.as_mut(), keys::TEST_SUBMISSIONS, &mut self.test_submissions, record)
    }

    pub fn add_proof(&mut self, record: ProofRecord) -> DeskResult<RecordId> {
        validate_proof(&record, &self.roster)?;
        append(self.port.as_mut(), keys::PROOF_RECORDS, &mut self.proof_records, record)
    }

    pub fn add_peer_review(&mut self, record: PeerReviewRecord) -> DeskResult<RecordId> {
        validate_peer_review(&record, &self.roster)?;
        append(self.port.as_mut(), keys::PEER_REVIEWS, &mut self.peer_reviews, record)
    }

    // ── Edits ──────────────────────────────────────────────────

    /// Manager-initiated deletion. The only removal the store supports.
    pub fn remove_proof(&mut self, id: &str) -> DeskResult<ProofRecord> {
        let index = self
            .proof_records
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DeskError::RecordNotFound { collection: "proof", id: id.to_string() })?;
        let removed = self.proof_records.remove(index);
        if let Err(e) = write_document(self.port.as_mut(), keys::PROOF_RECORDS, &self.proof_records) {
            self.proof_records.insert(index, removed);
            return Err(e);
        }
        Ok(removed)
    }

    /// Record the manual grade for a submission's written questions.
    pub fn grade_submission(
        &mut self,
        id: &str,
        manual_score: u32,
        feedback: Option<String>,
    ) -> DeskResult<&TestSubmission> {
        let index = self
            .test_submissions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| DeskError::RecordNotFound {
                collection: "test submission",
                id: id.to_string(),
            })?;
        let graded = self.test_submissions[index].with_manual_grade(manual_score, feedback)?;
        let previous = std::mem::replace(&mut self.test_submissions[index], graded);
        if let Err(e) =
            write_document(self.port.as_mut(), keys::TEST_SUBMISSIONS, &self.test_submissions)
        {
            self.test_submissions[index] = previous;
            return Err(e);
        }
        Ok(&self.test_submissions[index])
    }

    pub fn set_project_sla(
        &mut self,
        category: ProjectCategory,
        field: TallyField,
        value: u32,
    ) -> DeskResult<()> {
        let mut candidate = self.project_sla;
        candidate.set(category, field, value);
        write_document(self.port.as_mut(), keys::PROJECT_SLA, &candidate)?;
        self.project_sla = candidate;
        Ok(())
    }

    pub fn set_other_kpi(&mut self, kpi: OtherKpi, field: TallyField, value: u32) -> DeskResult<()> {
        let mut candidate = self.other_kpis;
        candidate.set(kpi, field, value);
        write_document(self.port.as_mut(), keys::OTHER_KPIS, &candidate)?;
        self.other_kpis = candidate;
        Ok(())
    }
}

fn load_document<T, F>(port: &dyn KeyValuePort, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match port.read(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("document '{key}' is corrupt, using default: {e}");
                default()
            }
        },
        Ok(None) => default(),
        Err(e) => {
            log::warn!("document '{key}' could not be read, using default: {e}");
            default()
        }
    }
}

fn write_document<T: Serialize + ?Sized>(
    port: &mut dyn KeyValuePort,
    key: &str,
    value: &T,
) -> DeskResult<()> {
    let json = serde_json::to_string(value)?;
    port.write(key, &json)?;
    log::debug!("document '{key}' written ({} bytes)", json.len());
    Ok(())
}

/// Push `record`, assigning a fresh id if it has none or its id is taken,
/// then persist.
/// Pops it again if the write fails.
fn append<T>(
    port: &mut dyn KeyValuePort,
    key: &str,
    collection: &mut Vec<T>,
    mut record: T,
) -> DeskResult<RecordId>
where
    T: Identified + Serialize,
{
    if record.id().trim().is_empty() || collection.iter().any(|r| r.id() == record.id()) {
        record.set_id(new_record_id());
    }
    let id = record.id().to_string();
    collection.push(record);
    if let Err(e) = write_document(port, key, collection.as_slice()) {
        collection.pop();
        return Err(e);
    }
    Ok(id)
}
