//! The desk engine: one entry point for every mutation.
//!
//! RULES:
//!   - Commands are applied one at a time, in arrival order.
//!   - Only the store writes records; the engine validates and routes.
//!   - Every derived figure is recomputed from the records after each
//!     successful command. Nothing derived is cached between commands.

use crate::{
    assessment::{QuestionKind, TestQuestion},
    command::DeskCommand,
    config::DeskConfig,
    error::{DeskError, DeskResult},
    narrative::{prompts, NarrativeCoordinator, Subject},
    peer_review::PeerReviewRecord,
    proof::ProofRecord,
    scoring::{self, DashboardSnapshot, Records, StaffProfile},
    staff::Roster,
    store::{DeskStore, KeyValuePort, MemoryPort},
    types::RecordId,
};
use serde::Serialize;
use tokio::task::JoinHandle;

/// What a command produced: the id it touched, if any, and the
/// recomputed dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub record_id: Option<RecordId>,
    pub snapshot:  DashboardSnapshot,
}

pub struct DeskEngine {
    config: DeskConfig,
    store:  DeskStore,
}

impl DeskEngine {
    pub fn new(config: DeskConfig, store: DeskStore) -> Self {
        Self { config, store }
    }

    /// Load every document through `port` and wire up the engine.
    pub fn open(config: DeskConfig, port: Box<dyn KeyValuePort>) -> Self {
        let store = DeskStore::load(port, &config);
        Self::new(config, store)
    }

    /// Built-in configuration over an empty in-memory port.
    pub fn build_test() -> Self {
        Self::open(DeskConfig::builtin(), Box::new(MemoryPort::new()))
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn store(&self) -> &DeskStore {
        &self.store
    }

    /// Hand the store back, e.g. to reload its port.
    pub fn into_store(self) -> DeskStore {
        self.store
    }

    pub fn records(&self) -> Records<'_> {
        self.store.records()
    }

    /// Apply one command. On error nothing changes.
    pub fn apply(&mut self, command: DeskCommand) -> DeskResult<CommandOutcome> {
        let name = command.name();
        let record_id = self.route(command).map_err(|e| {
            log::warn!("command {name} rejected: {e}");
            e
        })?;
        log::info!(
            "command {name} applied{}",
            record_id.as_deref().map(|id| format!(" ({id})")).unwrap_or_default()
        );
        Ok(CommandOutcome { record_id, snapshot: self.snapshot() })
    }

    fn route(&mut self, command: DeskCommand) -> DeskResult<Option<RecordId>> {
        let id = match command {
            DeskCommand::AddEvaluation { draft } => {
                let record = draft.build(self.store.roster())?;
                Some(self.store.add_evaluation(record)?)
            }
            DeskCommand::SaveQaAudit { draft } => {
                let record = draft.commit(self.store.roster())?;
                Some(self.store.add_qa_record(record)?)
            }
            DeskCommand::SubmitTest { assessment, staff_name, answers, date } => {
                let submission = assessment.grade(&staff_name, answers, date)?;
                Some(self.store.add_test_submission(submission)?)
            }
            DeskCommand::GradeSubmission { submission_id, manual_score, feedback } => {
                let graded = self.store.grade_submission(&submission_id, manual_score, feedback)?;
                Some(graded.id.clone())
            }
            DeskCommand::AddProof { staff_id, date, description, category, image_url } => {
                let proof = ProofRecord::new(&staff_id, date, &description, category, image_url);
                Some(self.store.add_proof(proof)?)
            }
            DeskCommand::RemoveProof { proof_id } => {
                let removed = self.store.remove_proof(&proof_id)?;
                Some(removed.id)
            }
            DeskCommand::AddPeerReview {
                target_staff_id,
                reviewer_name,
                timestamp,
                teamwork,
                helpfulness,
                communication,
                comment,
            } => {
                let review = PeerReviewRecord::new(
                    &target_staff_id,
                    &reviewer_name,
                    timestamp,
                    teamwork,
                    helpfulness,
                    communication,
                    &comment,
                );
                Some(self.store.add_peer_review(review)?)
            }
            DeskCommand::SetProjectSla { category, field, value } => {
                self.store.set_project_sla(category, field, value)?;
                None
            }
            DeskCommand::SetOtherKpi { kpi, field, value } => {
                self.store.set_other_kpi(kpi, field, value)?;
                None
            }
        };
        Ok(id)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        scoring::dashboard(&self.config, &self.store.records())
    }

    /// Deep-dive profile for one staff member.
    pub fn staff_profile(&self, staff_id: &str) -> DeskResult<StaffProfile> {
        let member = self.store.roster().by_id(staff_id).ok_or_else(|| DeskError::RecordNotFound {
            collection: "staff",
            id: staff_id.to_string(),
        })?;
        Ok(scoring::staff_profile(member, &self.store.records()))
    }

    /// Ask for every dashboard narrative from the current figures.
    /// Earlier requests for the same subjects are superseded.
    /// Must be called from within a tokio runtime.
    pub fn request_narratives(&self, coordinator: &NarrativeCoordinator) -> Vec<JoinHandle<bool>> {
        let snapshot = self.snapshot();
        let ranking = &snapshot.ranking;
        let mut handles = vec![
            coordinator.request(Subject::StaffRecommendations, prompts::staff_recommendations(ranking)),
            coordinator.request(Subject::TeamGaps, prompts::team_gaps(ranking)),
            coordinator.request(Subject::TeamStrengths, prompts::team_strengths(ranking)),
            coordinator.request(
                Subject::WorkloadReasoning,
                prompts::workload_reasoning(&self.config.balance, &self.config.roster, &snapshot.workload),
            ),
        ];
        if let Some(request) = prompts::gap_insights(ranking) {
            handles.push(coordinator.request(Subject::GapInsights, request));
        }
        handles
    }

    /// Ask for wrong answers to a choice question. `None` for written
    /// questions or while the question or its answer is blank.
    /// Must be called from within a tokio runtime.
    pub fn request_distractors(
        &self,
        coordinator: &NarrativeCoordinator,
        question: &TestQuestion,
    ) -> Option<JoinHandle<bool>> {
        let QuestionKind::Choice { correct_answer, .. } = &question.kind else {
            return None;
        };
        let request = prompts::choice_distractors(&question.question, correct_answer)?;
        Some(coordinator.request(Subject::Question(question.id.clone()), request))
    }
}
