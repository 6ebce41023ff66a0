//! The scoring engine: pure functions from records to dashboard figures.
//!
//! Nothing here mutates its inputs or fails. Every average over an empty
//! collection is either excluded (composite sources) or taken as 0.

use crate::{
    assessment::TestSubmission,
    config::DeskConfig,
    evaluation::EvaluationRecord,
    peer_review::PeerReviewRecord,
    proof::ProofRecord,
    qa::QARecord,
    staff::StaffMember,
    tally::{display_pct, OtherKpiTallies, ProjectCategory, ProjectSlaTallies},
    types::{mean, to_percent, Percent, StaffId},
    workload::{mean_weighted_units, workload_report, WorkloadRow},
};
use serde::{Deserialize, Serialize};

/// Borrowed view of everything the engine reads.
#[derive(Debug, Clone, Copy)]
pub struct Records<'a> {
    pub evaluations:      &'a [EvaluationRecord],
    pub qa_records:       &'a [QARecord],
    pub test_submissions: &'a [TestSubmission],
    pub proof_records:    &'a [ProofRecord],
    pub peer_reviews:     &'a [PeerReviewRecord],
    pub project_sla:      &'a ProjectSlaTallies,
    pub other_kpis:       &'a OtherKpiTallies,
}

// ── Composite score ─────────────────────────────────────────────

/// Unrounded per-source averages for one staff member.
/// `None` means the source has no records for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAverages {
    pub evaluation: Option<f64>,
    pub qa:         Option<f64>,
    pub test:       Option<f64>,
}

impl SourceAverages {
    /// Mean of the sources that have records, rounded. 0 if none do.
    pub fn composite(&self) -> Percent {
        mean([self.evaluation, self.qa, self.test].into_iter().flatten())
            .map(to_percent)
            .unwrap_or(0)
    }
}

pub fn source_averages(member: &StaffMember, records: &Records<'_>) -> SourceAverages {
    SourceAverages {
        evaluation: mean(
            records
                .evaluations
                .iter()
                .filter(|e| e.staff_id == member.id)
                .map(EvaluationRecord::primary_average),
        ),
        qa: mean(
            records
                .qa_records
                .iter()
                .filter(|r| r.staff_id == member.id)
                .map(|r| r.overall_percentage as f64),
        ),
        // Test takers type their own name; match it exactly.
        test: mean(
            records
                .test_submissions
                .iter()
                .filter(|t| t.staff_name == member.name)
                .map(TestSubmission::score_pct),
        ),
    }
}

pub fn composite_score(member: &StaffMember, records: &Records<'_>) -> Percent {
    source_averages(member, records).composite()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffScore {
    pub staff_id: StaffId,
    pub name:     String,
    pub score:    Percent,
}

/// Every roster member by composite score, highest first.
/// Ties keep roster order.
pub fn team_ranking(roster: &[StaffMember], records: &Records<'_>) -> Vec<StaffScore> {
    let mut scores: Vec<StaffScore> = roster
        .iter()
        .map(|m| StaffScore {
            staff_id: m.id.clone(),
            name:     m.name.clone(),
            score:    composite_score(m, records),
        })
        .collect();
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores
}

// ── QA ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaStats {
    pub average: Percent,
    pub count:   usize,
}

pub fn qa_stats(qa_records: &[QARecord]) -> QaStats {
    QaStats {
        average: mean(qa_records.iter().map(|r| r.overall_percentage as f64))
            .map(to_percent)
            .unwrap_or(0),
        count: qa_records.len(),
    }
}

// ── SLA ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaSummary {
    pub restaurant_pct:  Percent,
    pub massage_pct:     Percent,
    pub ai_pct:          Percent,
    pub overall:         Percent,
    pub total_projects:  u32,
}

/// Unweighted mean of the three category percentages, each 0 when empty.
pub fn global_sla(tallies: &ProjectSlaTallies) -> SlaSummary {
    let pct = |c: ProjectCategory| tallies.get(c).tally().percentage();
    let overall = ProjectCategory::ALL.iter().map(|c| pct(*c)).sum::<f64>() / 3.0;
    SlaSummary {
        restaurant_pct: display_pct(&tallies.restaurant.tally()),
        massage_pct:    display_pct(&tallies.massage.tally()),
        ai_pct:         display_pct(&tallies.ai.tally()),
        overall:        to_percent(overall),
        total_projects: tallies.total_projects(),
    }
}

// ── Team ────────────────────────────────────────────────────────

/// Mean of: mean composite, response-speed %, CSAT %, QA average.
/// Each part counts even when its source is empty (as 0).
pub fn team_weighted_average(
    ranking: &[StaffScore],
    kpis: &OtherKpiTallies,
    qa: &QaStats,
) -> Percent {
    let individual = mean(ranking.iter().map(|s| s.score as f64)).unwrap_or(0.0);
    to_percent(
        (individual + kpis.response_speed_pct() + kpis.csat_pct() + qa.average as f64) / 4.0,
    )
}

/// Sum of stored side-task points over every evaluation, whatever its category.
pub fn side_task_points(evaluations: &[EvaluationRecord]) -> u64 {
    evaluations.iter().map(|e| e.side_task_points as u64).sum()
}

// ── Staff deep dive ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionAverage {
    pub subject: String,
    pub score:   Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub staff:              StaffMember,
    pub composite:          Percent,
    pub sources:            SourceAverages,
    /// Empty when the staff member has no evaluations.
    pub dimensions:         Vec<DimensionAverage>,
    pub overall_individual: Percent,
    /// Peer average on the 1–5 scale, rounded. 0 with no reviews.
    pub peer_average:       u32,
    pub evaluation_count:   usize,
    pub peer_review_count:  usize,
    pub proof_count:        usize,
}

pub fn staff_profile(member: &StaffMember, records: &Records<'_>) -> StaffProfile {
    let evals: Vec<&EvaluationRecord> = records
        .evaluations
        .iter()
        .filter(|e| e.staff_id == member.id)
        .collect();
    let reviews: Vec<&PeerReviewRecord> = records
        .peer_reviews
        .iter()
        .filter(|r| r.target_staff_id == member.id)
        .collect();

    let dimensions = match evals.first() {
        None => Vec::new(),
        Some(first) => first
            .dimension_scores()
            .iter()
            .enumerate()
            .map(|(i, (subject, _))| DimensionAverage {
                subject: subject.to_string(),
                score:   mean(evals.iter().map(|e| e.dimension_scores()[i].1 as f64))
                    .map(to_percent)
                    .unwrap_or(0),
            })
            .collect(),
    };

    let sources = source_averages(member, records);
    StaffProfile {
        staff: member.clone(),
        composite: sources.composite(),
        sources,
        dimensions,
        overall_individual: mean(evals.iter().map(|e| e.six_dimension_average()))
            .map(to_percent)
            .unwrap_or(0),
        peer_average: mean(reviews.iter().map(|r| r.average()))
            .map(to_percent)
            .unwrap_or(0),
        evaluation_count: evals.len(),
        peer_review_count: reviews.len(),
        proof_count: records
            .proof_records
            .iter()
            .filter(|p| p.staff_id == member.id)
            .count(),
    }
}

// ── Dashboard ───────────────────────────────────────────────────

/// Every derived figure, recomputed in one pass after each mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub ranking:               Vec<StaffScore>,
    pub qa:                    QaStats,
    pub sla:                   SlaSummary,
    pub team_weighted_average: Percent,
    pub side_task_points:      u64,
    pub workload:              Vec<WorkloadRow>,
    pub mean_weighted_units:   f64,
}

pub fn dashboard(config: &DeskConfig, records: &Records<'_>) -> DashboardSnapshot {
    let ranking = team_ranking(&config.roster, records);
    let qa = qa_stats(records.qa_records);
    let workload = workload_report(&config.roster, &config.balance, records.evaluations);
    let totals: Vec<_> = workload.iter().map(|r| r.totals.clone()).collect();
    DashboardSnapshot {
        team_weighted_average: team_weighted_average(&ranking, records.other_kpis, &qa),
        sla: global_sla(records.project_sla),
        side_task_points: side_task_points(records.evaluations),
        mean_weighted_units: mean_weighted_units(&totals),
        ranking,
        qa,
        workload,
    }
}
