//! Prompt builders. Each embeds scoring output as compact JSON.

use super::{ExpectedShape, NarrativePayload, NarrativeRequest};
use crate::{
    config::BalancePlan,
    scoring::StaffScore,
    staff::{Roster, StaffMember},
    workload::WorkloadRow,
};
use serde::Serialize;

/// Staff at or above this composite score get no individual gap insight.
pub const INSIGHT_THRESHOLD: u32 = 75;

/// Wrong answers offered alongside each choice question.
pub const DISTRACTOR_COUNT: usize = 3;

#[derive(Serialize)]
struct ScoreLine<'a> {
    name:  &'a str,
    score: u32,
}

fn score_lines(ranking: &[StaffScore]) -> String {
    let lines: Vec<ScoreLine<'_>> = ranking
        .iter()
        .map(|s| ScoreLine { name: &s.name, score: s.score })
        .collect();
    serde_json::to_string(&lines).unwrap_or_default()
}

pub fn staff_recommendations(ranking: &[StaffScore]) -> NarrativeRequest {
    NarrativeRequest {
        prompt: format!(
            "Based on these performance scores (out of 100), give ONE short five-word \
             recommendation for each staff member on what to focus on next.\n\
             Data: {}\n\
             Format as JSON object: {{ \"StaffName\": \"Recommendation\" }}",
            score_lines(ranking)
        ),
        shape: ExpectedShape::Map,
    }
}

pub fn team_gaps(ranking: &[StaffScore]) -> NarrativeRequest {
    NarrativeRequest {
        prompt: format!(
            "Analyze this customer support team's performance data:\n\
             Team Data: {}\n\
             List the overall team gaps: the skills missing as a collective.\n\
             Return a JSON array of short strings.",
            score_lines(ranking)
        ),
        shape: ExpectedShape::List,
    }
}

pub fn team_strengths(ranking: &[StaffScore]) -> NarrativeRequest {
    NarrativeRequest {
        prompt: format!(
            "Analyze this customer support team's performance data:\n\
             Team Data: {}\n\
             List the team's strengths.\n\
             Return a JSON array of short strings.",
            score_lines(ranking)
        ),
        shape: ExpectedShape::List,
    }
}

/// Gap area and recommendation for staff scoring below the threshold only.
/// `None` when nobody is below it.
pub fn gap_insights(ranking: &[StaffScore]) -> Option<NarrativeRequest> {
    let below: Vec<StaffScore> = ranking
        .iter()
        .filter(|s| s.score < INSIGHT_THRESHOLD)
        .cloned()
        .collect();
    if below.is_empty() {
        return None;
    }
    Some(NarrativeRequest {
        prompt: format!(
            "These customer support staff scored below {INSIGHT_THRESHOLD}%:\n\
             Data: {}\n\
             For each, name the gap area and one recommendation for improvement.\n\
             Format as JSON object: {{ \"StaffName\": \"Gap area: recommendation\" }}",
            score_lines(&below)
        ),
        shape: ExpectedShape::Map,
    })
}

fn describe_plan(plan: &BalancePlan, roster: &[StaffMember]) -> String {
    let name = |id: &str| roster.by_id(id).map_or(id.to_string(), |m| m.name.clone());
    let mut lines: Vec<String> = plan
        .pairs
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {} buddy with {}", i + 1, name(p.first.as_str()), name(p.second.as_str())))
        .collect();
    if let Some(solo) = &plan.solo {
        let group: Vec<String> = solo.comparison_group.iter().map(|id| name(id.as_str())).collect();
        lines.push(format!(
            "{}. {} has NO buddy but is EXPECTED to carry {:.0}% of the average workload of ({}).",
            lines.len() + 1,
            name(solo.staff_id.as_str()),
            solo.multiplier * 100.0,
            group.join(", ")
        ));
    }
    lines.join("\n")
}

pub fn workload_reasoning(
    plan: &BalancePlan,
    roster: &[StaffMember],
    rows: &[WorkloadRow],
) -> NarrativeRequest {
    NarrativeRequest {
        prompt: format!(
            "You are a CS Manager analyzing workload balance based on these buddy pairs:\n\
             {}\n\n\
             Data: {}\n\n\
             For buddies: compare them; if one has more calls but the other more chats, \
             call it balanced and explain why.\n\
             For the unpaired staff member: say whether the target is being reached.\n\
             Format as JSON object: {{ \"StaffName\": \"Brief explanation (max 15 words)\" }}",
            describe_plan(plan, roster),
            serde_json::to_string(rows).unwrap_or_default()
        ),
        shape: ExpectedShape::Map,
    }
}

/// Plausible wrong answers for a choice question.
/// `None` until both the question and its correct answer are filled in.
pub fn choice_distractors(question: &str, correct_answer: &str) -> Option<NarrativeRequest> {
    if question.trim().is_empty() || correct_answer.trim().is_empty() {
        return None;
    }
    Some(NarrativeRequest {
        prompt: format!(
            "Given the question: \"{}\" and the correct answer: \"{}\", generate \
             {DISTRACTOR_COUNT} plausible but incorrect multiple-choice options (distractors) \
             that look like common mistakes or alternatives. Provide the answer in simple \
             JSON array format containing exactly {DISTRACTOR_COUNT} strings.",
            question.trim(),
            correct_answer.trim()
        ),
        shape: ExpectedShape::List,
    })
}

/// The first `DISTRACTOR_COUNT` entries of a list payload.
pub fn distractors_from(payload: &NarrativePayload) -> Option<Vec<String>> {
    match payload {
        NarrativePayload::List(items) => {
            Some(items.iter().take(DISTRACTOR_COUNT).cloned().collect())
        }
        _ => None,
    }
}
