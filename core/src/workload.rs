//! Workload weighting and buddy-balance verdicts.
//!
//! Weighted units = (incoming + outgoing calls) * CALL_WEIGHT
//!                + chats * CHAT_WEIGHT + tasks * TASK_WEIGHT.
//!
//! Paired staff are compared with their buddy; the designated solo staff
//! member is compared with a multiple of a comparison group's mean.
//! Anyone else is reported as unmapped rather than guessed at.

use crate::{
    config::BalancePlan,
    evaluation::EvaluationRecord,
    staff::StaffMember,
    types::{mean, StaffId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CALL_WEIGHT: u64 = 5;
pub const CHAT_WEIGHT: u64 = 2;
pub const TASK_WEIGHT: u64 = 3;

/// Raw interaction counts as entered on an evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadCounters {
    pub incoming_calls: u32,
    pub outgoing_calls: u32,
    pub chats:          u32,
    pub tasks:          u32,
}

impl WorkloadCounters {
    pub fn of(record: &EvaluationRecord) -> Self {
        Self {
            incoming_calls: record.incoming_calls,
            outgoing_calls: record.outgoing_calls,
            chats:          record.total_chats,
            tasks:          record.total_tasks,
        }
    }

    pub fn calls(&self) -> u64 {
        WorkloadSums::from(*self).calls()
    }

    pub fn weighted_units(&self) -> u64 {
        WorkloadSums::from(*self).weighted_units()
    }
}

/// Counters summed across many evaluations. Wide enough that no
/// realistic history overflows; sums saturate rather than wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSums {
    pub incoming_calls: u64,
    pub outgoing_calls: u64,
    pub chats:          u64,
    pub tasks:          u64,
}

impl WorkloadSums {
    pub fn calls(&self) -> u64 {
        self.incoming_calls.saturating_add(self.outgoing_calls)
    }

    pub fn weighted_units(&self) -> u64 {
        self.calls()
            .saturating_mul(CALL_WEIGHT)
            .saturating_add(self.chats.saturating_mul(CHAT_WEIGHT))
            .saturating_add(self.tasks.saturating_mul(TASK_WEIGHT))
    }

    fn accumulate(&mut self, other: WorkloadCounters) {
        self.incoming_calls = self.incoming_calls.saturating_add(other.incoming_calls as u64);
        self.outgoing_calls = self.outgoing_calls.saturating_add(other.outgoing_calls as u64);
        self.chats = self.chats.saturating_add(other.chats as u64);
        self.tasks = self.tasks.saturating_add(other.tasks as u64);
    }
}

impl From<WorkloadCounters> for WorkloadSums {
    fn from(c: WorkloadCounters) -> Self {
        Self {
            incoming_calls: c.incoming_calls as u64,
            outgoing_calls: c.outgoing_calls as u64,
            chats:          c.chats as u64,
            tasks:          c.tasks as u64,
        }
    }
}

/// One staff member's summed workload across all their evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadTotals {
    pub staff_id:       StaffId,
    pub name:           String,
    pub counters:       WorkloadSums,
    pub weighted_units: u64,
}

/// Sum workload per roster member, in roster order.
pub fn workload_totals(
    roster: &[StaffMember],
    evaluations: &[EvaluationRecord],
) -> Vec<WorkloadTotals> {
    roster
        .iter()
        .map(|member| {
            let mut counters = WorkloadSums::default();
            for record in evaluations.iter().filter(|e| e.staff_id == member.id) {
                counters.accumulate(WorkloadCounters::of(record));
            }
            WorkloadTotals {
                staff_id: member.id.clone(),
                name: member.name.clone(),
                weighted_units: counters.weighted_units(),
                counters,
            }
        })
        .collect()
}

/// Mean weighted units across all rows, 0 for an empty team.
pub fn mean_weighted_units(rows: &[WorkloadTotals]) -> f64 {
    mean(rows.iter().map(|r| r.weighted_units as f64)).unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuddyVerdict {
    Higher,
    Lower,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetVerdict {
    #[serde(rename = "On Target")]
    OnTarget,
    #[serde(rename = "Under Target")]
    UnderTarget,
}

impl fmt::Display for BuddyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Higher   => "Higher",
            Self::Lower    => "Lower",
            Self::Balanced => "Balanced",
        })
    }
}

impl fmt::Display for TargetVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OnTarget    => "On Target",
            Self::UnderTarget => "Under Target",
        })
    }
}

/// Compare `own` against `buddy`. Threshold is `ratio` of the larger load.
pub fn buddy_verdict(own: u64, buddy: u64, ratio: f64) -> BuddyVerdict {
    let diff = own as f64 - buddy as f64;
    let threshold = own.max(buddy) as f64 * ratio;
    if diff > threshold {
        BuddyVerdict::Higher
    } else if diff < -threshold {
        BuddyVerdict::Lower
    } else {
        BuddyVerdict::Balanced
    }
}

/// Compare `own` against `group_average * multiplier`, allowing `tolerance` units short.
pub fn target_verdict(own: u64, group_average: f64, multiplier: f64, tolerance: f64) -> TargetVerdict {
    let target = group_average * multiplier;
    if own as f64 - target >= -tolerance {
        TargetVerdict::OnTarget
    } else {
        TargetVerdict::UnderTarget
    }
}

/// Balance result for one staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum BalanceOutcome {
    Buddy {
        buddy_id:    StaffId,
        buddy_name:  String,
        buddy_units: u64,
        verdict:     BuddyVerdict,
    },
    SoloTarget {
        group_average: f64,
        target_units:  f64,
        verdict:       TargetVerdict,
    },
    /// Not covered by any pair or solo target. Needs a product decision.
    Unmapped,
}

impl BalanceOutcome {
    pub fn label(&self) -> String {
        match self {
            Self::Buddy { verdict, .. }      => verdict.to_string(),
            Self::SoloTarget { verdict, .. } => verdict.to_string(),
            Self::Unmapped                   => "Unmapped".to_string(),
        }
    }

    pub fn comparison(&self) -> String {
        match self {
            Self::Buddy { buddy_name, .. } => format!("vs Buddy: {buddy_name}"),
            Self::SoloTarget { .. }        => "Special Target (+50%)".to_string(),
            Self::Unmapped                 => "No comparison group".to_string(),
        }
    }
}

/// Decide the balance outcome for `staff_id` given everyone's totals.
pub fn balance_outcome(plan: &BalancePlan, rows: &[WorkloadTotals], staff_id: &str) -> BalanceOutcome {
    let units_of = |id: &str| rows.iter().find(|r| r.staff_id == id);
    let Some(own) = units_of(staff_id) else {
        return BalanceOutcome::Unmapped;
    };

    if let Some(buddy_id) = plan.buddy_of(staff_id) {
        if let Some(buddy) = units_of(buddy_id.as_str()) {
            return BalanceOutcome::Buddy {
                buddy_id:    buddy.staff_id.clone(),
                buddy_name:  buddy.name.clone(),
                buddy_units: buddy.weighted_units,
                verdict:     buddy_verdict(
                    own.weighted_units,
                    buddy.weighted_units,
                    plan.buddy_threshold_ratio,
                ),
            };
        }
        return BalanceOutcome::Unmapped;
    }

    if let Some(solo) = plan.solo_for(staff_id) {
        let group_average = mean(
            rows.iter()
                .filter(|r| solo.comparison_group.contains(&r.staff_id))
                .map(|r| r.weighted_units as f64),
        )
        .unwrap_or(0.0);
        return BalanceOutcome::SoloTarget {
            group_average,
            target_units: group_average * solo.multiplier,
            verdict: target_verdict(
                own.weighted_units,
                group_average,
                solo.multiplier,
                solo.tolerance,
            ),
        };
    }

    BalanceOutcome::Unmapped
}

/// A workload row paired with its balance outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadRow {
    #[serde(flatten)]
    pub totals:  WorkloadTotals,
    pub outcome: BalanceOutcome,
}

pub fn workload_report(
    roster: &[StaffMember],
    plan: &BalancePlan,
    evaluations: &[EvaluationRecord],
) -> Vec<WorkloadRow> {
    let totals = workload_totals(roster, evaluations);
    totals
        .iter()
        .map(|t| WorkloadRow {
            totals:  t.clone(),
            outcome: balance_outcome(plan, &totals, &t.staff_id),
        })
        .collect()
}
