use crate::{
    staff::{builtin_roster, Roster, StaffMember},
    tally::{OtherKpiTallies, SlaTargets},
    types::StaffId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Two staff members whose workloads are compared against each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuddyPair {
    pub first:  StaffId,
    pub second: StaffId,
}

impl BuddyPair {
    pub fn new(first: &str, second: &str) -> Self {
        Self { first: first.into(), second: second.into() }
    }

    /// The other half of the pair, if `staff_id` belongs to it.
    pub fn buddy_of(&self, staff_id: &str) -> Option<&StaffId> {
        if self.first == staff_id {
            Some(&self.second)
        } else if self.second == staff_id {
            Some(&self.first)
        } else {
            None
        }
    }
}

/// An unpaired staff member expected to carry `multiplier` times the
/// mean workload of a comparison group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoloTarget {
    pub staff_id:         StaffId,
    pub comparison_group: Vec<StaffId>,
    pub multiplier:       f64,
    /// Units below target still counted as on target.
    pub tolerance:        f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePlan {
    pub pairs:                 Vec<BuddyPair>,
    pub solo:                  Option<SoloTarget>,
    pub buddy_threshold_ratio: f64,
}

impl BalancePlan {
    pub fn buddy_of(&self, staff_id: &str) -> Option<&StaffId> {
        self.pairs.iter().find_map(|p| p.buddy_of(staff_id))
    }

    pub fn solo_for(&self, staff_id: &str) -> Option<&SoloTarget> {
        self.solo.as_ref().filter(|s| s.staff_id == staff_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeConfig {
    pub timeout_ms: u64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self { timeout_ms: 15_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskConfig {
    pub roster:       Vec<StaffMember>,
    pub balance:      BalancePlan,
    #[serde(default)]
    pub sla_targets:  SlaTargets,
    #[serde(default)]
    pub default_kpis: OtherKpiTallies,
    #[serde(default)]
    pub narrative:    NarrativeConfig,
}

impl DeskConfig {
    /// The built-in team and buddy plan.
    pub fn builtin() -> Self {
        Self {
            roster: builtin_roster(),
            balance: BalancePlan {
                pairs: vec![
                    BuddyPair::new("1", "2"), // Pookie <-> Gam
                    BuddyPair::new("4", "7"), // Namva <-> TBA 1
                    BuddyPair::new("5", "6"), // Aim <-> Noey
                ],
                solo: Some(SoloTarget {
                    staff_id:         "3".into(), // Pume
                    comparison_group: vec!["1".into(), "2".into(), "4".into(), "7".into()],
                    multiplier:       1.5,
                    tolerance:        10.0,
                }),
                buddy_threshold_ratio: 0.15,
            },
            sla_targets:  SlaTargets::default(),
            default_kpis: OtherKpiTallies::default(),
            narrative:    NarrativeConfig::default(),
        }
    }

    /// Load from a JSON file and validate it.
    /// In tests, use DeskConfig::builtin().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DeskConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Every staff id named by the balance plan must be on the roster,
    /// and nobody may hold more than one balance role.
    pub fn validate(&self) -> anyhow::Result<()> {
        let roster = self.roster.as_slice();
        let mut seen_ids = HashSet::new();
        for member in roster {
            if !seen_ids.insert(member.id.as_str()) {
                anyhow::bail!("duplicate roster id '{}'", member.id);
            }
        }

        let mut assigned: HashSet<&str> = HashSet::new();
        for pair in &self.balance.pairs {
            if pair.first == pair.second {
                anyhow::bail!("staff id '{}' is paired with itself", pair.first);
            }
            for id in [&pair.first, &pair.second] {
                if roster.by_id(id).is_none() {
                    anyhow::bail!("buddy pair names unknown staff id '{id}'");
                }
                if !assigned.insert(id.as_str()) {
                    anyhow::bail!("staff id '{id}' appears in more than one balance role");
                }
            }
        }

        if let Some(solo) = &self.balance.solo {
            if roster.by_id(&solo.staff_id).is_none() {
                anyhow::bail!("solo target names unknown staff id '{}'", solo.staff_id);
            }
            if !assigned.insert(solo.staff_id.as_str()) {
                anyhow::bail!(
                    "staff id '{}' appears in more than one balance role",
                    solo.staff_id
                );
            }
            for id in &solo.comparison_group {
                if roster.by_id(id).is_none() {
                    anyhow::bail!("comparison group names unknown staff id '{id}'");
                }
            }
            if solo.multiplier < 0.0 || solo.tolerance < 0.0 {
                anyhow::bail!("solo target multiplier and tolerance must be non-negative");
            }
        }

        if !(0.0..=1.0).contains(&self.balance.buddy_threshold_ratio) {
            anyhow::bail!(
                "buddy threshold ratio {} outside [0, 1]",
                self.balance.buddy_threshold_ratio
            );
        }
        Ok(())
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self::builtin()
    }
}
