//! Manually maintained SLA and KPI tallies.
//!
//! These are running `{total, met}` counters edited by the manager.
//! They are never derived from other records.

use crate::types::{ratio_or_zero, to_percent, Percent};
use serde::{Deserialize, Serialize};

/// The three fixed project categories, each with its own go-live target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectCategory {
    Restaurant,
    Massage,
    #[serde(rename = "AI Receptionist")]
    AiReceptionist,
}

impl ProjectCategory {
    pub const ALL: [ProjectCategory; 3] = [
        ProjectCategory::Restaurant,
        ProjectCategory::Massage,
        ProjectCategory::AiReceptionist,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Restaurant     => "Restaurant",
            Self::Massage        => "Massage",
            Self::AiReceptionist => "AI Receptionist",
        }
    }
}

/// Which half of a tally an edit touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyField {
    Total,
    Met,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaTally {
    pub total: u32,
    pub met:   u32,
}

impl SlaTally {
    pub const fn new(total: u32, met: u32) -> Self {
        Self { total, met }
    }

    /// `met / total * 100`, or 0 when nothing has been counted.
    pub fn percentage(&self) -> f64 {
        ratio_or_zero(self.met as f64, self.total as f64) * 100.0
    }

    pub fn set(&mut self, field: TallyField, value: u32) {
        match field {
            TallyField::Total => self.total = value,
            TallyField::Met   => self.met = value,
        }
    }
}

/// Go-live targets in days per project category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaTargets {
    pub restaurant_days:      u32,
    pub massage_days:         u32,
    pub ai_receptionist_days: u32,
}

impl SlaTargets {
    pub fn days_for(&self, category: ProjectCategory) -> u32 {
        match category {
            ProjectCategory::Restaurant     => self.restaurant_days,
            ProjectCategory::Massage        => self.massage_days,
            ProjectCategory::AiReceptionist => self.ai_receptionist_days,
        }
    }
}

impl Default for SlaTargets {
    fn default() -> Self {
        Self {
            restaurant_days:      10,
            massage_days:         15,
            ai_receptionist_days: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSla {
    pub total:       u32,
    pub met:         u32,
    pub target_days: u32,
}

impl ProjectSla {
    pub fn tally(&self) -> SlaTally {
        SlaTally::new(self.total, self.met)
    }
}

/// Persisted project SLA document: one tally per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSlaTallies {
    pub restaurant: ProjectSla,
    pub massage:    ProjectSla,
    pub ai:         ProjectSla,
}

impl ProjectSlaTallies {
    pub fn with_targets(targets: &SlaTargets) -> Self {
        let empty = |category| ProjectSla {
            total:       0,
            met:         0,
            target_days: targets.days_for(category),
        };
        Self {
            restaurant: empty(ProjectCategory::Restaurant),
            massage:    empty(ProjectCategory::Massage),
            ai:         empty(ProjectCategory::AiReceptionist),
        }
    }

    pub fn get(&self, category: ProjectCategory) -> &ProjectSla {
        match category {
            ProjectCategory::Restaurant     => &self.restaurant,
            ProjectCategory::Massage        => &self.massage,
            ProjectCategory::AiReceptionist => &self.ai,
        }
    }

    pub fn set(&mut self, category: ProjectCategory, field: TallyField, value: u32) {
        let entry = match category {
            ProjectCategory::Restaurant     => &mut self.restaurant,
            ProjectCategory::Massage        => &mut self.massage,
            ProjectCategory::AiReceptionist => &mut self.ai,
        };
        match field {
            TallyField::Total => entry.total = value,
            TallyField::Met   => entry.met = value,
        }
    }

    pub fn total_projects(&self) -> u32 {
        ProjectCategory::ALL
            .iter()
            .fold(0u32, |acc, c| acc.saturating_add(self.get(*c).total))
    }
}

impl Default for ProjectSlaTallies {
    fn default() -> Self {
        Self::with_targets(&SlaTargets::default())
    }
}

/// The two non-project KPIs tracked on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtherKpi {
    ResponseSpeed,
    Csat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherKpiTallies {
    pub response_speed: SlaTally,
    pub csat:           SlaTally,
}

impl OtherKpiTallies {
    pub fn get(&self, kpi: OtherKpi) -> &SlaTally {
        match kpi {
            OtherKpi::ResponseSpeed => &self.response_speed,
            OtherKpi::Csat          => &self.csat,
        }
    }

    pub fn set(&mut self, kpi: OtherKpi, field: TallyField, value: u32) {
        match kpi {
            OtherKpi::ResponseSpeed => self.response_speed.set(field, value),
            OtherKpi::Csat          => self.csat.set(field, value),
        }
    }

    pub fn response_speed_pct(&self) -> f64 {
        self.response_speed.percentage()
    }

    pub fn csat_pct(&self) -> f64 {
        self.csat.percentage()
    }
}

impl Default for OtherKpiTallies {
    fn default() -> Self {
        Self {
            response_speed: SlaTally::new(100, 85),
            csat:           SlaTally::new(100, 90),
        }
    }
}

/// Rounded percentage for display.
pub fn display_pct(tally: &SlaTally) -> Percent {
    to_percent(tally.percentage())
}
