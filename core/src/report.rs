//! Plain-text reports: the QA audit email and the dashboard summary.

use std::fmt::Write;

use crate::{
    qa::QARecord,
    scoring::DashboardSnapshot,
    types::{round_half_up, Percent},
};

/// Ten-cell bar, e.g. `████████░░ 80%`.
pub fn progress_bar(pct: Percent) -> String {
    let filled = round_half_up(pct as f64 / 10.0).clamp(0, 10) as usize;
    format!("{}{} {pct}%", "█".repeat(filled), "░".repeat(10 - filled))
}

pub fn qa_audit_report(record: &QARecord) -> String {
    let rule = "━".repeat(40);
    let thin = "─".repeat(40);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "QA PERFORMANCE AUDIT REPORT");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Staff: {}", record.staff_name);
    let _ = writeln!(out, "Date: {}", record.date.format("%d %B %Y"));
    let _ = writeln!(out, "OVERALL AUDIT SCORE: {}%", record.overall_percentage);
    let _ = writeln!(out, "Progress: {}", progress_bar(record.overall_percentage));
    let _ = writeln!(out);
    let _ = writeln!(out, "{thin}");
    let _ = writeln!(out, "SECTION DETAILS");
    let _ = writeln!(out, "{thin}");
    let _ = writeln!(out);

    for (idx, section) in record.sections.iter().enumerate() {
        let case_ref = if section.case_ref.trim().is_empty() { "N/A" } else { section.case_ref.as_str() };
        let comment = if section.comment.trim().is_empty() { "No comment" } else { section.comment.as_str() };
        let _ = writeln!(out, "[{}] {}", idx + 1, section.title.to_uppercase());
        let _ = writeln!(out, "Section Score: {}%", section.percentage());
        let _ = writeln!(out, "Case Reference: {case_ref}");
        let _ = writeln!(out, "Comment: {comment}");
        let _ = writeln!(out);
    }
    out
}

pub fn dashboard_summary(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let sla = &snapshot.sla;

    let _ = writeln!(out, "=== DASHBOARD ===");
    let _ = writeln!(out, "  team weighted score: {}%", snapshot.team_weighted_average);
    let _ = writeln!(
        out,
        "  overall SLA met:     {}% (R {}% + M {}% + AI {}%)",
        sla.overall, sla.restaurant_pct, sla.massage_pct, sla.ai_pct
    );
    let _ = writeln!(out, "  total projects:      {}", sla.total_projects);
    let _ = writeln!(out, "  side task points:    {}", snapshot.side_task_points);
    let _ = writeln!(out, "  QA average:          {}% over {} audits", snapshot.qa.average, snapshot.qa.count);

    let _ = writeln!(out);
    let _ = writeln!(out, "=== RANKING ===");
    for (i, s) in snapshot.ranking.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {:<10} {:>3}%", i + 1, s.name, s.score);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "=== WORKLOAD (avg {:.0} units) ===", snapshot.mean_weighted_units);
    for row in &snapshot.workload {
        let _ = writeln!(
            out,
            "  {:<10} {:>5} units  {:<22} {}",
            row.totals.name,
            row.totals.weighted_units,
            row.outcome.comparison(),
            row.outcome.label()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills_by_tens() {
        assert_eq!(progress_bar(80), "████████░░ 80%");
        assert_eq!(progress_bar(0), "░░░░░░░░░░ 0%");
        assert_eq!(progress_bar(100), "██████████ 100%");
        assert_eq!(progress_bar(85), "█████████░ 85%");
    }
}
