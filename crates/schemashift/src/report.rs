//! Human-readable migration report.

use crate::plan::MigrationPlan;
use crate::risk::RiskLevel;

/// Renders `plan` as a plain-text report for reviewers.
#[must_use]
pub fn format_migration_report(plan: &MigrationPlan) -> String {
    let mut out = String::new();

    out.push_str("Migration Report\n");
    out.push_str("================\n\n");

    if plan.is_empty() {
        out.push_str("No changes detected.\n");
        return out;
    }

    out.push_str(&format!("Dialect:          {}\n", plan.dialect));
    out.push_str(&format!("Complexity:       {}\n", plan.complexity));
    out.push_str(&format!("Total changes:    {}\n", plan.summary.total()));
    out.push_str(&format!("Breaking changes: {}\n", plan.breaking_changes));
    out.push_str(&format!(
        "Risk breakdown:   {} high, {} medium, {} low\n",
        plan.summary.high, plan.summary.medium, plan.summary.low
    ));

    for level in RiskLevel::DESCENDING {
        let changes: Vec<_> = plan.changes.iter().filter(|c| c.risk == level).collect();
        if changes.is_empty() {
            continue;
        }

        let title = format!("{} risk ({})", capitalize(level.as_str()), changes.len());
        out.push_str(&format!("\n{title}\n{}\n", "-".repeat(title.len())));

        for change in changes {
            out.push_str(&format!(
                "\n[{}] {}\n  {}\n",
                change.change_type(),
                change.target(),
                change.description
            ));
            for warning in &change.warnings {
                out.push_str(&format!("  Warning: {warning}\n"));
            }
            for line in change.sql.lines() {
                out.push_str(&format!("    {line}\n"));
            }
        }
    }

    out.push_str(&format!("\nForward SQL\n-----------\n{}\n", plan.forward_sql));

    if let Some(rollback) = &plan.rollback_sql {
        out.push_str(&format!("\nRollback SQL\n------------\n{rollback}\n"));
    }

    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
