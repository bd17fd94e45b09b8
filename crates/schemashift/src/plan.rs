//! Migration planning: the single entry point wiring detection, SQL
//! emission, risk aggregation and rollback generation.

use serde::Serialize;
use tracing::info;

use crate::change::Change;
use crate::dialect::{AnsiDialect, MigrationDialect};
use crate::diff::detect_changes;
use crate::error::Result;
use crate::options::DiffOptions;
use crate::risk::{Complexity, RiskSummary};
use crate::rollback::generate_rollback;
use crate::schema::Schema;

/// A complete, ordered migration between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    /// Changes in application order.
    pub changes: Vec<Change>,
    /// Review complexity.
    pub complexity: Complexity,
    /// Number of high-risk changes.
    pub breaking_changes: usize,
    /// Per-tier counts.
    pub summary: RiskSummary,
    /// Forward SQL, one blank line between changes.
    pub forward_sql: String,
    /// Rollback SQL, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_sql: Option<String>,
    /// Dialect the SQL was generated for.
    pub dialect: String,
}

impl MigrationPlan {
    /// Returns true if the snapshots are equivalent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns true if any change discards stored data.
    #[must_use]
    pub fn has_destructive_changes(&self) -> bool {
        self.changes.iter().any(|c| c.kind.is_destructive())
    }
}

/// Plans the migration from `old` to `new` for `dialect`.
pub fn plan_migration(
    old: &Schema,
    new: &Schema,
    options: &DiffOptions,
    dialect: &dyn MigrationDialect,
) -> Result<MigrationPlan> {
    let mut changes = detect_changes(old, new, options)?;
    let schema = options.schema_qualifier();

    for change in &mut changes {
        change.sql = dialect.generate_sql(&change.kind, schema);
    }

    let forward_sql = changes
        .iter()
        .map(|c| c.sql.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let rollback_sql = options
        .generate_rollback
        .then(|| generate_rollback(&changes, dialect, schema));

    let summary = RiskSummary::of(&changes);
    let complexity = summary.complexity();

    info!(
        dialect = dialect.name(),
        changes = summary.total(),
        high = summary.high,
        medium = summary.medium,
        low = summary.low,
        complexity = %complexity,
        "Planned migration"
    );

    Ok(MigrationPlan {
        changes,
        complexity,
        breaking_changes: summary.breaking_changes(),
        summary,
        forward_sql,
        rollback_sql,
        dialect: dialect.name().to_string(),
    })
}

/// Plans the migration from `old` to `new` using the ANSI dialect.
pub fn diff_schemas(old: &Schema, new: &Schema, options: &DiffOptions) -> Result<MigrationPlan> {
    plan_migration(old, new, options, &AnsiDialect::new())
}
