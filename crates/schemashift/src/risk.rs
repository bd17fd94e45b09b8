//! Risk rules and plan complexity.
//!
//! Every change is assigned its risk tier when it is detected ([`classify`]);
//! the plan then aggregates those tiers into a coarse complexity used to
//! gate review effort, not to predict execution time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::change::{Change, ChangeKind, ColumnConstraint};

/// How likely a change is to fail or lose data when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Additive, cannot fail on existing data.
    Low,
    /// May fail on existing data or break dependent code.
    Medium,
    /// May lose data. Counted as a breaking change.
    High,
}

impl RiskLevel {
    /// Tiers in report order.
    pub const DESCENDING: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse ordinal describing how much review a plan needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Few, low-risk changes.
    Simple,
    /// Some risky changes or a moderate number of changes.
    Moderate,
    /// Many changes or many breaking ones.
    Complex,
}

impl Complexity {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tier counts of a change list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    /// Number of low-risk changes.
    pub low: usize,
    /// Number of medium-risk changes.
    pub medium: usize,
    /// Number of high-risk changes.
    pub high: usize,
}

impl RiskSummary {
    /// Counts the tiers of `changes`.
    #[must_use]
    pub fn of(changes: &[Change]) -> Self {
        changes.iter().fold(Self::default(), |mut acc, change| {
            match change.risk {
                RiskLevel::Low => acc.low += 1,
                RiskLevel::Medium => acc.medium += 1,
                RiskLevel::High => acc.high += 1,
            }
            acc
        })
    }

    /// Total number of changes.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.low + self.medium + self.high
    }

    /// Breaking changes are the high-risk ones.
    #[must_use]
    pub const fn breaking_changes(&self) -> usize {
        self.high
    }

    /// Complexity derived from the counts.
    #[must_use]
    pub const fn complexity(&self) -> Complexity {
        let total = self.total();
        if self.high > 5 || total > 20 {
            Complexity::Complex
        } else if self.high > 0 || self.medium > 5 || total > 10 {
            Complexity::Moderate
        } else {
            Complexity::Simple
        }
    }
}

/// Assigns the risk tier and reviewer warnings of a change.
///
/// This is the only place risk rules live; detectors and the rollback
/// generator both go through [`Change::new`], which calls it.
#[must_use]
pub fn classify(kind: &ChangeKind) -> (RiskLevel, Vec<String>) {
    match kind {
        ChangeKind::TableAdded { .. }
        | ChangeKind::ColumnDefaultChanged { .. }
        | ChangeKind::ForeignKeyRemoved { .. }
        | ChangeKind::IndexRemoved { .. } => (RiskLevel::Low, Vec::new()),

        ChangeKind::TableRemoved { table } => (
            RiskLevel::High,
            vec![format!(
                "Dropping table '{}' permanently deletes all of its data",
                table.name
            )],
        ),

        ChangeKind::TableRenamed { old_name, .. } => (
            RiskLevel::Medium,
            vec![format!(
                "Queries, views and application code referencing '{old_name}' will break"
            )],
        ),

        ChangeKind::ColumnAdded { column, .. } => {
            if column.is_optional {
                (RiskLevel::Low, Vec::new())
            } else if column.default.is_some() {
                (
                    RiskLevel::Medium,
                    vec![format!(
                        "Adding NOT NULL column '{}' backfills existing rows with its default",
                        column.name
                    )],
                )
            } else {
                (
                    RiskLevel::Medium,
                    vec![format!(
                        "Adding NOT NULL column '{}' without a default may fail if the table contains data",
                        column.name
                    )],
                )
            }
        }

        ChangeKind::ColumnRemoved { column, .. } => (
            RiskLevel::High,
            vec![format!(
                "Dropping column '{}' permanently deletes its data",
                column.name
            )],
        ),

        ChangeKind::ColumnRenamed { old_name, .. } => (
            RiskLevel::Medium,
            vec![format!(
                "Queries and application code referencing column '{old_name}' will break"
            )],
        ),

        ChangeKind::ColumnTypeChanged {
            old_type, new_type, ..
        } => (
            RiskLevel::High,
            vec![format!(
                "Converting {old_type} to {new_type} may lose data or cause application errors"
            )],
        ),

        ChangeKind::ColumnConstraintAdded { constraint, .. } => match constraint {
            ColumnConstraint::NotNull => (
                RiskLevel::High,
                vec!["Adding NOT NULL may fail if existing rows contain NULL values".to_string()],
            ),
            ColumnConstraint::Unique { .. } => (
                RiskLevel::Medium,
                vec!["Adding UNIQUE may fail if existing rows contain duplicate values".to_string()],
            ),
        },

        ChangeKind::ColumnConstraintRemoved { .. } => (RiskLevel::Low, Vec::new()),

        ChangeKind::ForeignKeyAdded { reference, .. } => (
            RiskLevel::Medium,
            vec![format!(
                "Adding a foreign key to '{}' may fail if existing rows violate referential integrity",
                reference.table
            )],
        ),

        ChangeKind::IndexAdded { index, .. } => {
            if index.unique {
                (
                    RiskLevel::Medium,
                    vec!["Creating a unique index may fail if existing rows contain duplicate values".to_string()],
                )
            } else {
                (RiskLevel::Low, Vec::new())
            }
        }
    }
}
