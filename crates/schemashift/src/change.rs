//! Detected schema changes.
//!
//! A [`Change`] pairs a [`ChangeKind`] (what changed, carrying only the
//! fields meaningful to that kind) with its risk tier, description,
//! warnings and rendered SQL.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::risk::{self, RiskLevel};
use crate::schema::{Column, Index, Reference, Table};

/// Constraint name of a column's foreign key (PostgreSQL's default naming
/// for inline `REFERENCES` clauses).
#[must_use]
pub fn foreign_key_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_fkey")
}

/// Constraint name of a column's UNIQUE constraint (PostgreSQL's default
/// naming for inline `UNIQUE`).
#[must_use]
pub fn unique_constraint_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_key")
}

/// A single-column constraint that can be added or removed in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnConstraint {
    /// `NOT NULL`.
    NotNull,
    /// `UNIQUE`, with the constraint name it has (or will have).
    Unique {
        /// Constraint name.
        name: String,
    },
}

impl ColumnConstraint {
    /// SQL keyword(s) of the constraint.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::NotNull => "NOT NULL",
            Self::Unique { .. } => "UNIQUE",
        }
    }
}

/// Tag of a [`ChangeKind`], as used in reports and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    TableAdded,
    TableRemoved,
    TableRenamed,
    ColumnAdded,
    ColumnRemoved,
    ColumnRenamed,
    ColumnTypeChanged,
    ColumnConstraintAdded,
    ColumnConstraintRemoved,
    ColumnDefaultChanged,
    ForeignKeyAdded,
    ForeignKeyRemoved,
    IndexAdded,
    IndexRemoved,
}

impl ChangeType {
    /// snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TableAdded => "table_added",
            Self::TableRemoved => "table_removed",
            Self::TableRenamed => "table_renamed",
            Self::ColumnAdded => "column_added",
            Self::ColumnRemoved => "column_removed",
            Self::ColumnRenamed => "column_renamed",
            Self::ColumnTypeChanged => "column_type_changed",
            Self::ColumnConstraintAdded => "column_constraint_added",
            Self::ColumnConstraintRemoved => "column_constraint_removed",
            Self::ColumnDefaultChanged => "column_default_changed",
            Self::ForeignKeyAdded => "foreign_key_added",
            Self::ForeignKeyRemoved => "foreign_key_removed",
            Self::IndexAdded => "index_added",
            Self::IndexRemoved => "index_removed",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What changed between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    /// A table exists only in the new snapshot.
    TableAdded {
        /// Full definition of the new table.
        table: Table,
    },

    /// A table exists only in the old snapshot.
    TableRemoved {
        /// Definition of the dropped table.
        table: Table,
    },

    /// A table was renamed (detected by column-set similarity).
    TableRenamed {
        /// Old table name.
        old_name: String,
        /// New table name.
        new_name: String,
    },

    /// A column exists only in the new table.
    ColumnAdded {
        /// Table name.
        table: String,
        /// Column definition.
        column: Column,
    },

    /// A column exists only in the old table.
    ColumnRemoved {
        /// Table name.
        table: String,
        /// Definition of the dropped column.
        column: Column,
    },

    /// A column was renamed (detected by name similarity).
    ColumnRenamed {
        /// Table name.
        table: String,
        /// Old column name.
        old_name: String,
        /// New column name.
        new_name: String,
    },

    /// A column's type token changed.
    ColumnTypeChanged {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Previous type token.
        old_type: String,
        /// New type token.
        new_type: String,
        /// Nullability of the column while its type changes.
        #[serde(default)]
        is_optional: bool,
        /// Default of the column while its type changes.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },

    /// A NOT NULL or UNIQUE constraint was added to a column.
    ColumnConstraintAdded {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// The constraint.
        constraint: ColumnConstraint,
        /// Column type, for dialects that restate the column definition.
        data_type: String,
        /// Column default, for dialects that restate the column definition.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },

    /// A NOT NULL or UNIQUE constraint was removed from a column.
    ColumnConstraintRemoved {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// The constraint.
        constraint: ColumnConstraint,
        /// Column type, for dialects that restate the column definition.
        data_type: String,
        /// Column default, for dialects that restate the column definition.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },

    /// A column's default expression was added, changed or removed.
    ColumnDefaultChanged {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Previous default expression.
        old_default: Option<String>,
        /// New default expression.
        new_default: Option<String>,
    },

    /// A column gained a foreign key.
    ForeignKeyAdded {
        /// Table name.
        table: String,
        /// Referencing column.
        column: String,
        /// Constraint name.
        constraint_name: String,
        /// Referenced table and column.
        reference: Reference,
    },

    /// A column lost its foreign key.
    ForeignKeyRemoved {
        /// Table name.
        table: String,
        /// Referencing column.
        column: String,
        /// Constraint name.
        constraint_name: String,
        /// The reference being dropped.
        reference: Reference,
    },

    /// An index exists only in the new table.
    IndexAdded {
        /// Table name.
        table: String,
        /// Index definition (name always resolved).
        index: Index,
    },

    /// An index exists only in the old table.
    IndexRemoved {
        /// Table name.
        table: String,
        /// Index definition (name always resolved).
        index: Index,
    },
}

impl ChangeKind {
    /// Returns the tag of this change.
    #[must_use]
    pub const fn change_type(&self) -> ChangeType {
        match self {
            Self::TableAdded { .. } => ChangeType::TableAdded,
            Self::TableRemoved { .. } => ChangeType::TableRemoved,
            Self::TableRenamed { .. } => ChangeType::TableRenamed,
            Self::ColumnAdded { .. } => ChangeType::ColumnAdded,
            Self::ColumnRemoved { .. } => ChangeType::ColumnRemoved,
            Self::ColumnRenamed { .. } => ChangeType::ColumnRenamed,
            Self::ColumnTypeChanged { .. } => ChangeType::ColumnTypeChanged,
            Self::ColumnConstraintAdded { .. } => ChangeType::ColumnConstraintAdded,
            Self::ColumnConstraintRemoved { .. } => ChangeType::ColumnConstraintRemoved,
            Self::ColumnDefaultChanged { .. } => ChangeType::ColumnDefaultChanged,
            Self::ForeignKeyAdded { .. } => ChangeType::ForeignKeyAdded,
            Self::ForeignKeyRemoved { .. } => ChangeType::ForeignKeyRemoved,
            Self::IndexAdded { .. } => ChangeType::IndexAdded,
            Self::IndexRemoved { .. } => ChangeType::IndexRemoved,
        }
    }

    /// Name of the affected table. For renames this is the new name.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::TableAdded { table } | Self::TableRemoved { table } => &table.name,
            Self::TableRenamed { new_name, .. } => new_name,
            Self::ColumnAdded { table, .. }
            | Self::ColumnRemoved { table, .. }
            | Self::ColumnRenamed { table, .. }
            | Self::ColumnTypeChanged { table, .. }
            | Self::ColumnConstraintAdded { table, .. }
            | Self::ColumnConstraintRemoved { table, .. }
            | Self::ColumnDefaultChanged { table, .. }
            | Self::ForeignKeyAdded { table, .. }
            | Self::ForeignKeyRemoved { table, .. }
            | Self::IndexAdded { table, .. }
            | Self::IndexRemoved { table, .. } => table,
        }
    }

    /// Name of the affected column, if the change is column scoped. For
    /// renames this is the new name.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::TableAdded { .. }
            | Self::TableRemoved { .. }
            | Self::TableRenamed { .. }
            | Self::IndexAdded { .. }
            | Self::IndexRemoved { .. } => None,
            Self::ColumnAdded { column, .. } | Self::ColumnRemoved { column, .. } => {
                Some(&column.name)
            }
            Self::ColumnRenamed { new_name, .. } => Some(new_name),
            Self::ColumnTypeChanged { column, .. }
            | Self::ColumnConstraintAdded { column, .. }
            | Self::ColumnConstraintRemoved { column, .. }
            | Self::ColumnDefaultChanged { column, .. }
            | Self::ForeignKeyAdded { column, .. }
            | Self::ForeignKeyRemoved { column, .. } => Some(column),
        }
    }

    /// Returns true for changes that discard stored data.
    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(self, Self::TableRemoved { .. } | Self::ColumnRemoved { .. })
    }

    /// Returns the structurally inverse change for rollback.
    ///
    /// Returns `None` for drops: the data is gone.
    #[must_use]
    pub fn reverse(&self) -> Option<Self> {
        match self {
            Self::TableAdded { table } => Some(Self::TableRemoved {
                table: table.clone(),
            }),

            Self::TableRemoved { .. } | Self::ColumnRemoved { .. } => None,

            Self::TableRenamed { old_name, new_name } => Some(Self::TableRenamed {
                old_name: new_name.clone(),
                new_name: old_name.clone(),
            }),

            Self::ColumnAdded { table, column } => Some(Self::ColumnRemoved {
                table: table.clone(),
                column: column.clone(),
            }),

            Self::ColumnRenamed {
                table,
                old_name,
                new_name,
            } => Some(Self::ColumnRenamed {
                table: table.clone(),
                old_name: new_name.clone(),
                new_name: old_name.clone(),
            }),

            Self::ColumnTypeChanged {
                table,
                column,
                old_type,
                new_type,
                is_optional,
                default,
            } => Some(Self::ColumnTypeChanged {
                table: table.clone(),
                column: column.clone(),
                old_type: new_type.clone(),
                new_type: old_type.clone(),
                is_optional: *is_optional,
                default: default.clone(),
            }),

            Self::ColumnConstraintAdded {
                table,
                column,
                constraint,
                data_type,
                default,
            } => Some(Self::ColumnConstraintRemoved {
                table: table.clone(),
                column: column.clone(),
                constraint: constraint.clone(),
                data_type: data_type.clone(),
                default: default.clone(),
            }),

            Self::ColumnConstraintRemoved {
                table,
                column,
                constraint,
                data_type,
                default,
            } => Some(Self::ColumnConstraintAdded {
                table: table.clone(),
                column: column.clone(),
                constraint: constraint.clone(),
                data_type: data_type.clone(),
                default: default.clone(),
            }),

            Self::ColumnDefaultChanged {
                table,
                column,
                old_default,
                new_default,
            } => Some(Self::ColumnDefaultChanged {
                table: table.clone(),
                column: column.clone(),
                old_default: new_default.clone(),
                new_default: old_default.clone(),
            }),

            Self::ForeignKeyAdded {
                table,
                column,
                constraint_name,
                reference,
            } => Some(Self::ForeignKeyRemoved {
                table: table.clone(),
                column: column.clone(),
                constraint_name: constraint_name.clone(),
                reference: reference.clone(),
            }),

            Self::ForeignKeyRemoved {
                table,
                column,
                constraint_name,
                reference,
            } => Some(Self::ForeignKeyAdded {
                table: table.clone(),
                column: column.clone(),
                constraint_name: constraint_name.clone(),
                reference: reference.clone(),
            }),

            Self::IndexAdded { table, index } => Some(Self::IndexRemoved {
                table: table.clone(),
                index: index.clone(),
            }),

            Self::IndexRemoved { table, index } => Some(Self::IndexAdded {
                table: table.clone(),
                index: index.clone(),
            }),
        }
    }

    /// Returns a human-readable description of this change.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::TableAdded { table } => format!(
                "Create table '{}' with {} column(s)",
                table.name,
                table.columns.len()
            ),
            Self::TableRemoved { table } => format!("Drop table '{}'", table.name),
            Self::TableRenamed { old_name, new_name } => {
                format!("Rename table '{old_name}' to '{new_name}'")
            }
            Self::ColumnAdded { table, column } => format!(
                "Add column '{}' ({}) to table '{}'",
                column.name, column.data_type, table
            ),
            Self::ColumnRemoved { table, column } => {
                format!("Drop column '{}' from table '{}'", column.name, table)
            }
            Self::ColumnRenamed {
                table,
                old_name,
                new_name,
            } => format!("Rename column '{old_name}' to '{new_name}' in table '{table}'"),
            Self::ColumnTypeChanged {
                table,
                column,
                old_type,
                new_type,
                ..
            } => format!(
                "Change type of column '{column}' in table '{table}' from {old_type} to {new_type}"
            ),
            Self::ColumnConstraintAdded {
                table,
                column,
                constraint,
                ..
            } => format!(
                "Add {} constraint to column '{column}' in table '{table}'",
                constraint.keyword()
            ),
            Self::ColumnConstraintRemoved {
                table,
                column,
                constraint,
                ..
            } => format!(
                "Remove {} constraint from column '{column}' in table '{table}'",
                constraint.keyword()
            ),
            Self::ColumnDefaultChanged {
                table,
                column,
                old_default,
                new_default,
            } => match (old_default, new_default) {
                (None, Some(new)) => {
                    format!("Set default of column '{column}' in table '{table}' to {new}")
                }
                (Some(_), None) => {
                    format!("Drop default of column '{column}' in table '{table}'")
                }
                (Some(old), Some(new)) => format!(
                    "Change default of column '{column}' in table '{table}' from {old} to {new}"
                ),
                (None, None) => format!("Default of column '{column}' in table '{table}'"),
            },
            Self::ForeignKeyAdded {
                table,
                column,
                reference,
                ..
            } => format!(
                "Add foreign key on '{table}'.'{column}' referencing '{}'.'{}'",
                reference.table, reference.column
            ),
            Self::ForeignKeyRemoved {
                table,
                column,
                reference,
                ..
            } => format!(
                "Drop foreign key on '{table}'.'{column}' referencing '{}'.'{}'",
                reference.table, reference.column
            ),
            Self::IndexAdded { table, index } => format!(
                "Create {}index '{}' on table '{table}' ({})",
                if index.unique { "unique " } else { "" },
                index.resolved_name(table),
                index.columns.join(", ")
            ),
            Self::IndexRemoved { table, index } => format!(
                "Drop index '{}' on table '{table}'",
                index.resolved_name(table)
            ),
        }
    }
}

/// A detected change annotated with risk, description, warnings and SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// What changed.
    #[serde(flatten)]
    pub kind: ChangeKind,
    /// Risk tier.
    pub risk: RiskLevel,
    /// Human-readable description.
    pub description: String,
    /// Warnings for reviewers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Forward SQL; filled in by the planner.
    #[serde(default)]
    pub sql: String,
}

impl Change {
    /// Wraps a change kind, classifying its risk.
    #[must_use]
    pub fn new(kind: ChangeKind) -> Self {
        let (risk, warnings) = risk::classify(&kind);
        Self {
            description: kind.description(),
            kind,
            risk,
            warnings,
            sql: String::new(),
        }
    }

    /// Appends a warning.
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Returns the tag of this change.
    #[must_use]
    pub const fn change_type(&self) -> ChangeType {
        self.kind.change_type()
    }

    /// Name of the affected table.
    #[must_use]
    pub fn table(&self) -> &str {
        self.kind.table()
    }

    /// Name of the affected column, if any.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        self.kind.column()
    }

    /// `table` or `table.column`, for display.
    #[must_use]
    pub fn target(&self) -> String {
        match self.column() {
            Some(column) => format!("{}.{}", self.table(), column),
            None => self.table().to_string(),
        }
    }
}
