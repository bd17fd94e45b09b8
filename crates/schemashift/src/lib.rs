//! Schema diff and migration planning.
//!
//! `schemashift` compares two snapshots of a relational schema and plans the
//! migration between them:
//! - Every structural difference becomes a typed [`Change`](change::Change)
//! - Each change is classified by risk, and the plan by review complexity
//! - Forward DDL is emitted in dependency-safe order for a chosen dialect
//! - A best-effort rollback script and a reviewer report are produced
//!
//! # Architecture
//!
//! - **Schema** - Dialect-agnostic snapshot representation (IR), loadable from JSON
//! - **Similarity** - Edit-distance and column-set scoring for rename detection
//! - **Diff** - Table and column level change detection and ordering
//! - **Risk** - Per-change risk rules and plan complexity
//! - **Dialect** - Structured statements rendered for ANSI, MySQL or SQLite
//! - **Rollback** - Reverse script generation
//! - **Report** - Plain-text report for reviewers
//!
//! # Example
//!
//! ```rust
//! use schemashift::prelude::*;
//!
//! let old = Schema::new().table(
//!     Table::new("User")
//!         .column(Column::new("id", "INTEGER").primary_key())
//!         .column(Column::new("email", "TEXT")),
//! );
//! let new = Schema::new().table(
//!     Table::new("User")
//!         .column(Column::new("id", "INTEGER").primary_key())
//!         .column(Column::new("email", "TEXT"))
//!         .column(Column::new("name", "TEXT").optional()),
//! );
//!
//! let plan = diff_schemas(&old, &new, &DiffOptions::default()).unwrap();
//! assert_eq!(plan.forward_sql, "ALTER TABLE \"User\" ADD COLUMN \"name\" TEXT;");
//! println!("{}", format_migration_report(&plan));
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Review the migration between two snapshots
//! schemashift --old v1.json --new v2.json report
//!
//! # Print forward SQL for MySQL, including drops
//! schemashift --old v1.json --new v2.json --dialect mysql --include-drops sql --allow-destructive
//!
//! # Print the rollback script
//! schemashift --old v1.json --new v2.json sql --reverse
//! ```

pub mod change;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod options;
pub mod plan;
pub mod report;
pub mod risk;
pub mod rollback;
pub mod schema;
pub mod similarity;

pub use plan::{diff_schemas, plan_migration, MigrationPlan};
pub use report::format_migration_report;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::change::{Change, ChangeKind, ChangeType, ColumnConstraint};
    pub use crate::dialect::{AnsiDialect, MigrationDialect, MySqlDialect, SqliteDialect};
    pub use crate::diff::detect_changes;
    pub use crate::error::{Result, SchemaShiftError};
    pub use crate::options::DiffOptions;
    pub use crate::plan::{diff_schemas, plan_migration, MigrationPlan};
    pub use crate::report::format_migration_report;
    pub use crate::risk::{Complexity, RiskLevel, RiskSummary};
    pub use crate::rollback::generate_rollback;
    pub use crate::schema::{Column, Index, Reference, ReferentialAction, Schema, Table};
}
