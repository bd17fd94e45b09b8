//! Schema diffing.
//!
//! Compares two snapshots and returns the detected changes in an order that
//! can be applied top to bottom:
//!
//! 1. table renames
//! 2. column renames
//! 3. foreign key and index removals
//! 4. table drops, dependents first
//! 5. table creates, referenced tables first
//! 6. column additions and in-place modifications
//! 7. column drops
//! 8. foreign key and index additions
//!
//! Inline references to a column added in the same plan are split out of
//! the created table or added column into step 8, since the referenced
//! column does not exist yet when steps 5 and 6 run.

mod columns;
mod tables;

pub use tables::{dependency_order, match_tables, TableMatch};

use std::collections::HashSet;

use tracing::debug;

use crate::change::{foreign_key_name, Change, ChangeKind};
use crate::error::Result;
use crate::options::DiffOptions;
use crate::schema::Schema;

/// Emission phase of a change. Changes are stably sorted by phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Phase {
    TableRename,
    ColumnRename,
    ConstraintRemoval,
    TableDrop,
    TableCreate,
    ColumnChange,
    ColumnDrop,
    ConstraintAddition,
}

/// Detects every change turning `old` into `new`.
///
/// Options are validated first. The returned changes have no SQL yet; see
/// [`plan_migration`](crate::plan::plan_migration) for the full pipeline.
pub fn detect_changes(old: &Schema, new: &Schema, options: &DiffOptions) -> Result<Vec<Change>> {
    options.validate()?;

    let matched = match_tables(old, new, options.rename_threshold);
    let mut phased: Vec<(Phase, Change)> = Vec::new();

    for (from, to) in &matched.renamed {
        phased.push((
            Phase::TableRename,
            Change::new(ChangeKind::TableRenamed {
                old_name: from.name.clone(),
                new_name: to.name.clone(),
            }),
        ));
    }

    // Column level, in new snapshot table order.
    let mut pairs: Vec<_> = matched
        .common
        .iter()
        .chain(&matched.renamed)
        .copied()
        .collect();
    pairs.sort_by_key(|(_, to)| {
        new.tables
            .iter()
            .position(|t| t.name == to.name)
            .unwrap_or(usize::MAX)
    });
    for (from, to) in pairs {
        phased.extend(columns::diff_table(from, to, options));
    }

    if options.include_drops {
        for table in dependency_order(&matched.removed).into_iter().rev() {
            phased.push((
                Phase::TableDrop,
                Change::new(ChangeKind::TableRemoved {
                    table: table.clone(),
                }),
            ));
        }
    } else if !matched.removed.is_empty() {
        debug!(
            tables = matched.removed.len(),
            "Omitting table removals (include_drops is off)"
        );
    }

    for table in dependency_order(&matched.added) {
        let pk = table.primary_key_columns();
        let mut change = Change::new(ChangeKind::TableAdded {
            table: table.clone(),
        });
        for column in &table.columns {
            let is_pk = pk.contains(&column.name.as_str());
            if let Some(warning) = columns::nullable_primary_key_warning(column, is_pk) {
                change = change.with_warning(warning);
            }
        }
        phased.push((Phase::TableCreate, change));
    }

    detach_forward_references(&mut phased);

    phased.sort_by_key(|(phase, _)| *phase);
    let changes: Vec<Change> = phased.into_iter().map(|(_, change)| change).collect();

    debug!(
        renamed = matched.renamed.len(),
        added = matched.added.len(),
        removed = matched.removed.len(),
        changes = changes.len(),
        "Diffed schemas"
    );

    Ok(changes)
}

/// Moves inline references that target a column added in this plan out of
/// `table_added` and `column_added` changes into `foreign_key_added` ones.
fn detach_forward_references(phased: &mut Vec<(Phase, Change)>) {
    let added: HashSet<(String, String)> = phased
        .iter()
        .filter_map(|(_, change)| match &change.kind {
            ChangeKind::ColumnAdded { table, column } => Some((table.clone(), column.name.clone())),
            _ => None,
        })
        .collect();
    if added.is_empty() {
        return;
    }

    let mut detached = Vec::new();
    for (_, change) in phased.iter_mut() {
        let (table, columns) = match &mut change.kind {
            ChangeKind::TableAdded { table } => (table.name.clone(), table.columns.iter_mut().collect()),
            ChangeKind::ColumnAdded { table, column } => (table.clone(), vec![column]),
            _ => continue,
        };

        for column in columns {
            let forward = column.references.as_ref().is_some_and(|r| {
                added.contains(&(r.table.clone(), r.column.clone()))
                    && !(r.table == table && r.column == column.name)
            });
            if !forward {
                continue;
            }
            if let Some(reference) = column.references.take() {
                debug!(table = %table, column = %column.name, "Deferring foreign key to an added column");
                detached.push((
                    Phase::ConstraintAddition,
                    Change::new(ChangeKind::ForeignKeyAdded {
                        table: table.clone(),
                        column: column.name.clone(),
                        constraint_name: foreign_key_name(&table, &column.name),
                        reference,
                    }),
                ));
            }
        }
    }
    phased.extend(detached);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeType;
    use crate::schema::{Column, Reference, Table};

    fn types(changes: &[Change]) -> Vec<ChangeType> {
        changes.iter().map(Change::change_type).collect()
    }

    fn user() -> Table {
        Table::new("User")
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("email", "TEXT"))
    }

    #[test]
    fn test_identical_schemas() {
        let schema = Schema::new().table(user());
        assert!(detect_changes(&schema, &schema, &DiffOptions::new())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_options_fail_fast() {
        let schema = Schema::new();
        let options = DiffOptions::new().with_rename_threshold(2.0);
        assert!(detect_changes(&schema, &schema, &options).is_err());
    }

    #[test]
    fn test_phase_order() {
        let old = Schema::new().table(user()).table(
            Table::new("Post")
                .column(Column::new("id", "INTEGER").primary_key())
                .column(Column::new("title", "TEXT"))
                .column(
                    Column::new("author_id", "INTEGER").references(Reference::new("User", "id")),
                ),
        );
        let new = Schema::new()
            .table(user().column(Column::new("bio", "TEXT").optional()))
            .table(
                Table::new("Comment")
                    .column(Column::new("id", "INTEGER").primary_key())
                    .column(Column::new("body", "TEXT")),
            )
            .table(
                Table::new("Post")
                    .column(Column::new("id", "INTEGER").primary_key())
                    .column(Column::new("title", "TEXT"))
                    .column(Column::new("author_id", "INTEGER").references(
                        Reference::new("Comment", "id"),
                    )),
            );

        let changes = detect_changes(&old, &new, &DiffOptions::new()).unwrap();
        assert_eq!(
            types(&changes),
            vec![
                ChangeType::ForeignKeyRemoved,
                ChangeType::TableAdded,
                ChangeType::ColumnAdded,
                ChangeType::ForeignKeyAdded,
            ]
        );
    }

    #[test]
    fn test_dropped_column_foreign_key_goes_before_table_drop() {
        let old = Schema::new().table(user()).table(
            Table::new("Post")
                .column(Column::new("id", "INTEGER").primary_key())
                .column(Column::new("title", "TEXT"))
                .column(
                    Column::new("author_id", "INTEGER").references(Reference::new("User", "id")),
                ),
        );
        let new = Schema::new().table(
            Table::new("Post")
                .column(Column::new("id", "INTEGER").primary_key())
                .column(Column::new("title", "TEXT")),
        );

        let changes = detect_changes(&old, &new, &DiffOptions::new().with_include_drops(true)).unwrap();
        assert_eq!(
            types(&changes),
            vec![
                ChangeType::ForeignKeyRemoved,
                ChangeType::TableRemoved,
                ChangeType::ColumnRemoved,
            ]
        );
        assert_eq!(changes[0].table(), "Post");
    }

    #[test]
    fn test_reference_to_added_column_is_deferred() {
        let old = Schema::new().table(user());
        let new = Schema::new()
            .table(user().column(Column::new("code", "TEXT").unique()))
            .table(
                Table::new("Badge")
                    .column(Column::new("id", "INTEGER").primary_key())
                    .column(
                        Column::new("user_code", "TEXT").references(Reference::new("User", "code")),
                    ),
            );

        let changes = detect_changes(&old, &new, &DiffOptions::new()).unwrap();
        assert_eq!(
            types(&changes),
            vec![
                ChangeType::TableAdded,
                ChangeType::ColumnAdded,
                ChangeType::ForeignKeyAdded,
            ]
        );
        match &changes[0].kind {
            ChangeKind::TableAdded { table } => {
                assert!(table.columns.iter().all(|c| c.references.is_none()));
            }
            other => panic!("Expected TableAdded, got {other:?}"),
        }
        match &changes[2].kind {
            ChangeKind::ForeignKeyAdded {
                table,
                column,
                constraint_name,
                reference,
            } => {
                assert_eq!(table, "Badge");
                assert_eq!(column, "user_code");
                assert_eq!(constraint_name, "Badge_user_code_fkey");
                assert_eq!(reference, &Reference::new("User", "code"));
            }
            other => panic!("Expected ForeignKeyAdded, got {other:?}"),
        }
    }

    #[test]
    fn test_created_table_reports_nullable_primary_key() {
        let new = Schema::new().table(Table::new("T").column(Column::new("id", "INTEGER").primary_key().optional()));

        let changes = detect_changes(&Schema::new(), &new, &DiffOptions::new()).unwrap();
        assert_eq!(
            changes[0].warnings,
            vec!["Column 'id' is marked both primary key and nullable".to_string()]
        );
    }

    #[test]
    fn test_drops_are_reverse_dependency_order() {
        let old = Schema::new()
            .table(user())
            .table(
                Table::new("Session")
                    .column(Column::new("token", "TEXT"))
                    .column(Column::new("user_id", "INTEGER").references(Reference::new("User", "id"))),
            );
        let new = Schema::new();

        let changes = detect_changes(&old, &new, &DiffOptions::new().with_include_drops(true)).unwrap();
        let dropped: Vec<&str> = changes.iter().map(Change::table).collect();
        assert_eq!(dropped, vec!["Session", "User"]);
    }
}
