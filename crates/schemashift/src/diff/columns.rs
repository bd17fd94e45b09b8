//! Column-level change detection within a pair of tables.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::change::{foreign_key_name, unique_constraint_name, Change, ChangeKind, ColumnConstraint};
use crate::options::DiffOptions;
use crate::schema::{normalize_type, Column, Index, Table};
use crate::similarity::{greedy_pairs, similarity};

use super::Phase;

/// Diffs two versions of one table. Changes are emitted under the new
/// table name; constraint names being dropped derive from the old one.
pub(super) fn diff_table(old: &Table, new: &Table, options: &DiffOptions) -> Vec<(Phase, Change)> {
    let mut changes = Vec::new();

    let removed: Vec<&Column> = old
        .columns
        .iter()
        .filter(|c| new.get_column(&c.name).is_none())
        .collect();
    let added: Vec<&Column> = new
        .columns
        .iter()
        .filter(|c| old.get_column(&c.name).is_none())
        .collect();

    // ---- column renames ----
    let mut pairs = greedy_pairs(&removed, &added, options.rename_threshold, |r, a| {
        similarity(&r.name, &a.name)
    });
    pairs.sort_by_key(|(r, _, _)| *r);

    let mut renamed_from: HashSet<&str> = HashSet::new();
    let mut rename_source: Vec<(&str, &Column)> = Vec::new();
    for (r, a, score) in pairs {
        let (from, to) = (removed[r], added[a]);
        debug!(table = %new.name, from = %from.name, to = %to.name, score, "Detected column rename");
        renamed_from.insert(from.name.as_str());
        rename_source.push((to.name.as_str(), from));
        changes.push((
            Phase::ColumnRename,
            Change::new(ChangeKind::ColumnRenamed {
                table: new.name.clone(),
                old_name: from.name.clone(),
                new_name: to.name.clone(),
            }),
        ));
    }

    // ---- additions and in-place modifications, in new column order ----
    let old_pk: HashSet<&str> = old.primary_key_columns().into_iter().collect();
    let new_pk: HashSet<&str> = new.primary_key_columns().into_iter().collect();

    for column in &new.columns {
        let previous = old.get_column(&column.name).or_else(|| {
            rename_source
                .iter()
                .find(|(to, _)| *to == column.name)
                .map(|(_, from)| *from)
        });

        let Some(previous) = previous else {
            let mut change = Change::new(ChangeKind::ColumnAdded {
                table: new.name.clone(),
                column: column.clone(),
            });
            if new_pk.contains(column.name.as_str()) {
                change = change.with_warning(primary_key_warning(&column.name));
                if let Some(warning) = nullable_primary_key_warning(column, true) {
                    change = change.with_warning(warning);
                }
            }
            changes.push((Phase::ColumnChange, change));
            continue;
        };

        let mut modified = compare_columns(&old.name, &new.name, previous, column);

        let was_pk = old_pk.contains(previous.name.as_str());
        let is_pk = new_pk.contains(column.name.as_str());
        if was_pk != is_pk {
            let warning = primary_key_warning(&column.name);
            if modified.is_empty() {
                warn!(table = %new.name, column = %column.name, "{warning}");
            } else {
                for (_, change) in &mut modified {
                    change.warnings.push(warning.clone());
                }
            }
        }

        changes.extend(modified);
    }

    // ---- drops ----
    for column in removed
        .iter()
        .filter(|c| !renamed_from.contains(c.name.as_str()))
    {
        if !options.include_drops {
            debug!(table = %new.name, column = %column.name, "Omitting column removal");
            continue;
        }
        // The foreign key goes first: it may reference a table dropped in
        // this plan.
        if let Some(reference) = &column.references {
            changes.push((
                Phase::ConstraintRemoval,
                Change::new(ChangeKind::ForeignKeyRemoved {
                    table: new.name.clone(),
                    column: column.name.clone(),
                    constraint_name: foreign_key_name(&old.name, &column.name),
                    reference: reference.clone(),
                }),
            ));
        }
        changes.push((
            Phase::ColumnDrop,
            Change::new(ChangeKind::ColumnRemoved {
                table: new.name.clone(),
                column: (*column).clone(),
            }),
        ));
    }

    changes.extend(diff_indexes(old, new));
    changes
}

fn primary_key_warning(column: &str) -> String {
    format!("Primary key membership of column '{column}' changed; primary key changes are not generated")
}

/// Warning for a column that is both primary key and nullable. Such input
/// is diffed as given.
pub(super) fn nullable_primary_key_warning(column: &Column, is_pk: bool) -> Option<String> {
    (is_pk && column.is_optional).then(|| {
        format!(
            "Column '{}' is marked both primary key and nullable",
            column.name
        )
    })
}

/// Compares the attributes of a column present in both versions of a table.
fn compare_columns(
    old_table: &str,
    table: &str,
    old: &Column,
    new: &Column,
) -> Vec<(Phase, Change)> {
    let mut changes = Vec::new();
    let column = new.name.clone();

    // Type and nullability run before the default change, so the old default
    // is the one in effect for them.

    // ---- type ----
    if normalize_type(&old.data_type) != normalize_type(&new.data_type) {
        changes.push((
            Phase::ColumnChange,
            Change::new(ChangeKind::ColumnTypeChanged {
                table: table.to_string(),
                column: column.clone(),
                old_type: old.data_type.clone(),
                new_type: new.data_type.clone(),
                is_optional: old.is_optional,
                default: old.default.clone(),
            }),
        ));
    }

    // ---- nullability ----
    if old.is_optional != new.is_optional {
        let kind = if new.is_optional {
            ChangeKind::ColumnConstraintRemoved {
                table: table.to_string(),
                column: column.clone(),
                constraint: ColumnConstraint::NotNull,
                data_type: new.data_type.clone(),
                default: old.default.clone(),
            }
        } else {
            ChangeKind::ColumnConstraintAdded {
                table: table.to_string(),
                column: column.clone(),
                constraint: ColumnConstraint::NotNull,
                data_type: new.data_type.clone(),
                default: old.default.clone(),
            }
        };
        changes.push((Phase::ColumnChange, Change::new(kind)));
    }

    // ---- uniqueness ----
    if old.is_unique != new.is_unique {
        let kind = if new.is_unique {
            ChangeKind::ColumnConstraintAdded {
                table: table.to_string(),
                column: column.clone(),
                constraint: ColumnConstraint::Unique {
                    name: unique_constraint_name(table, &new.name),
                },
                data_type: new.data_type.clone(),
                default: old.default.clone(),
            }
        } else {
            ChangeKind::ColumnConstraintRemoved {
                table: table.to_string(),
                column: column.clone(),
                constraint: ColumnConstraint::Unique {
                    name: unique_constraint_name(old_table, &old.name),
                },
                data_type: new.data_type.clone(),
                default: old.default.clone(),
            }
        };
        changes.push((Phase::ColumnChange, Change::new(kind)));
    }

    // ---- default ----
    if old.default != new.default {
        changes.push((
            Phase::ColumnChange,
            Change::new(ChangeKind::ColumnDefaultChanged {
                table: table.to_string(),
                column: column.clone(),
                old_default: old.default.clone(),
                new_default: new.default.clone(),
            }),
        ));
    }

    // ---- foreign key ----
    if old.references != new.references {
        if let Some(reference) = &old.references {
            changes.push((
                Phase::ConstraintRemoval,
                Change::new(ChangeKind::ForeignKeyRemoved {
                    table: table.to_string(),
                    column: column.clone(),
                    constraint_name: foreign_key_name(old_table, &old.name),
                    reference: reference.clone(),
                }),
            ));
        }
        if let Some(reference) = &new.references {
            changes.push((
                Phase::ConstraintAddition,
                Change::new(ChangeKind::ForeignKeyAdded {
                    table: table.to_string(),
                    column,
                    constraint_name: foreign_key_name(table, &new.name),
                    reference: reference.clone(),
                }),
            ));
        }
    }

    changes
}

/// Diffs the indexes of two versions of a table. Names are frozen at
/// detection time so a later rename of the table cannot change them.
fn diff_indexes(old: &Table, new: &Table) -> Vec<(Phase, Change)> {
    let frozen = |index: &Index, table: &str| Index {
        name: Some(index.resolved_name(table)),
        ..index.clone()
    };

    let removed = old
        .indexes
        .iter()
        .filter(|o| !new.indexes.iter().any(|n| n.equivalent(o)))
        .map(|o| {
            (
                Phase::ConstraintRemoval,
                Change::new(ChangeKind::IndexRemoved {
                    table: new.name.clone(),
                    index: frozen(o, &old.name),
                }),
            )
        });

    let added = new
        .indexes
        .iter()
        .filter(|n| !old.indexes.iter().any(|o| o.equivalent(n)))
        .map(|n| {
            (
                Phase::ConstraintAddition,
                Change::new(ChangeKind::IndexAdded {
                    table: new.name.clone(),
                    index: frozen(n, &new.name),
                }),
            )
        });

    removed.chain(added).collect()
}
