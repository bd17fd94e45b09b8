//! Table-level change detection.

use std::collections::HashSet;

use tracing::debug;

use crate::schema::{Schema, Table};
use crate::similarity::{column_set_similarity, greedy_pairs};

/// How the tables of two snapshots correspond.
#[derive(Debug, Default)]
pub struct TableMatch<'a> {
    /// Tables present under the same name in both snapshots, in new
    /// snapshot order.
    pub common: Vec<(&'a Table, &'a Table)>,
    /// `(old, new)` pairs detected as renames, in the order they were claimed.
    pub renamed: Vec<(&'a Table, &'a Table)>,
    /// Old tables without a counterpart, in old snapshot order.
    pub removed: Vec<&'a Table>,
    /// New tables without a counterpart, in new snapshot order.
    pub added: Vec<&'a Table>,
}

/// Pairs the tables of `old` and `new`, detecting renames by column-set
/// similarity at `threshold`.
pub fn match_tables<'a>(old: &'a Schema, new: &'a Schema, threshold: f64) -> TableMatch<'a> {
    let old_names: HashSet<&str> = old.table_names().collect();
    let new_names: HashSet<&str> = new.table_names().collect();

    let common = new
        .tables
        .iter()
        .filter_map(|t| old.get_table(&t.name).map(|o| (o, t)))
        .collect();

    let removal_candidates: Vec<&Table> = old
        .tables
        .iter()
        .filter(|t| !new_names.contains(t.name.as_str()))
        .collect();
    let addition_candidates: Vec<&Table> = new
        .tables
        .iter()
        .filter(|t| !old_names.contains(t.name.as_str()))
        .collect();

    let pairs = greedy_pairs(
        &removal_candidates,
        &addition_candidates,
        threshold,
        |r, a| column_set_similarity(r, a),
    );

    let mut renamed = Vec::with_capacity(pairs.len());
    let mut removed_taken = vec![false; removal_candidates.len()];
    let mut added_taken = vec![false; addition_candidates.len()];
    for (r, a, score) in pairs {
        let (from, to) = (removal_candidates[r], addition_candidates[a]);
        debug!(from = %from.name, to = %to.name, score, "Detected table rename");
        removed_taken[r] = true;
        added_taken[a] = true;
        renamed.push((from, to));
    }

    TableMatch {
        common,
        renamed,
        removed: untaken(&removal_candidates, &removed_taken),
        added: untaken(&addition_candidates, &added_taken),
    }
}

fn untaken<'a>(tables: &[&'a Table], taken: &[bool]) -> Vec<&'a Table> {
    tables
        .iter()
        .zip(taken)
        .filter(|(_, taken)| !**taken)
        .map(|(t, _)| *t)
        .collect()
}

/// Orders tables so that every table comes after the tables it references.
///
/// Only references within `tables` count and self references are ignored.
/// The order is stable: among the tables that can be placed, the earliest
/// in the input goes first. A reference cycle is broken by placing the
/// earliest remaining table.
pub fn dependency_order<'a>(tables: &[&'a Table]) -> Vec<&'a Table> {
    let names: HashSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    let mut placed: HashSet<&str> = HashSet::with_capacity(tables.len());
    let mut remaining: Vec<&'a Table> = tables.to_vec();
    let mut ordered = Vec::with_capacity(tables.len());

    while !remaining.is_empty() {
        let ready = remaining.iter().position(|t| {
            t.referenced_tables()
                .all(|dep| !names.contains(dep) || placed.contains(dep))
        });
        let next = match ready {
            Some(pos) => pos,
            None => {
                debug!(table = %remaining[0].name, "Breaking foreign key cycle");
                0
            }
        };
        let table = remaining.remove(next);
        placed.insert(table.name.as_str());
        ordered.push(table);
    }

    ordered
}
