//! String and table similarity scoring used for rename detection.

use std::collections::BTreeSet;

use crate::schema::Table;

/// Computes the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let m = a.len();
    let n = b.len();
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];
    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Returns a normalized similarity score in `[0.0, 1.0]`.
/// 1.0 means identical, 0.0 means completely different.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64 / max_len as f64)
}

/// Jaccard similarity over the `name:type` tokens of two tables.
///
/// Table renames usually keep the column shape while the name changes
/// completely, which defeats edit distance on the table name. Two tables
/// without columns score 0.0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn column_set_similarity(a: &Table, b: &Table) -> f64 {
    let a_tokens: BTreeSet<String> = a.columns.iter().map(|c| c.signature()).collect();
    let b_tokens: BTreeSet<String> = b.columns.iter().map(|c| c.signature()).collect();

    let total = a_tokens.union(&b_tokens).count();
    if total == 0 {
        return 0.0;
    }
    let common = a_tokens.intersection(&b_tokens).count();
    common as f64 / total as f64
}

/// A candidate picked by [`find_best_match_by`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Position of the candidate in the input list.
    pub index: usize,
    /// Similarity score of the candidate.
    pub score: f64,
}

/// Returns the highest-scoring candidate at or above `threshold`.
///
/// Ties are broken by first-seen order, so the result is deterministic for
/// a given candidate order.
pub fn find_best_match_by<T, F>(candidates: &[T], threshold: f64, mut score: F) -> Option<Match>
where
    F: FnMut(&T) -> f64,
{
    let mut best: Option<Match> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let s = score(candidate);
        if s < threshold {
            continue;
        }
        if best.is_none_or(|b| s > b.score) {
            best = Some(Match { index, score: s });
        }
    }
    best
}

/// String flavour of [`find_best_match_by`] scoring with [`similarity`].
#[must_use]
pub fn find_best_match<'a>(target: &str, candidates: &[&'a str], threshold: f64) -> Option<&'a str> {
    find_best_match_by(candidates, threshold, |c| similarity(target, c)).map(|m| candidates[m.index])
}

/// Pairs removed items with added items one-to-one.
///
/// Greedy: the best remaining pair is claimed first, ties going to the
/// earlier removed item and then the earlier candidate. Returns
/// `(removed_index, added_index, score)` in the order the pairs were claimed.
pub fn greedy_pairs<R, A, F>(
    removed: &[R],
    added: &[A],
    threshold: f64,
    mut score: F,
) -> Vec<(usize, usize, f64)>
where
    F: FnMut(&R, &A) -> f64,
{
    // Scores are computed once; the matrix is small (tens of tables).
    let matrix: Vec<Vec<f64>> = removed
        .iter()
        .map(|r| added.iter().map(|a| score(r, a)).collect())
        .collect();

    let mut removed_taken = vec![false; removed.len()];
    let mut added_taken = vec![false; added.len()];
    let mut pairs = Vec::new();

    loop {
        let mut best: Option<(usize, Match)> = None;
        for (r, row) in matrix.iter().enumerate() {
            if removed_taken[r] {
                continue;
            }
            let open: Vec<(usize, f64)> = row
                .iter()
                .copied()
                .enumerate()
                .filter(|(a, _)| !added_taken[*a])
                .collect();
            let Some(m) = find_best_match_by(&open, threshold, |(_, s)| *s) else {
                continue;
            };
            let m = Match {
                index: open[m.index].0,
                score: m.score,
            };
            if best.is_none_or(|(_, b)| m.score > b.score) {
                best = Some((r, m));
            }
        }

        let Some((r, m)) = best else {
            break;
        };
        removed_taken[r] = true;
        added_taken[m.index] = true;
        pairs.push((r, m.index, m.score));
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    #[test]
    fn test_levenshtein_basic() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn test_similarity_basic() {
        assert!((similarity("abc", "abc") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("abc", "xyz").abs() < f64::EPSILON);
        // "name" vs "full_name": dist 5, max 9, sim ~0.44
        let s = similarity("name", "full_name");
        assert!(s > 0.4 && s < 0.5, "sim={s}");
    }

    #[test]
    fn test_similarity_is_symmetric() {
        for (a, b) in [("user_id", "userid"), ("email", "e_mail"), ("", "x")] {
            assert!((similarity(a, b) - similarity(b, a)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_similarity_counts_characters() {
        // Two-byte characters must not inflate the denominator.
        assert!((similarity("né", "ne") - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_column_set_similarity() {
        let customer = Table::new("Customer")
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("name", "TEXT"));
        let client = Table::new("Client")
            .column(Column::new("id", "integer").primary_key())
            .column(Column::new("name", "TEXT"));
        assert!((column_set_similarity(&customer, &client) - 1.0).abs() < f64::EPSILON);

        let other = Table::new("Other")
            .column(Column::new("id", "INTEGER").primary_key())
            .column(Column::new("title", "TEXT"));
        // {id, name} vs {id, title}: 1 common out of 3
        let s = column_set_similarity(&customer, &other);
        assert!((s - 1.0 / 3.0).abs() < 1e-9, "sim={s}");

        assert!(column_set_similarity(&Table::new("a"), &Table::new("b")).abs() < f64::EPSILON);
    }

    #[test]
    fn test_find_best_match() {
        let candidates = ["email_address", "emails", "phone"];
        assert_eq!(find_best_match("email", &candidates, 0.7), Some("emails"));
        assert_eq!(find_best_match("zzz", &candidates, 0.7), None);
    }

    #[test]
    fn test_find_best_match_ties_go_to_first_seen() {
        let candidates = ["abd", "abe"];
        assert_eq!(find_best_match("abc", &candidates, 0.5), Some("abd"));
    }

    #[test]
    fn test_greedy_pairs_claims_best_pair_first() {
        let removed = ["user_name", "usr_nm"];
        let added = ["usr_name", "unrelated"];
        let pairs = greedy_pairs(&removed, &added, 0.5, |r, a| similarity(r, a));

        // "user_name"/"usr_name" (0.89) beats "usr_nm"/"usr_name" (0.75).
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].0, pairs[0].1), (0, 0));
    }

    #[test]
    fn test_greedy_pairs_is_one_to_one() {
        let removed = ["a", "a"];
        let added = ["a"];
        let pairs = greedy_pairs(&removed, &added, 0.5, |r, a| similarity(r, a));
        assert_eq!(pairs, vec![(0, 0, 1.0)]);
    }
}
