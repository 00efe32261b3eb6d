//! Exact-key join of a per-key summary table onto observation rows

use crate::structs::{NormError, Result};
use std::collections::HashMap;
use std::hash::Hash;

/// Index summary rows by key, requiring exactly one row per key
///
/// # Errors
/// Returns `JoinCardinalityViolation` if two rows share a key
pub fn index_unique<K, S, F>(summaries: &[S], key: F) -> Result<HashMap<K, &S>>
where
    K: Eq + Hash + std::fmt::Debug,
    F: Fn(&S) -> K,
{
    let mut index = HashMap::with_capacity(summaries.len());
    for summary in summaries {
        let k = key(summary);
        if index.contains_key(&k) {
            return Err(NormError::JoinCardinalityViolation(format!(
                "summary table has more than one row for key {k:?}"
            )));
        }
        index.insert(k, summary);
    }
    Ok(index)
}

/// Pair every row with the summary for its key (one-to-many)
///
/// The output has exactly one entry per input row, in input order.
///
/// # Errors
/// Returns `JoinCardinalityViolation` if the summary table has duplicate
/// keys or no row for some row's key
pub fn join_one_to_many<'a, R, S, K, FR, FS>(
    rows: &'a [R],
    summaries: &'a [S],
    row_key: FR,
    summary_key: FS,
) -> Result<Vec<(&'a R, &'a S)>>
where
    K: Eq + Hash + std::fmt::Debug,
    FR: Fn(&R) -> K,
    FS: Fn(&S) -> K,
{
    let index = index_unique(summaries, summary_key)?;

    rows.iter()
        .map(|row| {
            let k = row_key(row);
            index.get(&k).map(|&summary| (row, summary)).ok_or_else(|| {
                NormError::JoinCardinalityViolation(format!("summary table has no row for key {k:?}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_preserves_cardinality() {
        let rows: Vec<(&str, f64)> = vec![("A", 1.0), ("B", 2.0), ("A", 3.0), ("A", 4.0)];
        let summaries: Vec<(&str, f64)> = vec![("A", 10.0), ("B", 20.0)];

        let joined = join_one_to_many(&rows, &summaries, |r| r.0, |s| s.0).expect("join");

        assert_eq!(joined.len(), rows.len());
        for (row, summary) in &joined {
            assert_eq!(row.0, summary.0);
        }
        assert!((joined[2].1 .1 - 10.0).abs() < f64::EPSILON);
        assert!((joined[1].1 .1 - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_join_missing_key() {
        let rows: Vec<(&str, f64)> = vec![("A", 1.0), ("C", 2.0)];
        let summaries: Vec<(&str, f64)> = vec![("A", 10.0)];

        let err = join_one_to_many(&rows, &summaries, |r| r.0, |s| s.0).expect_err("C is missing");
        assert!(matches!(err, NormError::JoinCardinalityViolation(_)));
    }

    #[test]
    fn test_join_duplicate_key() {
        let rows: Vec<(&str, f64)> = vec![("A", 1.0)];
        let summaries: Vec<(&str, f64)> = vec![("A", 10.0), ("A", 11.0)];

        let err = join_one_to_many(&rows, &summaries, |r| r.0, |s| s.0).expect_err("A twice");
        assert!(matches!(err, NormError::JoinCardinalityViolation(_)));
    }

    #[test]
    fn test_join_is_exact_match() {
        let rows: Vec<(&str, f64)> = vec![("AB", 1.0)];
        let summaries: Vec<(&str, f64)> = vec![("A", 10.0), ("ab", 11.0)];

        assert!(join_one_to_many(&rows, &summaries, |r| r.0, |s| s.0).is_err());
    }
}
