//! Duplicate-row removal keyed on a single field.
//!
//! Marketplace exports carry the same listing many times, one snapshot per
//! crawl; only the snapshot with the most reviews is current. Deduplication
//! keeps exactly that row per key.

use std::collections::{HashMap, HashSet};

use tabular_core::models::{Dataset, Row};
use tabular_core::normalize::NumericNormalizer;
use tabular_core::Result;
use tracing::{debug, warn};

// ── Deduplicator ──────────────────────────────────────────────────────────────

/// Removes logically-duplicate rows, retaining the best-ranked one per key.
pub struct Deduplicator;

impl Deduplicator {
    /// Retain one row per distinct value of `key_index`.
    ///
    /// The algorithm:
    /// 1. Scan once to find, per key, the maximum value of the ranking field
    ///    (parsed as `f64`).
    /// 2. Scan again in input order and keep the first row per key whose
    ///    ranking equals that maximum, so rank ties resolve to the first row
    ///    encountered.
    ///
    /// A ranking field that does not parse as a number fails the whole
    /// operation with an error identifying the offending row. Rows too short
    /// to address either index are skipped with a warning; row shape is the
    /// caller's contract.
    pub fn dedup(dataset: &Dataset, key_index: usize, ranking_index: usize) -> Result<Dataset> {
        let normalizer = NumericNormalizer::identity();

        // ── Pass 1: ranking ceiling per key ───────────────────────────────────
        let mut max_rank: HashMap<String, f64> = HashMap::new();
        let mut skipped = 0usize;

        for (row_index, row) in dataset.iter().enumerate() {
            let (Some(key), Some(raw_rank)) = (row.get(key_index), row.get(ranking_index)) else {
                skipped += 1;
                continue;
            };
            let rank = normalizer.parse(raw_rank, row_index, ranking_index)?;
            match max_rank.get_mut(key.as_str()) {
                Some(current) => {
                    if *current < rank {
                        *current = rank;
                    }
                }
                None => {
                    max_rank.insert(key.clone(), rank);
                }
            }
        }

        // ── Pass 2: stable sweep keeping the first max-ranked row ─────────────
        let mut seen: HashSet<String> = HashSet::new();
        let mut survivors: Vec<Row> = Vec::with_capacity(max_rank.len());

        for (row_index, row) in dataset.iter().enumerate() {
            let (Some(key), Some(raw_rank)) = (row.get(key_index), row.get(ranking_index)) else {
                continue;
            };
            let rank = normalizer.parse(raw_rank, row_index, ranking_index)?;
            if max_rank.get(key.as_str()).copied() == Some(rank) && !seen.contains(key.as_str()) {
                seen.insert(key.clone());
                survivors.push(row.clone());
            }
        }

        if skipped > 0 {
            warn!(
                "Deduplicator: skipped {} rows missing field {} or {}",
                skipped, key_index, ranking_index
            );
        }
        debug!(
            "Deduplicator: {} rows in, {} retained",
            dataset.len(),
            survivors.len()
        );

        Ok(Dataset::new(survivors))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tabular_core::TabularError;

    fn dataset(rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_keeps_max_ranked_row_per_key() {
        let input = dataset(&[&["A", "10"], &["A", "5"], &["B", "3"]]);
        let out = Deduplicator::dedup(&input, 0, 1).unwrap();
        assert_eq!(out, dataset(&[&["A", "10"], &["B", "3"]]));
    }

    #[test]
    fn test_unique_key_per_surviving_row() {
        let input = dataset(&[
            &["Twitter", "100"],
            &["Twitter", "250"],
            &["Twitter", "200"],
            &["Slack", "50"],
        ]);
        let out = Deduplicator::dedup(&input, 0, 1).unwrap();

        let mut keys: Vec<&str> = out.iter().map(|row| row[0].as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), out.len());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_retained_rank_is_the_maximum() {
        let input = dataset(&[&["A", "7"], &["A", "12"], &["A", "3"]]);
        let out = Deduplicator::dedup(&input, 0, 1).unwrap();
        assert_eq!(out.rows()[0][1], "12");
    }

    #[test]
    fn test_tie_break_keeps_first_encountered() {
        // Two rows share both key and the maximum rank; the earlier one,
        // distinguishable by its third field, must survive.
        let input = dataset(&[&["A", "10", "first"], &["A", "10", "second"]]);
        let out = Deduplicator::dedup(&input, 0, 1).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.rows()[0][2], "first");
    }

    #[test]
    fn test_idempotent() {
        let input = dataset(&[&["A", "10"], &["A", "5"], &["B", "3"], &["B", "3"]]);
        let once = Deduplicator::dedup(&input, 0, 1).unwrap();
        let twice = Deduplicator::dedup(&once, 0, 1).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unparseable_ranking_fails_with_row_context() {
        let input = dataset(&[&["A", "10"], &["B", "many"]]);
        let err = Deduplicator::dedup(&input, 0, 1).unwrap_err();
        match err {
            TabularError::FieldParse {
                row_index,
                field_index,
                value,
            } => {
                assert_eq!(row_index, 1);
                assert_eq!(field_index, 1);
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_float_rankings() {
        let input = dataset(&[&["A", "9.5"], &["A", "10.25"]]);
        let out = Deduplicator::dedup(&input, 0, 1).unwrap();
        assert_eq!(out.rows()[0][1], "10.25");
    }

    #[test]
    fn test_empty_dataset_yields_empty() {
        let out = Deduplicator::dedup(&Dataset::default(), 0, 1).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let input = dataset(&[&["A", "10"], &["B"]]);
        let out = Deduplicator::dedup(&input, 0, 1).unwrap();
        assert_eq!(out, dataset(&[&["A", "10"]]));
    }
}
