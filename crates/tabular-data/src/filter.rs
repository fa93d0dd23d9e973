//! Categorical row filtering.

use tabular_core::heuristics::EnglishNameClassifier;
use tabular_core::models::{Dataset, Row};
use tracing::debug;

// ── CategoricalFilter ─────────────────────────────────────────────────────────

/// Retains rows whose field at a given index satisfies a predicate.
///
/// Rows too short to address the field are treated as non-matching; row
/// shape is the caller's contract.
pub struct CategoricalFilter;

impl CategoricalFilter {
    /// Generic predicate filter over one field.
    pub fn filter<P>(dataset: &Dataset, field_index: usize, predicate: P) -> Dataset
    where
        P: Fn(&str) -> bool,
    {
        let rows: Vec<Row> = dataset
            .iter()
            .filter(|row| {
                row.get(field_index)
                    .map(|value| predicate(value))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        debug!(
            "CategoricalFilter: {} of {} rows retained on field {}",
            rows.len(),
            dataset.len(),
            field_index
        );
        Dataset::new(rows)
    }

    /// Retain rows whose field exactly equals `value`.
    ///
    /// Used to isolate free listings, whose price field is the literal
    /// `"0"` (Google Play) or `"0.0"` (App Store).
    pub fn with_exact_value(dataset: &Dataset, field_index: usize, value: &str) -> Dataset {
        Self::filter(dataset, field_index, |field| field == value)
    }

    /// Retain rows whose name field passes the English-name heuristic.
    pub fn english_named(
        dataset: &Dataset,
        field_index: usize,
        classifier: &EnglishNameClassifier,
    ) -> Dataset {
        Self::filter(dataset, field_index, |name| classifier.is_english(name))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
