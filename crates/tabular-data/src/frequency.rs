//! Frequency tables over a categorical field.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tabular_core::models::Dataset;
use tabular_core::{Result, TabularError};
use tracing::warn;

// ── FrequencyTableBuilder ─────────────────────────────────────────────────────

/// Builds value-distribution tables for one categorical field.
pub struct FrequencyTableBuilder;

impl FrequencyTableBuilder {
    /// Occurrence count of each distinct value at `field_index`.
    ///
    /// Keys are exactly the observed values; no key has a zero count. Rows
    /// too short to address the field are skipped with a warning.
    pub fn counts(dataset: &Dataset, field_index: usize) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut skipped = 0usize;

        for row in dataset {
            match row.get(field_index) {
                Some(value) => *counts.entry(value.clone()).or_insert(0) += 1,
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(
                "FrequencyTableBuilder: skipped {} rows missing field {}",
                skipped, field_index
            );
        }
        counts
    }

    /// Distribution of the field as percentages of the counted rows.
    ///
    /// Percentages sum to 100 modulo floating-point rounding. Fails on an
    /// empty dataset (or one where no row carries the field).
    pub fn frequency_table(dataset: &Dataset, field_index: usize) -> Result<BTreeMap<String, f64>> {
        if dataset.is_empty() {
            return Err(TabularError::EmptyDataset);
        }

        let counts = Self::counts(dataset, field_index);
        let total: usize = counts.values().sum();
        if total == 0 {
            return Err(TabularError::EmptyDataset);
        }

        Ok(counts
            .into_iter()
            .map(|(value, count)| (value, count as f64 / total as f64 * 100.0))
            .collect())
    }
}

// ── Presentation ordering ─────────────────────────────────────────────────────

/// Rank a string-keyed table by descending value; ties order by key.
///
/// Ordering is a presentation concern; the table itself stays keyed by
/// value.
pub fn rank_descending(table: &BTreeMap<String, f64>) -> Vec<(String, f64)> {
    let mut entries: Vec<(String, f64)> = table.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    entries
}

/// The `n` highest-valued entries of a table, ranked.
pub fn top_n(table: &BTreeMap<String, f64>, n: usize) -> Vec<(String, f64)> {
    let mut ranked = rank_descending(table);
    ranked.truncate(n);
    ranked
}

// ── Tests ─────────────────────────────────────────────────────────────────────
