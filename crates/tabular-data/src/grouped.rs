//! Grouped and whole-dataset averages of a numeric field.

use std::collections::BTreeMap;

use tabular_core::models::{Dataset, Row};
use tabular_core::normalize::NumericNormalizer;
use tabular_core::{Result, TabularError};
use tracing::warn;

// ── MeanAccumulator ───────────────────────────────────────────────────────────

/// Running sum/count pair; stays private so callers only ever see finished
/// means.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

// ── GroupedAverageBuilder ─────────────────────────────────────────────────────

/// Computes arithmetic means of a numeric field, partitioned by a
/// categorical key.
pub struct GroupedAverageBuilder;

impl GroupedAverageBuilder {
    /// Mean of the numeric field per distinct value of `group_index`.
    ///
    /// `normalizer` cleans the raw numeric string before parsing; a value
    /// that still fails to parse aborts with an error naming the offending
    /// row. Groups are the observed field values, so none is empty.
    pub fn grouped_average(
        dataset: &Dataset,
        group_index: usize,
        numeric_index: usize,
        normalizer: &NumericNormalizer,
    ) -> Result<BTreeMap<String, f64>> {
        Self::grouped_average_by(
            dataset,
            |_, row| Ok(row.get(group_index).cloned()),
            numeric_index,
            normalizer,
        )
    }

    /// Mean of the numeric field per group key derived from each row.
    ///
    /// `key_fn` receives `(row_index, row)` and returns the group key,
    /// `None` to skip the row (e.g. a row too short to address), or an
    /// error to abort the computation (e.g. a malformed timestamp).
    pub fn grouped_average_by<F>(
        dataset: &Dataset,
        key_fn: F,
        numeric_index: usize,
        normalizer: &NumericNormalizer,
    ) -> Result<BTreeMap<String, f64>>
    where
        F: Fn(usize, &Row) -> Result<Option<String>>,
    {
        let mut groups: BTreeMap<String, MeanAccumulator> = BTreeMap::new();
        let mut skipped = 0usize;

        for (row_index, row) in dataset.iter().enumerate() {
            let Some(key) = key_fn(row_index, row)? else {
                skipped += 1;
                continue;
            };
            let Some(raw) = row.get(numeric_index) else {
                skipped += 1;
                continue;
            };
            let value = normalizer.parse(raw, row_index, numeric_index)?;
            groups.entry(key).or_default().add(value);
        }

        if skipped > 0 {
            warn!(
                "GroupedAverageBuilder: skipped {} rows missing addressed fields",
                skipped
            );
        }

        Ok(groups
            .into_iter()
            .map(|(key, acc)| (key, acc.mean()))
            .collect())
    }

    /// Mean of the numeric field over the whole dataset.
    pub fn average(
        dataset: &Dataset,
        numeric_index: usize,
        normalizer: &NumericNormalizer,
    ) -> Result<f64> {
        if dataset.is_empty() {
            return Err(TabularError::EmptyDataset);
        }

        let mut acc = MeanAccumulator::default();
        let mut skipped = 0usize;

        for (row_index, row) in dataset.iter().enumerate() {
            let Some(raw) = row.get(numeric_index) else {
                skipped += 1;
                continue;
            };
            acc.add(normalizer.parse(raw, row_index, numeric_index)?);
        }

        if skipped > 0 {
            warn!(
                "GroupedAverageBuilder: skipped {} rows missing field {}",
                skipped, numeric_index
            );
        }
        if acc.count == 0 {
            return Err(TabularError::EmptyDataset);
        }
        Ok(acc.mean())
    }

    /// Mean of the numeric field over rows whose `group_index` field equals
    /// `group`.
    ///
    /// Unlike [`grouped_average`](Self::grouped_average), the group value is
    /// supplied externally here, so it may match nothing; that case fails
    /// with an empty-group error rather than fabricating a zero.
    pub fn average_for_group(
        dataset: &Dataset,
        group_index: usize,
        group: &str,
        numeric_index: usize,
        normalizer: &NumericNormalizer,
    ) -> Result<f64> {
        let mut acc = MeanAccumulator::default();

        for (row_index, row) in dataset.iter().enumerate() {
            let matches = row
                .get(group_index)
                .map(|value| value == group)
                .unwrap_or(false);
            if !matches {
                continue;
            }
            let Some(raw) = row.get(numeric_index) else {
                continue;
            };
            acc.add(normalizer.parse(raw, row_index, numeric_index)?);
        }

        if acc.count == 0 {
            return Err(TabularError::EmptyGroup(group.to_string()));
        }
        Ok(acc.mean())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
