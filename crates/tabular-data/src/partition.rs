//! Title-prefix classification and dataset partitioning.
//!
//! Post datasets mix several kinds of submissions distinguishable only by a
//! conventional title prefix ("Ask HN: …", "Show HN: …"). The classifier
//! splits a dataset into labelled cohorts so they can be compared.

use std::collections::BTreeMap;

use regex::Regex;
use tabular_core::models::{Dataset, Row};
use tracing::debug;

// ── Partition ─────────────────────────────────────────────────────────────────

/// The outcome of splitting a dataset by title prefix.
#[derive(Debug, Clone)]
pub struct Partition {
    /// One dataset per classifier label, in label order. A label with no
    /// matching rows maps to an empty dataset.
    pub cohorts: BTreeMap<String, Dataset>,
    /// Rows matching no prefix (or missing the title field).
    pub remainder: Dataset,
}

// ── PrefixClassifier ──────────────────────────────────────────────────────────

/// Classifies titles by an ordered list of case-insensitive prefixes.
///
/// Each prefix is escaped and anchored at the start of the title (leading
/// whitespace tolerated); the first matching label wins, so the order of
/// the `(label, prefix)` pairs is significant.
#[derive(Debug, Clone)]
pub struct PrefixClassifier {
    patterns: Vec<(String, Regex)>,
}

impl PrefixClassifier {
    /// Build a classifier from `(label, prefix)` pairs.
    pub fn new<I, L, P>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = (L, P)>,
        L: Into<String>,
        P: AsRef<str>,
    {
        let patterns = prefixes
            .into_iter()
            .map(|(label, prefix)| {
                let pattern = format!(r"(?i)^\s*{}", regex::escape(prefix.as_ref()));
                let re = Regex::new(&pattern).expect("regex is valid");
                (label.into(), re)
            })
            .collect();
        Self { patterns }
    }

    /// Preset for question-vs-showcase post cohorts.
    pub fn ask_show() -> Self {
        Self::new([("ask", "ask hn"), ("show", "show hn")])
    }

    /// The labels this classifier can assign, in match order.
    pub fn labels(&self) -> Vec<&str> {
        self.patterns.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// The first label whose prefix matches `title`, if any.
    pub fn classify(&self, title: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(title))
            .map(|(label, _)| label.as_str())
    }

    /// Split `dataset` into one cohort per label plus the remainder.
    ///
    /// Cohorts are disjoint and, together with the remainder, reconstruct
    /// the input rows.
    pub fn partition(&self, dataset: &Dataset, field_index: usize) -> Partition {
        let mut buckets: Vec<Vec<Row>> = vec![Vec::new(); self.patterns.len()];
        let mut rest: Vec<Row> = Vec::new();

        for row in dataset {
            let matched = row
                .get(field_index)
                .and_then(|title| self.patterns.iter().position(|(_, re)| re.is_match(title)));
            match matched {
                Some(i) => buckets[i].push(row.clone()),
                None => rest.push(row.clone()),
            }
        }

        // Merge buckets by label; a label used twice accumulates both.
        let mut cohorts: BTreeMap<String, Dataset> = self
            .patterns
            .iter()
            .map(|(label, _)| (label.clone(), Dataset::default()))
            .collect();
        for ((label, _), rows) in self.patterns.iter().zip(buckets) {
            if let Some(cohort) = cohorts.get_mut(label) {
                let mut merged = cohort.rows().to_vec();
                merged.extend(rows);
                *cohort = Dataset::new(merged);
            }
        }

        debug!(
            "PrefixClassifier: partitioned {} rows into {} cohorts ({} unmatched)",
            dataset.len(),
            cohorts.len(),
            rest.len()
        );

        Partition {
            cohorts,
            remainder: Dataset::new(rest),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
