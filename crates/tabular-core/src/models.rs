use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, TabularError};

/// A single record: an ordered sequence of string fields addressed by
/// position. Field meaning is supplied externally via a [`Schema`].
pub type Row = Vec<String>;

// ── Dataset ───────────────────────────────────────────────────────────────────

/// An immutable collection of rows sharing one schema.
///
/// The dataset does not enforce a uniform field count; passing consistent
/// rows is the caller's contract. Transformations never mutate a dataset,
/// they produce a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    /// Wrap a vector of rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the dataset holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows as a slice.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// The field at `(row_index, field_index)`, if both are in range.
    pub fn field(&self, row_index: usize, field_index: usize) -> Option<&str> {
        self.rows
            .get(row_index)
            .and_then(|row| row.get(field_index))
            .map(String::as_str)
    }
}

impl From<Vec<Row>> for Dataset {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// Maps field names to their positional index within a row.
///
/// Built from an ordered header (first name is index 0, and so on), so
/// callers can address fields symbolically while the aggregation code stays
/// index-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema from an ordered list of field names.
    ///
    /// A repeated name keeps its first position; the later occurrence is
    /// ignored, matching how a header row would be read left to right.
    pub fn from_header<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = HashMap::new();
        for (index, name) in names.into_iter().enumerate() {
            fields.entry(name.into()).or_insert(index);
        }
        Self { fields }
    }

    /// Resolve a field name to its positional index.
    pub fn index(&self, name: &str) -> Result<usize> {
        self.fields
            .get(name)
            .copied()
            .ok_or_else(|| TabularError::UnknownField(name.to_string()))
    }

    /// `true` when the schema knows `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of named fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when the schema holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
