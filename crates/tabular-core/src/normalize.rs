use serde::{Deserialize, Serialize};

use crate::error::{Result, TabularError};

// ── NumericNormalizer ─────────────────────────────────────────────────────────

/// Cleans raw numeric field strings before parsing them as `f64`.
///
/// Normalization is a configurable character strip: every character in the
/// strip set is removed, then the remainder is parsed. The default strips
/// nothing (direct float parse).
///
/// The [`install_counts`](Self::install_counts) preset handles Google Play
/// install ranges: `"100,000+"` normalizes to `"100000"` and parses to
/// `100000.0`, interpreting an open-ended range as its lower bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericNormalizer {
    strip: Vec<char>,
}

impl NumericNormalizer {
    /// Identity normalization: the raw string is parsed as-is.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Strip the given characters before parsing.
    pub fn stripping(chars: &[char]) -> Self {
        Self {
            strip: chars.to_vec(),
        }
    }

    /// Preset for install-count ranges: strips thousands separators and the
    /// trailing range marker (`"100,000+"` → `100000.0`).
    pub fn install_counts() -> Self {
        Self::stripping(&[',', '+'])
    }

    /// Apply the character strip without parsing.
    pub fn normalize(&self, raw: &str) -> String {
        if self.strip.is_empty() {
            return raw.to_string();
        }
        raw.chars().filter(|c| !self.strip.contains(c)).collect()
    }

    /// Normalize and parse `raw` as `f64`.
    ///
    /// `row_index` / `field_index` identify the offending cell in the error
    /// when the normalized value still fails to parse.
    pub fn parse(&self, raw: &str, row_index: usize, field_index: usize) -> Result<f64> {
        let cleaned = self.normalize(raw);
        cleaned
            .trim()
            .parse::<f64>()
            .map_err(|_| TabularError::FieldParse {
                row_index,
                field_index,
                value: raw.to_string(),
            })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
