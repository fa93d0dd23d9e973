use chrono::NaiveDateTime;
use tracing::warn;

use crate::error::{Result, TabularError};

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Parses post-creation timestamps from the formats found in exported
/// tabular data.
///
/// The primary format is the US-style `"%m/%d/%Y %H:%M"` used by the Hacker
/// News export (e.g. `"8/4/2016 11:52"`); ISO-style forms are accepted as
/// fallbacks. Timestamps are treated as naive local values; no timezone
/// conversion is applied.
pub struct TimestampParser;

impl TimestampParser {
    /// Attempt each known format in order.
    pub fn parse(s: &str) -> Result<NaiveDateTime> {
        const FORMATS: &[&str] = &[
            "%m/%d/%Y %H:%M",
            "%m/%d/%Y %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
        ];

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TabularError::TimestampParse(s.to_string()));
        }

        for fmt in FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Ok(dt);
            }
        }

        warn!("TimestampParser: could not parse timestamp string \"{}\"", s);
        Err(TabularError::TimestampParse(s.to_string()))
    }

    /// Zero-padded hour-of-day key for grouping, e.g. `"8/4/2016 9:05"` → `"09"`.
    pub fn hour_key(s: &str) -> Result<String> {
        let dt = Self::parse(s)?;
        Ok(dt.format("%H").to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
