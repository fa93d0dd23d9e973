//! End-to-end analysis pipelines.
//!
//! Composes cleaning and aggregation into the two analyses this workspace
//! exists for: marketplace-listing profiling (dedup, language and price
//! filters, genre tables) and post-engagement profiling (title cohorts,
//! hourly averages). Both return serializable reports with run metadata.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabular_core::heuristics::EnglishNameClassifier;
use tabular_core::models::{Dataset, Schema};
use tabular_core::normalize::NumericNormalizer;
use tabular_core::time_utils::TimestampParser;
use tabular_core::{Result, TabularError};
use tracing::{debug, warn};

use crate::dedup::Deduplicator;
use crate::filter::CategoricalFilter;
use crate::frequency::{top_n, FrequencyTableBuilder};
use crate::grouped::GroupedAverageBuilder;
use crate::partition::PrefixClassifier;

// ── Marketplace analysis ──────────────────────────────────────────────────────

/// Column bindings for a marketplace listing dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketColumns {
    /// App name; the deduplication key.
    pub name: usize,
    /// Review count; ranks duplicate listings.
    pub reviews: usize,
    /// Price string, matched exactly against the free marker.
    pub price: usize,
    /// Genre / category; the grouping field.
    pub genre: usize,
    /// Popularity proxy (installs or rating counts) to average per genre.
    pub popularity: usize,
}

impl MarketColumns {
    /// Resolve the bindings from a schema by field name.
    pub fn from_schema(
        schema: &Schema,
        name: &str,
        reviews: &str,
        price: &str,
        genre: &str,
        popularity: &str,
    ) -> Result<Self> {
        Ok(Self {
            name: schema.index(name)?,
            reviews: schema.index(reviews)?,
            price: schema.index(price)?,
            genre: schema.index(genre)?,
            popularity: schema.index(popularity)?,
        })
    }
}

/// Tunable parameters for the marketplace pipeline.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub columns: MarketColumns,
    /// Literal price string marking a free listing (`"0"` on Google Play,
    /// `"0.0"` on the App Store).
    pub free_marker: String,
    pub classifier: EnglishNameClassifier,
    /// Cleans the popularity field before averaging (install-count datasets
    /// need the `,`/`+` strip; plain counters parse as-is).
    pub normalizer: NumericNormalizer,
    /// Length of the ranked excerpt lists in the report.
    pub top_n: usize,
}

impl MarketConfig {
    /// Defaults: free marker `"0"`, default English threshold, identity
    /// normalization, top-10 excerpts.
    pub fn new(columns: MarketColumns) -> Self {
        Self {
            columns,
            free_marker: "0".to_string(),
            classifier: EnglishNameClassifier::new(),
            normalizer: NumericNormalizer::identity(),
            top_n: 10,
        }
    }
}

/// Row counts and timings recorded alongside a marketplace report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Rows in the input dataset.
    pub rows_in: usize,
    /// Rows surviving deduplication.
    pub rows_after_dedup: usize,
    /// Rows surviving the English-name filter.
    pub rows_after_language: usize,
    /// Rows surviving the free-price filter (the analysed dataset).
    pub rows_after_price: usize,
    /// Wall-clock seconds spent cleaning (dedup + filters).
    pub clean_time_seconds: f64,
    /// Wall-clock seconds spent aggregating.
    pub aggregate_time_seconds: f64,
}

/// The complete output of [`analyze_market`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketReport {
    /// Genre → percentage of cleaned rows.
    pub genre_shares: BTreeMap<String, f64>,
    /// The `top_n` genres by share, descending.
    pub top_shares: Vec<(String, f64)>,
    /// Genre → mean popularity (normalized).
    pub genre_popularity: BTreeMap<String, f64>,
    /// The `top_n` genres by mean popularity, descending.
    pub top_popularity: Vec<(String, f64)>,
    pub metadata: MarketMetadata,
}

/// Run the marketplace cleaning-and-aggregation pipeline.
///
/// 1. Deduplicate by name, ranking duplicates by review count.
/// 2. Drop listings whose name fails the English heuristic.
/// 3. Drop paid listings (price != free marker).
/// 4. Build the genre frequency table over the survivors.
/// 5. Average the popularity field per genre.
///
/// Fails when the cleaned dataset is empty or a numeric field is
/// malformed; a bad row halts the computation rather than skewing results.
pub fn analyze_market(dataset: &Dataset, config: &MarketConfig) -> Result<MarketReport> {
    let columns = &config.columns;

    // ── Step 1-3: Clean ───────────────────────────────────────────────────────
    let clean_start = Instant::now();
    let deduped = Deduplicator::dedup(dataset, columns.name, columns.reviews)?;
    let english = CategoricalFilter::english_named(&deduped, columns.name, &config.classifier);
    let free = CategoricalFilter::with_exact_value(&english, columns.price, &config.free_marker);
    let clean_time = clean_start.elapsed().as_secs_f64();

    debug!(
        "analyze_market: {} rows in, {} after dedup, {} after language, {} after price",
        dataset.len(),
        deduped.len(),
        english.len(),
        free.len()
    );

    // ── Step 4-5: Aggregate ───────────────────────────────────────────────────
    let aggregate_start = Instant::now();
    let genre_shares = FrequencyTableBuilder::frequency_table(&free, columns.genre)?;
    let genre_popularity = GroupedAverageBuilder::grouped_average(
        &free,
        columns.genre,
        columns.popularity,
        &config.normalizer,
    )?;
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    let metadata = MarketMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_in: dataset.len(),
        rows_after_dedup: deduped.len(),
        rows_after_language: english.len(),
        rows_after_price: free.len(),
        clean_time_seconds: clean_time,
        aggregate_time_seconds: aggregate_time,
    };

    Ok(MarketReport {
        top_shares: top_n(&genre_shares, config.top_n),
        top_popularity: top_n(&genre_popularity, config.top_n),
        genre_shares,
        genre_popularity,
        metadata,
    })
}

// ── Engagement analysis ───────────────────────────────────────────────────────

/// Column bindings for a post dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementColumns {
    /// Post title; drives cohort classification.
    pub title: usize,
    /// Comment count; the engagement measure.
    pub comments: usize,
    /// Creation timestamp; drives hour-of-day grouping.
    pub created_at: usize,
}

impl EngagementColumns {
    /// Resolve the bindings from a schema by field name.
    pub fn from_schema(
        schema: &Schema,
        title: &str,
        comments: &str,
        created_at: &str,
    ) -> Result<Self> {
        Ok(Self {
            title: schema.index(title)?,
            comments: schema.index(comments)?,
            created_at: schema.index(created_at)?,
        })
    }
}

/// Tunable parameters for the engagement pipeline.
#[derive(Debug)]
pub struct EngagementConfig {
    pub columns: EngagementColumns,
    pub classifier: PrefixClassifier,
    /// Cohort whose hourly engagement profile the report details.
    pub focus_label: String,
    /// Length of the ranked top-hours list.
    pub top_n: usize,
}

impl EngagementConfig {
    /// Defaults: ask/show cohorts, hourly profile of the "ask" cohort,
    /// top-6 hours.
    pub fn new(columns: EngagementColumns) -> Self {
        Self {
            columns,
            classifier: PrefixClassifier::ask_show(),
            focus_label: "ask".to_string(),
            top_n: 6,
        }
    }
}

/// Row counts and timings recorded alongside an engagement report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Rows in the input dataset.
    pub rows_in: usize,
    /// Rows matching no cohort prefix.
    pub unclassified_rows: usize,
    /// Wall-clock seconds spent partitioning.
    pub partition_time_seconds: f64,
    /// Wall-clock seconds spent aggregating.
    pub aggregate_time_seconds: f64,
}

/// The complete output of [`analyze_engagement`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementReport {
    /// Cohort label → row count.
    pub cohort_sizes: BTreeMap<String, usize>,
    /// Cohort label → mean comment count. Empty cohorts are omitted.
    pub average_comments: BTreeMap<String, f64>,
    /// Hour-of-day key (`"00"`–`"23"`) → mean comment count within the
    /// focus cohort.
    pub comments_by_hour: BTreeMap<String, f64>,
    /// The `top_n` hours by mean comment count, descending.
    pub top_hours: Vec<(String, f64)>,
    pub metadata: EngagementMetadata,
}

/// Run the post-engagement pipeline.
///
/// 1. Partition posts into cohorts by title prefix.
/// 2. Compute the mean comment count per cohort (empty cohorts are
///    skipped with a warning).
/// 3. For the focus cohort, average comment counts per posting hour.
/// 4. Rank the hours and keep the top `n`.
///
/// Fails when the input is empty, the focus cohort has no rows, a comment
/// count is malformed, or a timestamp in the focus cohort cannot be parsed.
pub fn analyze_engagement(
    dataset: &Dataset,
    config: &EngagementConfig,
) -> Result<EngagementReport> {
    if dataset.is_empty() {
        return Err(TabularError::EmptyDataset);
    }
    let columns = &config.columns;
    let identity = NumericNormalizer::identity();

    // ── Step 1: Partition ─────────────────────────────────────────────────────
    let partition_start = Instant::now();
    let partition = config.classifier.partition(dataset, columns.title);
    let partition_time = partition_start.elapsed().as_secs_f64();

    let cohort_sizes: BTreeMap<String, usize> = partition
        .cohorts
        .iter()
        .map(|(label, cohort)| (label.clone(), cohort.len()))
        .collect();

    // ── Step 2: Per-cohort averages ───────────────────────────────────────────
    let aggregate_start = Instant::now();
    let mut average_comments: BTreeMap<String, f64> = BTreeMap::new();
    for (label, cohort) in &partition.cohorts {
        if cohort.is_empty() {
            warn!("analyze_engagement: cohort \"{}\" has no rows", label);
            continue;
        }
        let mean = GroupedAverageBuilder::average(cohort, columns.comments, &identity)?;
        average_comments.insert(label.clone(), mean);
    }

    // ── Step 3: Hourly profile of the focus cohort ────────────────────────────
    let focus = partition
        .cohorts
        .get(&config.focus_label)
        .filter(|cohort| !cohort.is_empty())
        .ok_or_else(|| TabularError::EmptyGroup(config.focus_label.clone()))?;

    let comments_by_hour = GroupedAverageBuilder::grouped_average_by(
        focus,
        |_, row| {
            row.get(columns.created_at)
                .map(|ts| TimestampParser::hour_key(ts))
                .transpose()
        },
        columns.comments,
        &identity,
    )?;
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    debug!(
        "analyze_engagement: {} rows, focus cohort \"{}\" has {} rows over {} hours",
        dataset.len(),
        config.focus_label,
        focus.len(),
        comments_by_hour.len()
    );

    let metadata = EngagementMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_in: dataset.len(),
        unclassified_rows: partition.remainder.len(),
        partition_time_seconds: partition_time,
        aggregate_time_seconds: aggregate_time,
    };

    Ok(EngagementReport {
        cohort_sizes,
        average_comments,
        top_hours: top_n(&comments_by_hour, config.top_n),
        comments_by_hour,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn play_store_config() -> MarketConfig {
        let schema = Schema::from_header(["App", "Category", "Reviews", "Installs", "Price"]);
        let columns =
            MarketColumns::from_schema(&schema, "App", "Reviews", "Price", "Category", "Installs")
                .unwrap();
        let mut config = MarketConfig::new(columns);
        config.normalizer = NumericNormalizer::install_counts();
        config
    }

    fn listings() -> Dataset {
        dataset(&[
            &["Facebook", "SOCIAL", "100", "1,000,000+", "0"],
            &["Facebook", "SOCIAL", "80", "500,000+", "0"],
            &["爱奇艺PPS -《欢乐颂2》电视剧热播", "VIDEO", "50", "100,000+", "0"],
            &["Minecraft", "GAME", "500", "10,000+", "6.99"],
            &["Gmail", "TOOLS", "300", "1,000,000+", "0"],
        ])
    }

    fn posts_config() -> EngagementConfig {
        let schema = Schema::from_header(["id", "title", "num_comments", "created_at"]);
        let columns =
            EngagementColumns::from_schema(&schema, "title", "num_comments", "created_at").unwrap();
        EngagementConfig::new(columns)
    }

    fn posts() -> Dataset {
        dataset(&[
            &["1", "Ask HN: a", "6", "8/16/2016 9:55"],
            &["2", "Ask HN: b", "10", "8/16/2016 9:05"],
            &["3", "Ask HN: c", "2", "9/26/2016 17:30"],
            &["4", "Show HN: d", "4", "8/16/2016 9:00"],
            &["5", "Regular post", "100", "8/16/2016 9:00"],
        ])
    }

    // ── analyze_market ────────────────────────────────────────────────────────

    #[test]
    fn test_market_pipeline_cleans_then_aggregates() {
        let report = analyze_market(&listings(), &play_store_config()).unwrap();

        // Duplicate Facebook snapshot, the non-English listing and the paid
        // listing are all gone; SOCIAL and TOOLS split the survivors evenly.
        assert_eq!(report.metadata.rows_in, 5);
        assert_eq!(report.metadata.rows_after_dedup, 4);
        assert_eq!(report.metadata.rows_after_language, 3);
        assert_eq!(report.metadata.rows_after_price, 2);

        assert_eq!(report.genre_shares.len(), 2);
        assert!((report.genre_shares["SOCIAL"] - 50.0).abs() < 1e-9);
        assert!((report.genre_shares["TOOLS"] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_market_pipeline_keeps_max_review_snapshot() {
        let report = analyze_market(&listings(), &play_store_config()).unwrap();
        // The surviving Facebook row is the 1,000,000+ one, not 500,000+.
        assert_eq!(report.genre_popularity["SOCIAL"], 1_000_000.0);
        assert_eq!(report.genre_popularity["TOOLS"], 1_000_000.0);
    }

    #[test]
    fn test_market_pipeline_top_lists_ranked() {
        let report = analyze_market(&listings(), &play_store_config()).unwrap();
        assert_eq!(report.top_shares.len(), 2);
        // Equal shares tie-break alphabetically.
        assert_eq!(report.top_shares[0].0, "SOCIAL");
        assert_eq!(report.top_shares[1].0, "TOOLS");
    }

    #[test]
    fn test_market_pipeline_empty_after_cleaning_fails() {
        let paid_only = dataset(&[&["Minecraft", "GAME", "500", "10,000+", "6.99"]]);
        let err = analyze_market(&paid_only, &play_store_config()).unwrap_err();
        assert!(matches!(err, TabularError::EmptyDataset));
    }

    #[test]
    fn test_market_pipeline_malformed_reviews_fails() {
        let bad = dataset(&[&["App", "GAME", "3.0M", "100+", "0"]]);
        let err = analyze_market(&bad, &play_store_config()).unwrap_err();
        assert!(matches!(err, TabularError::FieldParse { .. }));
    }

    #[test]
    fn test_market_columns_unknown_field() {
        let schema = Schema::from_header(["App"]);
        let err =
            MarketColumns::from_schema(&schema, "App", "Reviews", "Price", "Category", "Installs")
                .unwrap_err();
        assert!(matches!(err, TabularError::UnknownField(name) if name == "Reviews"));
    }

    #[test]
    fn test_market_report_serializes() {
        let report = analyze_market(&listings(), &play_store_config()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["genre_shares"]["SOCIAL"].is_number());
        assert_eq!(json["metadata"]["rows_in"], 5);
    }

    // ── analyze_engagement ────────────────────────────────────────────────────

    #[test]
    fn test_engagement_cohort_sizes_and_averages() {
        let report = analyze_engagement(&posts(), &posts_config()).unwrap();

        assert_eq!(report.cohort_sizes["ask"], 3);
        assert_eq!(report.cohort_sizes["show"], 1);
        assert_eq!(report.metadata.unclassified_rows, 1);

        assert_eq!(report.average_comments["ask"], 6.0);
        assert_eq!(report.average_comments["show"], 4.0);
    }

    #[test]
    fn test_engagement_hourly_profile() {
        let report = analyze_engagement(&posts(), &posts_config()).unwrap();

        // Two ask posts at hour 09 averaging 8, one at 17 averaging 2; the
        // show and unclassified posts do not contribute.
        assert_eq!(report.comments_by_hour.len(), 2);
        assert_eq!(report.comments_by_hour["09"], 8.0);
        assert_eq!(report.comments_by_hour["17"], 2.0);

        assert_eq!(report.top_hours[0], ("09".to_string(), 8.0));
        assert_eq!(report.top_hours[1], ("17".to_string(), 2.0));
    }

    #[test]
    fn test_engagement_empty_input_fails() {
        let err = analyze_engagement(&Dataset::default(), &posts_config()).unwrap_err();
        assert!(matches!(err, TabularError::EmptyDataset));
    }

    #[test]
    fn test_engagement_missing_focus_cohort_fails() {
        let mut config = posts_config();
        config.focus_label = "poll".to_string();
        let err = analyze_engagement(&posts(), &config).unwrap_err();
        assert!(matches!(err, TabularError::EmptyGroup(label) if label == "poll"));
    }

    #[test]
    fn test_engagement_empty_focus_cohort_fails() {
        let config = posts_config();
        let show_only = dataset(&[&["1", "Show HN: only", "4", "8/16/2016 9:00"]]);
        let err = analyze_engagement(&show_only, &config).unwrap_err();
        assert!(matches!(err, TabularError::EmptyGroup(label) if label == "ask"));
    }

    #[test]
    fn test_engagement_bad_timestamp_in_focus_cohort_fails() {
        let config = posts_config();
        let bad = dataset(&[&["1", "Ask HN: when", "4", "last tuesday"]]);
        let err = analyze_engagement(&bad, &config).unwrap_err();
        assert!(matches!(err, TabularError::TimestampParse(_)));
    }

    #[test]
    fn test_engagement_bad_timestamp_outside_focus_cohort_ignored() {
        // The hourly profile only reads the focus cohort; a malformed
        // timestamp on an unclassified row must not abort the run.
        let config = posts_config();
        let input = dataset(&[
            &["1", "Ask HN: a", "6", "8/16/2016 9:55"],
            &["2", "Regular post", "9", "not a time"],
        ]);
        let report = analyze_engagement(&input, &config).unwrap();
        assert_eq!(report.comments_by_hour["09"], 6.0);
    }

    #[test]
    fn test_engagement_report_serializes() {
        let report = analyze_engagement(&posts(), &posts_config()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cohort_sizes"]["ask"], 3);
        assert!(json["top_hours"].is_array());
    }
}
