//! Core types and value processors for the tabular pipeline.
//!
//! Defines the row/dataset/schema data model, the shared error type, and the
//! stateless processors (numeric normalization, English-name heuristic,
//! timestamp parsing) used by the transformation layer.

pub mod error;
pub mod heuristics;
pub mod models;
pub mod normalize;
pub mod time_utils;

pub use error::{Result, TabularError};
pub use heuristics::EnglishNameClassifier;
pub use models::{Dataset, Row, Schema};
pub use normalize::NumericNormalizer;
pub use time_utils::TimestampParser;
