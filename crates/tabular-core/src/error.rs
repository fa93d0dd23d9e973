use thiserror::Error;

/// All errors produced by the tabular pipeline.
#[derive(Error, Debug)]
pub enum TabularError {
    /// A field expected to be numeric could not be parsed, even after
    /// normalization. Identifies the offending row and field.
    #[error("Field {field_index} of row {row_index} is not numeric: \"{value}\"")]
    FieldParse {
        row_index: usize,
        field_index: usize,
        value: String,
    },

    /// An aggregation was requested over a dataset with zero rows.
    #[error("Cannot aggregate over an empty dataset")]
    EmptyDataset,

    /// An average was requested for a group with no matching rows.
    #[error("No rows in group \"{0}\"")]
    EmptyGroup(String),

    /// A field name is not part of the schema.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A timestamp string did not match any recognised format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the tabular crates.
pub type Result<T> = std::result::Result<T, TabularError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_field_parse() {
        let err = TabularError::FieldParse {
            row_index: 7,
            field_index: 3,
            value: "3.0M".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 7"));
        assert!(msg.contains("Field 3"));
        assert!(msg.contains("3.0M"));
    }

    #[test]
    fn test_error_display_empty_dataset() {
        let err = TabularError::EmptyDataset;
        assert_eq!(err.to_string(), "Cannot aggregate over an empty dataset");
    }

    #[test]
    fn test_error_display_empty_group() {
        let err = TabularError::EmptyGroup("Navigation".to_string());
        assert_eq!(err.to_string(), "No rows in group \"Navigation\"");
    }

    #[test]
    fn test_error_display_unknown_field() {
        let err = TabularError::UnknownField("installs".to_string());
        assert_eq!(err.to_string(), "Unknown field: installs");
    }

    #[test]
    fn test_error_display_timestamp_parse() {
        let err = TabularError::TimestampParse("not-a-time".to_string());
        assert_eq!(err.to_string(), "Invalid timestamp format: not-a-time");
    }

    #[test]
    fn test_error_display_config() {
        let err = TabularError::Config("empty prefix list".to_string());
        assert_eq!(err.to_string(), "Configuration error: empty prefix list");
    }

    #[test]
    fn test_error_from_anyhow() {
        let err: TabularError = anyhow::anyhow!("downstream failure").into();
        assert!(err.to_string().contains("downstream failure"));
    }
}
