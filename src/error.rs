//! Error types for chart-trend operations.

use thiserror::Error;

/// Result type alias for chart-trend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting, scoring, or reporting trends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Image bytes could not be read or decoded into a pixel matrix.
    #[error("Image decode failed: {source_id}: {reason}")]
    ImageDecode {
        /// Identifier of the offending image (usually its absolute path).
        source_id: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error while discovering cases in a dataset directory.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Error writing report files.
    #[error("Report error: {0}")]
    Report(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_decode_message_carries_source() {
        let err = Error::ImageDecode {
            source_id: "/data/case_01/sub_a.png".to_string(),
            reason: "unexpected end of file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/case_01/sub_a.png"));
        assert!(msg.contains("unexpected end of file"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "gone");
    }
}
