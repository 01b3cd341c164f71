use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Degenerate region: crop at ({x}, {y}) collapsed to {width}x{height}")]
    DegenerateRegion {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
    },

    #[error("Invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("Classifier failed: {0}")]
    Classifier(String),
}

impl SegmentError {
    /// Short machine-readable code, used in JSON summaries.
    pub fn code(&self) -> &'static str {
        match self {
            SegmentError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            SegmentError::DegenerateRegion { .. } => "DEGENERATE_REGION",
            SegmentError::InvalidBuffer(_) => "INVALID_BUFFER",
            SegmentError::Classifier(_) => "CLASSIFIER_ERROR",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<&SegmentError> for ErrorResponse {
    fn from(err: &SegmentError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_carries_code() {
        let err = SegmentError::InvalidConfiguration("padding must be >= 0".to_string());
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, "INVALID_CONFIGURATION");
        assert!(response.error.contains("padding"));
    }
}
