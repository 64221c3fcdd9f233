//! Error handling for the resume ranker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeRankerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Reference document unreadable: {0}")]
    ReferenceUnreadable(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

pub type Result<T> = std::result::Result<T, ResumeRankerError>;

/// Failure kinds of a single extraction strategy.
///
/// These never escape the extraction coordinator; they are logged and turned
/// into an empty result instead.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("file access error: {0}")]
    FileAccess(#[from] std::io::Error),

    #[error("malformed {format} document: {reason}")]
    FormatParse { format: &'static str, reason: String },

    #[error("OCR engine unavailable: {0}")]
    OcrEngineUnavailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("insufficient text: {chars} characters, need at least {required}")]
    InsufficientText { chars: usize, required: usize },
}

impl ExtractionError {
    pub fn parse(format: &'static str, reason: impl ToString) -> Self {
        ExtractionError::FormatParse {
            format,
            reason: reason.to_string(),
        }
    }
}

/// model2vec reports failures through anyhow
impl From<anyhow::Error> for ResumeRankerError {
    fn from(err: anyhow::Error) -> Self {
        ResumeRankerError::ModelLoading(err.to_string())
    }
}

/// Convert candle core errors to our custom error type
impl From<candle_core::Error> for ResumeRankerError {
    fn from(err: candle_core::Error) -> Self {
        ResumeRankerError::ModelError(err.to_string())
    }
}
