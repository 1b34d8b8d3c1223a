//! Error kinds for the reply pipeline.
//!
//! Only [`ConfigError`] is fatal, and only at startup. Detection and
//! service errors are recovered at their component boundary; they are
//! still returned as values by the `try_*` entry points so callers (and
//! tests) can tell them apart.

use std::time::Duration;
use thiserror::Error;

/// Startup configuration problem. Halts the process before any UI is shown.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    MissingVar(&'static str),

    #[error("invalid value for {var} ({value:?}): {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid language table: {0}")]
    LanguageTable(String),
}

/// Language identification did not produce a supported language.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("no language signal in input")]
    NoSignal,

    #[error("detected {detected} with confidence {confidence:.2}, below {threshold:.2}")]
    LowConfidence {
        detected: String,
        confidence: f64,
        threshold: f64,
    },

    #[error("detected language {detected} is not supported")]
    Unsupported { detected: String },
}

/// Failure talking to the generative text service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("service returned an empty reply")]
    EmptyReply,
}

impl ServiceError {
    /// 429, 5xx, timeouts and transport failures are transient.
    /// Other 4xx responses and unparseable bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Transport(_) | ServiceError::Timeout(_) => true,
            ServiceError::Status { status, .. } => *status == 429 || *status >= 500,
            ServiceError::Malformed(_) | ServiceError::EmptyReply => false,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Malformed(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// Failure inside an emotion classifier backend.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("model load error: {0}")]
    Load(String),
}

/// Emotion extraction could not produce a profile.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("k must be between 1 and {vocabulary} (got {k})")]
    InvalidK { k: usize, vocabulary: usize },

    #[error("classifier returned {got} scores for {expected} labels")]
    ScoreCount { expected: usize, got: usize },

    #[error("classifier returned a non-finite score for {label}")]
    NonFinite { label: String },

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// A submission that could not be turned into a recorded turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("emotion extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("analysis task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
