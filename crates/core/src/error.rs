//! Error types for the LedgerChat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each pipeline stage has its own error type so that every failure mode
//! can be told apart (and tested) independently.

use thiserror::Error;

/// Faults of the external model client.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Why a filter expression was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

/// The model reply broke the two-marker response contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("response has a 'Filtro:' marker but no 'Resumen:' marker")]
    MissingSummaryMarker { raw: String },
}

/// Terminal failures of a single query request.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("the question is empty")]
    EmptyMessage,

    #[error("model request failed: {0}")]
    TranslationFailure(#[source] ProviderError),

    #[error("model did not answer within {after_secs}s")]
    TranslationTimeout { after_secs: u64 },

    #[error("model reply is missing the 'Resumen:' marker")]
    MissingSummaryMarker { raw: String },

    #[error("invalid filter '{expression}': {source}")]
    InvalidFilter {
        expression: String,
        #[source]
        source: FilterError,
        raw: String,
    },
}

impl PipelineError {
    /// Stable machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::EmptyMessage => "empty_message",
            PipelineError::TranslationFailure(_) => "translation_failure",
            PipelineError::TranslationTimeout { .. } => "translation_timeout",
            PipelineError::MissingSummaryMarker { .. } => "missing_summary_marker",
            PipelineError::InvalidFilter { .. } => "invalid_filter",
        }
    }

    /// The raw model reply, when the failure happened after the model answered.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            PipelineError::MissingSummaryMarker { raw }
            | PipelineError::InvalidFilter { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl From<ParseError> for PipelineError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MissingSummaryMarker { raw } => PipelineError::MissingSummaryMarker { raw },
        }
    }
}
