//! Per-request state machine from question to response payload.
//!
//! ```text
//! start ─▶ translate ─┬─ fault ───────────────────────────▶ Error
//!                     └─ reply ─▶ parse ─┬─ no marker ────▶ SuccessPlain
//!                                        ├─ bad markers ──▶ Error
//!                                        └─ filter ─▶ execute ─┬─ fault ─▶ Error
//!                                                              └─ rows ──▶ Success
//! ```

use crate::parse::{TranslationResult, parse_response};
use crate::serializer::{Row, serialize_rows};
use crate::translator::QueryTranslator;
use ledgerchat_config::{AppConfig, MAX_RESULTS_CAP};
use ledgerchat_core::{FilterError, Ledger, PipelineError, Provider};
use ledgerchat_filter::Filter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Prefix of every user-facing error message.
const ERROR_PREFIX: &str = "Ocurrió un error al procesar la solicitud";

/// The terminal state reached by one request.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The model produced a filter and it ran.
    Success {
        summary: String,
        filter: String,
        rows: Vec<Row>,
    },
    /// The model answered in plain text.
    SuccessPlain { message: String },
    Error(PipelineError),
}

impl QueryOutcome {
    pub fn state(&self) -> &'static str {
        match self {
            QueryOutcome::Success { .. } => "success",
            QueryOutcome::SuccessPlain { .. } => "success_plain",
            QueryOutcome::Error(_) => "error",
        }
    }

    /// Map the terminal state to its wire shape.
    pub fn into_response(self) -> QueryResponse {
        match self {
            QueryOutcome::Success {
                summary,
                filter,
                rows,
            } => QueryResponse::Answer {
                message: summary,
                results: rows,
                filter: Some(filter),
            },
            QueryOutcome::SuccessPlain { message } => QueryResponse::Answer {
                message,
                results: Vec::new(),
                filter: None,
            },
            QueryOutcome::Error(err) => QueryResponse::Error {
                error: format!("{ERROR_PREFIX}: {err}"),
                raw_response: err.raw_response().map(str::to_string),
            },
        }
    }
}

/// The JSON body returned for a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Answer {
        message: String,
        results: Vec<Row>,
        filter: Option<String>,
    },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw_response: Option<String>,
    },
}

impl QueryResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, QueryResponse::Error { .. })
    }
}

/// Answers questions against one immutable ledger.
///
/// Holds no per-request state, so a single pipeline can serve any number of
/// concurrent requests.
pub struct QueryPipeline {
    translator: QueryTranslator,
    ledger: Arc<Ledger>,
    max_results: usize,
}

impl QueryPipeline {
    pub fn new(translator: QueryTranslator, ledger: Arc<Ledger>) -> Self {
        Self {
            translator,
            ledger,
            max_results: MAX_RESULTS_CAP,
        }
    }

    /// Build a pipeline with the sampling, timeout and result settings of
    /// `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        ledger: Arc<Ledger>,
        config: &AppConfig,
    ) -> Self {
        let mut translator =
            QueryTranslator::new(provider, model).with_temperature(config.temperature);
        if let Some(max) = config.max_tokens {
            translator = translator.with_max_tokens(max);
        }
        if let Some(secs) = config.query.timeout_secs {
            translator = translator.with_timeout(Duration::from_secs(secs));
        }
        Self::new(translator, ledger).with_max_results(config.query.max_results)
    }

    /// Records returned per answer, clamped to `1..=MAX_RESULTS_CAP`.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max.clamp(1, MAX_RESULTS_CAP);
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn translator(&self) -> &QueryTranslator {
        &self.translator
    }

    /// Answer one question. Always yields exactly one response.
    pub async fn answer(&self, message: &str) -> QueryResponse {
        self.run(message).await.into_response()
    }

    /// Drive one question to its terminal state.
    pub async fn run(&self, message: &str) -> QueryOutcome {
        info!(chars = message.chars().count(), "Question received");

        let outcome = match self.translator.translate(message).await {
            Err(err) => QueryOutcome::Error(err),
            Ok(raw) => self.interpret(raw),
        };

        match &outcome {
            QueryOutcome::Error(err) => warn!(kind = err.kind(), error = %err, "Question failed"),
            other => info!(state = other.state(), "Question answered"),
        }
        outcome
    }

    fn interpret(&self, raw: String) -> QueryOutcome {
        let TranslationResult { filter, summary } = match parse_response(&raw) {
            Ok(parsed) => parsed,
            Err(err) => return QueryOutcome::Error(err.into()),
        };

        let Some(expression) = filter else {
            return QueryOutcome::SuccessPlain { message: summary };
        };
        info!(filter = %expression, "Filter generated");

        match self.run_filter(&expression) {
            Ok(rows) => QueryOutcome::Success {
                summary,
                filter: expression,
                rows,
            },
            Err(source) => QueryOutcome::Error(PipelineError::InvalidFilter {
                expression,
                source,
                raw,
            }),
        }
    }

    /// Run a filter expression directly, bypassing the model.
    pub fn run_filter(&self, expression: &str) -> Result<Vec<Row>, FilterError> {
        let filter = Filter::compile(expression)?;
        let matched = filter.apply(&self.ledger);
        info!(matched = matched.len(), returned = matched.len().min(self.max_results), "Filter executed");
        Ok(serialize_rows(&matched, self.max_results))
    }
}
