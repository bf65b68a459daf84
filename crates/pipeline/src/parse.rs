use crate::prompt::{FILTER_MARKER, SUMMARY_MARKER};
use ledgerchat_core::ParseError;
use serde::Serialize;

/// What the model asked for: an optional filter and the text to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationResult {
    pub filter: Option<String>,
    pub summary: String,
}

/// Split a raw model reply into filter and summary.
///
/// Only the first `Filtro:` and the first `Resumen:` after it are honored;
/// the summary may restate marker-like text freely. A reply with no filter
/// marker is a plain answer and comes back as the trimmed text.
pub fn parse_response(raw: &str) -> Result<TranslationResult, ParseError> {
    let Some((_, remainder)) = raw.split_once(FILTER_MARKER) else {
        return Ok(TranslationResult {
            filter: None,
            summary: raw.trim().to_string(),
        });
    };

    let (filter, summary) =
        remainder
            .split_once(SUMMARY_MARKER)
            .ok_or_else(|| ParseError::MissingSummaryMarker {
                raw: raw.to_string(),
            })?;

    Ok(TranslationResult {
        filter: Some(filter.trim().to_string()),
        summary: summary.trim().to_string(),
    })
}
