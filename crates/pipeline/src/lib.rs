//! The LedgerChat question pipeline.
//!
//! 1. **Compose** the fixed system prompt ([`prompt`])
//! 2. **Translate** the question through the configured model ([`translator`])
//! 3. **Parse** the `Filtro:`/`Resumen:` reply ([`parse`])
//! 4. **Execute** the filter against the ledger (`ledgerchat-filter`)
//! 5. **Serialize** at most ten sanitized rows ([`serializer`])
//! 6. **Assemble** exactly one response ([`assembler`])

pub mod assembler;
pub mod parse;
pub mod prompt;
pub mod serializer;
pub mod translator;

#[cfg(test)]
mod testing;

pub use assembler::{QueryOutcome, QueryPipeline, QueryResponse};
pub use parse::{TranslationResult, parse_response};
pub use prompt::{FILTER_MARKER, SUMMARY_MARKER, system_prompt};
pub use serializer::{MISSING_PLACEHOLDER, Row, serialize_record, serialize_rows};
pub use translator::QueryTranslator;
