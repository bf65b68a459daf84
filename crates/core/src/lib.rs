//! # LedgerChat Core
//!
//! Domain types, traits, and error definitions for LedgerChat, a service
//! that answers natural-language questions about a municipal expense ledger.
//! This crate has **no framework dependencies**: it defines the ledger model,
//! the provider abstraction and the error taxonomy that all other crates
//! implement against.

pub mod error;
pub mod ledger;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{FilterError, ParseError, PipelineError, ProviderError};
pub use ledger::{CellValue, Column, ColumnKind, Ledger, LedgerRecord};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
