//! Ledger filters: a small, closed boolean grammar over the seven ledger
//! columns.
//!
//! Filter expressions come from language-model output and are therefore
//! untrusted. They are never handed to a general-purpose evaluator: the
//! string is tokenized, parsed into a typed tree, type-checked against the
//! column schema, and only then evaluated record by record.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌──────────┐    ┌─────────────┐    ┌────────────┐
//! │ expression │───▶│  parser  │───▶│ type check  │───▶│  execute   │
//! │  (String)  │    │  (Expr)  │    │  (Filter)   │    │ (&Ledger)  │
//! └────────────┘    └──────────┘    └─────────────┘    └────────────┘
//!                        │                 │
//!                        └──── FilterError ┘
//! ```
//!
//! # Example
//!
//! ```
//! use ledgerchat_core::{Ledger, LedgerRecord};
//! use ledgerchat_filter::execute;
//!
//! let ledger = Ledger::new(vec![LedgerRecord {
//!     year: Some(2022),
//!     department: Some("Salud".into()),
//!     ..LedgerRecord::default()
//! }]);
//! let rows = execute(&ledger, r#"año == 2022 and dependencia == "Salud""#).unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

mod engine;
mod parser;

pub use engine::{Filter, execute};
pub use parser::{CmpOp, Comparison, Expr, Literal, MAX_EXPRESSION_LEN, Operand, parse_filter};
