//! Ledger loading for LedgerChat.
//!
//! The expense data ships as one CSV extract per year. At startup every
//! `*.csv` file in the data directory is read and concatenated into a single
//! [`Ledger`](ledgerchat_core::Ledger): source-file order (by file name),
//! then in-file order. The result is never modified afterwards.
//!
//! ```text
//! csvs/
//! ├── gastos_2008.csv   ─┐
//! ├── gastos_2009.csv    ├──▶ Ledger (ordered, read-only)
//! └── gastos_2023.csv   ─┘
//! ```

mod loader;

pub use loader::{load_dir, read_records};

use std::path::PathBuf;

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Errors from loading the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("cannot read ledger data at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no .csv files found in {0}")]
    NoSources(PathBuf),

    #[error("{source_name}: missing column '{column}'")]
    MissingColumn { source_name: String, column: String },

    #[error("CSV error in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },
}
