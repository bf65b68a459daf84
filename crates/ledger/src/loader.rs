use crate::{LedgerError, LedgerResult};
use csv::{ReaderBuilder, StringRecord, Trim};
use ledgerchat_core::{Column, Ledger, LedgerRecord};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Load every `*.csv` file in `dir` into one ledger.
///
/// Files are read in file-name order so that the resulting table order is
/// reproducible across platforms.
pub fn load_dir(dir: &Path) -> LedgerResult<Ledger> {
    let entries = std::fs::read_dir(dir).map_err(|source| LedgerError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();

    if files.is_empty() {
        return Err(LedgerError::NoSources(dir.to_path_buf()));
    }
    files.sort();

    let mut records = Vec::new();
    for path in &files {
        let file = std::fs::File::open(path).map_err(|source| LedgerError::Io {
            path: path.clone(),
            source,
        })?;
        let name = path.display().to_string();
        let before = records.len();
        records.extend(read_records(file, &name)?);
        debug!(file = %name, rows = records.len() - before, "Loaded ledger extract");
    }

    info!(files = files.len(), rows = records.len(), "Ledger loaded");
    Ok(Ledger::new(records))
}

/// Read the records of one CSV extract.
///
/// Headers are matched to the seven ledger columns by name (case-insensitive,
/// extra columns ignored). Empty cells become missing values. A cell that
/// cannot be read as a number in a numeric column is logged and treated as
/// missing, so one malformed row never prevents the service from starting.
pub fn read_records<R: Read>(reader: R, source_name: &str) -> LedgerResult<Vec<LedgerRecord>> {
    let csv_err = |source| LedgerError::Csv {
        source_name: source_name.to_string(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let layout = ColumnLayout::from_headers(&headers, source_name)?;

    let mut records = Vec::new();
    for (index, row) in rdr.records().enumerate() {
        let row = row.map_err(csv_err)?;
        // +2: one for the header line, one for 1-based numbering.
        records.push(layout.record(&row, source_name, index + 2));
    }
    Ok(records)
}

/// Position of each declared column in a file's header row.
struct ColumnLayout {
    positions: [usize; 7],
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord, source_name: &str) -> LedgerResult<Self> {
        let mut positions = [usize::MAX; 7];
        for (pos, header) in headers.iter().enumerate() {
            let header = header.trim_start_matches('\u{feff}');
            if let Some(column) = Column::from_name(header) {
                let slot = &mut positions[column_index(column)];
                if *slot == usize::MAX {
                    *slot = pos;
                }
            }
        }

        for column in Column::ALL {
            if positions[column_index(column)] == usize::MAX {
                return Err(LedgerError::MissingColumn {
                    source_name: source_name.to_string(),
                    column: column.name().to_string(),
                });
            }
        }
        Ok(Self { positions })
    }

    fn cell<'r>(&self, row: &'r StringRecord, column: Column) -> Option<&'r str> {
        row.get(self.positions[column_index(column)])
            .filter(|s| !s.is_empty())
    }

    fn record(&self, row: &StringRecord, source_name: &str, line: usize) -> LedgerRecord {
        let text = |column| self.cell(row, column).map(str::to_string);
        let number = |column: Column| {
            let raw = self.cell(row, column)?;
            let parsed = parse_number(raw);
            if parsed.is_none() {
                warn!(
                    file = %source_name,
                    line,
                    column = column.name(),
                    value = %raw,
                    "Unreadable numeric cell, treating as missing"
                );
            }
            parsed
        };

        LedgerRecord {
            year: number(Column::Year).and_then(to_year),
            purchase_order: text(Column::PurchaseOrder),
            date: text(Column::Date),
            amount: number(Column::Amount),
            provider: text(Column::Provider),
            department: text(Column::Department),
            file_reference: text(Column::FileReference),
        }
    }
}

fn column_index(column: Column) -> usize {
    column as usize
}

/// Parse a numeric cell.
///
/// Accepts plain decimals (`1234.56`), non-finite markers (`inf`, `-inf`,
/// `nan`), and the local format with `.` thousands and `,` decimals
/// (`1.234,56`).
fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim().trim_start_matches('$').trim();
    if let Ok(n) = raw.parse::<f64>() {
        return Some(n);
    }
    if raw.contains(',') {
        let normalized = raw.replace('.', "").replace(',', ".");
        return normalized.parse::<f64>().ok();
    }
    None
}

/// Years may be exported as `2022.0`.
fn to_year(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0).then_some(n as i64)
}
