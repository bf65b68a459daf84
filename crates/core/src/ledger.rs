//! The expense ledger: a fixed seven-column table.
//!
//! The ledger is built once at startup (see `ledgerchat-ledger`) and then
//! shared read-only between requests. [`Ledger`] exposes no mutating
//! methods after construction.

/// One of the seven declared ledger columns.
///
/// Declaration order is the order used for serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Year,
    PurchaseOrder,
    Date,
    Amount,
    Provider,
    Department,
    FileReference,
}

/// The value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Decimal,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Decimal)
    }
}

impl Column {
    /// All columns in declaration order.
    pub const ALL: [Column; 7] = [
        Column::Year,
        Column::PurchaseOrder,
        Column::Date,
        Column::Amount,
        Column::Provider,
        Column::Department,
        Column::FileReference,
    ];

    /// The column name as it appears in the source tables, the prompt,
    /// filter expressions and serialized results.
    pub fn name(self) -> &'static str {
        match self {
            Column::Year => "año",
            Column::PurchaseOrder => "orden de compra",
            Column::Date => "fecha",
            Column::Amount => "importe",
            Column::Provider => "proveedor",
            Column::Department => "dependencia",
            Column::FileReference => "expediente",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Year => ColumnKind::Integer,
            Column::Amount => ColumnKind::Decimal,
            _ => ColumnKind::Text,
        }
    }

    /// Resolve a column reference.
    ///
    /// Matching is case-insensitive and treats `_` as a space, so
    /// `orden_de_compra` and `Orden de compra` both resolve. A few ASCII
    /// spellings of `año` are accepted because models often avoid the `ñ`.
    pub fn from_name(name: &str) -> Option<Column> {
        let normalized = name.trim().to_lowercase().replace('_', " ");
        let column = match normalized.as_str() {
            "año" | "anio" | "ano" | "year" => Column::Year,
            "orden de compra" | "orden compra" | "purchase order" => Column::PurchaseOrder,
            "fecha" | "date" => Column::Date,
            "importe" | "amount" => Column::Amount,
            "proveedor" | "provider" => Column::Provider,
            "dependencia" | "department" => Column::Department,
            "expediente" | "file reference" => Column::FileReference,
            _ => return None,
        };
        Some(column)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A borrowed view of a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Integer(i64),
    Decimal(f64),
    Text(&'a str),
    Null,
}

impl CellValue<'_> {
    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }
}

/// A single ledger row. Any field may be missing in the source data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerRecord {
    pub year: Option<i64>,
    pub purchase_order: Option<String>,
    pub date: Option<String>,
    pub amount: Option<f64>,
    pub provider: Option<String>,
    pub department: Option<String>,
    pub file_reference: Option<String>,
}

impl LedgerRecord {
    /// Read one cell by column.
    pub fn get(&self, column: Column) -> CellValue<'_> {
        fn text(v: &Option<String>) -> CellValue<'_> {
            v.as_deref().map_or(CellValue::Null, CellValue::Text)
        }
        match column {
            Column::Year => self.year.map_or(CellValue::Null, CellValue::Integer),
            Column::PurchaseOrder => text(&self.purchase_order),
            Column::Date => text(&self.date),
            Column::Amount => self.amount.map_or(CellValue::Null, CellValue::Decimal),
            Column::Provider => text(&self.provider),
            Column::Department => text(&self.department),
            Column::FileReference => text(&self.file_reference),
        }
    }
}

/// The ordered, immutable expense table.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<LedgerRecord>,
}

impl Ledger {
    pub fn new(records: Vec<LedgerRecord>) -> Self {
        Self { records }
    }

    /// Records in table order (source-file order, then in-file order).
    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present in the ledger, ascending.
    pub fn years(&self) -> Vec<i64> {
        let mut years: Vec<i64> = self.records.iter().filter_map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

impl FromIterator<LedgerRecord> for Ledger {
    fn from_iter<I: IntoIterator<Item = LedgerRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
