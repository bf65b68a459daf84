//! Shapes matched records into JSON-safe rows.
//!
//! Two passes per cell, in this order: `±inf` becomes null, then every null
//! or NaN becomes the placeholder. No serialized cell is ever a non-finite
//! number.

use ledgerchat_core::{CellValue, Column, LedgerRecord};
use serde_json::{Map, Number, Value};

/// Text shown in place of missing or unrepresentable values.
pub const MISSING_PLACEHOLDER: &str = "N/A";

/// One serialized record, keyed by column name in declared column order.
pub type Row = Map<String, Value>;

/// Serialize the first `cap` records, in the order given.
pub fn serialize_rows(records: &[&LedgerRecord], cap: usize) -> Vec<Row> {
    records
        .iter()
        .take(cap)
        .map(|record| serialize_record(record))
        .collect()
}

pub fn serialize_record(record: &LedgerRecord) -> Row {
    Column::ALL
        .iter()
        .map(|&column| {
            let value = fill_missing(cell_value(record.get(column)));
            (column.name().to_string(), value)
        })
        .collect()
}

fn cell_value(cell: CellValue<'_>) -> Value {
    match cell {
        CellValue::Integer(n) => Value::from(n),
        CellValue::Decimal(n) if n.is_infinite() => Value::Null,
        // NaN has no JSON number; from_f64 yields None for it.
        CellValue::Decimal(n) => Number::from_f64(n).map_or(Value::Null, Value::Number),
        CellValue::Text(s) => Value::from(s),
        CellValue::Null => Value::Null,
    }
}

fn fill_missing(value: Value) -> Value {
    match value {
        Value::Null => Value::from(MISSING_PLACEHOLDER),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{record, sample_ledger};

    #[test]
    fn caps_at_limit_preserving_order() {
        let ledger = sample_ledger();
        let all: Vec<&LedgerRecord> = ledger.records().iter().collect();
        let rows = serialize_rows(&all, 10);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0]["orden de compra"], "S0");
        assert_eq!(rows[1]["orden de compra"], "C0");
        assert_eq!(rows[9]["orden de compra"], "S3");
    }

    #[test]
    fn fewer_records_than_cap() {
        let a = record(2020, "A", 1.0, "P", "D");
        let rows = serialize_rows(&[&a], 10);
        assert_eq!(rows.len(), 1);
        assert!(serialize_rows(&[], 10).is_empty());
    }

    #[test]
    fn keys_follow_declared_column_order() {
        let a = record(2022, "OC-1", 1500.5, "Farmacia Sur", "Salud");
        let row = serialize_record(&a);
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "año",
                "orden de compra",
                "fecha",
                "importe",
                "proveedor",
                "dependencia",
                "expediente"
            ]
        );
        assert_eq!(row["año"], serde_json::json!(2022));
        assert_eq!(row["importe"], serde_json::json!(1500.5));
        assert_eq!(row["dependencia"], "Salud");
    }

    #[test]
    fn non_finite_and_missing_values_become_placeholder() {
        let ledger = sample_ledger();
        let tail: Vec<&LedgerRecord> = ledger.records().iter().rev().take(4).collect();
        let rows = serialize_rows(&tail, 10);
        for row in &rows {
            assert_eq!(row["importe"], MISSING_PLACEHOLDER);
        }
        // The last record has only year, order and department.
        assert_eq!(rows[0]["proveedor"], MISSING_PLACEHOLDER);
        assert_eq!(rows[0]["expediente"], MISSING_PLACEHOLDER);
        assert_eq!(rows[0]["año"], serde_json::json!(2023));
    }

    #[test]
    fn serialized_output_never_contains_non_finite_numbers() {
        let ledger = sample_ledger();
        let all: Vec<&LedgerRecord> = ledger.records().iter().collect();
        let rows = serialize_rows(&all, usize::MAX);
        for row in rows {
            for value in row.values() {
                if let Some(n) = value.as_f64() {
                    assert!(n.is_finite());
                }
            }
        }
    }
}
