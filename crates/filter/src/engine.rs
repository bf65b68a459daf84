//! Filter compilation and execution.
//!
//! A [`Filter`] is a parsed and type-checked expression. Type checking runs
//! once, before any record is touched, so a malformed filter fails as a whole
//! instead of silently matching nothing.

use crate::parser::{CmpOp, Comparison, Expr, Literal, Operand, parse_filter};
use ledgerchat_core::{CellValue, Column, FilterError, Ledger, LedgerRecord};
use std::cmp::Ordering;
use tracing::debug;

/// A compiled filter, ready to run against a ledger.
#[derive(Debug, Clone)]
pub struct Filter {
    expression: String,
    root: Expr,
}

impl Filter {
    /// Parse and type-check a filter expression.
    pub fn compile(expression: &str) -> Result<Self, FilterError> {
        let root = parse_filter(expression)?;
        check_types(&root)?;
        Ok(Self {
            expression: expression.trim().to_string(),
            root,
        })
    }

    /// The expression this filter was compiled from (trimmed).
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Evaluate the filter against a single record.
    pub fn matches(&self, record: &LedgerRecord) -> bool {
        eval(&self.root, record)
    }

    /// All matching records, in table order.
    pub fn apply<'l>(&self, ledger: &'l Ledger) -> Vec<&'l LedgerRecord> {
        let matched: Vec<&LedgerRecord> = ledger
            .records()
            .iter()
            .filter(|record| self.matches(record))
            .collect();
        debug!(
            expression = %self.expression,
            scanned = ledger.len(),
            matched = matched.len(),
            "Filter applied"
        );
        matched
    }
}

/// Compile `expression` and run it against `ledger`.
pub fn execute<'l>(
    ledger: &'l Ledger,
    expression: &str,
) -> Result<Vec<&'l LedgerRecord>, FilterError> {
    Ok(Filter::compile(expression)?.apply(ledger))
}

// ─── Type checking ───────────────────────────────────────────────────

fn check_types(expr: &Expr) -> Result<(), FilterError> {
    match expr {
        Expr::And(a, b) | Expr::Or(a, b) => {
            check_types(a)?;
            check_types(b)
        }
        Expr::Not(inner) => check_types(inner),
        Expr::In { column, values, .. } => values
            .iter()
            .try_for_each(|value| check_literal(*column, CmpOp::Eq, value)),
        Expr::Comparison(Comparison { left, op, right }) => match (left, right) {
            (Operand::Column(a), Operand::Column(b)) => {
                if a.kind().is_numeric() == b.kind().is_numeric() {
                    Ok(())
                } else {
                    Err(FilterError::TypeMismatch(format!(
                        "cannot compare column '{a}' with column '{b}'"
                    )))
                }
            }
            (Operand::Column(column), Operand::Literal(lit)) => check_literal(*column, *op, lit),
            (Operand::Literal(lit), Operand::Column(column)) => {
                check_literal(*column, op.flipped(), lit)
            }
            (Operand::Literal(_), Operand::Literal(_)) => Err(FilterError::Syntax(
                "comparison must reference a column".into(),
            )),
        },
    }
}

fn check_literal(column: Column, op: CmpOp, lit: &Literal) -> Result<(), FilterError> {
    match (column.kind().is_numeric(), lit) {
        (true, Literal::Num(_)) | (false, Literal::Str(_)) => Ok(()),
        (true, Literal::Str(s)) => Err(FilterError::TypeMismatch(format!(
            "column '{column}' is numeric but is compared with the text \"{s}\""
        ))),
        (false, Literal::Num(n)) if op.is_ordering() => Err(FilterError::TypeMismatch(format!(
            "column '{column}' is text and cannot be compared with '{}' against the number {n}",
            op.symbol()
        ))),
        // Identifier columns (orden de compra, expediente) are often written
        // as bare numbers; equality is checked on the textual form.
        (false, Literal::Num(_)) => Ok(()),
    }
}

// ─── Evaluation ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Value<'a> {
    Num(f64),
    Text(&'a str),
    Null,
}

fn eval(expr: &Expr, record: &LedgerRecord) -> bool {
    match expr {
        Expr::And(a, b) => eval(a, record) && eval(b, record),
        Expr::Or(a, b) => eval(a, record) || eval(b, record),
        Expr::Not(inner) => !eval(inner, record),
        Expr::Comparison(Comparison { left, op, right }) => {
            compare(resolve(left, record), *op, resolve(right, record))
        }
        Expr::In {
            column,
            values,
            negated,
        } => {
            let cell = cell_value(record.get(*column));
            let found = values
                .iter()
                .any(|lit| compare(cell, CmpOp::Eq, literal_value(lit)));
            found != *negated
        }
    }
}

fn resolve<'a>(operand: &'a Operand, record: &'a LedgerRecord) -> Value<'a> {
    match operand {
        Operand::Column(column) => cell_value(record.get(*column)),
        Operand::Literal(lit) => literal_value(lit),
    }
}

fn cell_value(cell: CellValue<'_>) -> Value<'_> {
    match cell {
        CellValue::Integer(i) => Value::Num(i as f64),
        CellValue::Decimal(d) => Value::Num(d),
        CellValue::Text(s) => Value::Text(s),
        CellValue::Null => Value::Null,
    }
}

fn literal_value(lit: &Literal) -> Value<'_> {
    match lit {
        Literal::Num(n) => Value::Num(*n),
        Literal::Str(s) => Value::Text(s),
    }
}

/// Compare two values. Missing and NaN values are unordered: every operator
/// except `!=` yields false for them.
fn compare(left: Value<'_>, op: CmpOp, right: Value<'_>) -> bool {
    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Num(a), Value::Num(b)) => a.partial_cmp(&b),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Text(t), Value::Num(n)) | (Value::Num(n), Value::Text(t)) => {
            (t == number_text(n)).then_some(Ordering::Equal)
        }
    };

    match op {
        CmpOp::Eq => ordering == Some(Ordering::Equal),
        CmpOp::NotEq => ordering != Some(Ordering::Equal),
        CmpOp::Gt => ordering == Some(Ordering::Greater),
        CmpOp::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        CmpOp::Lt => ordering == Some(Ordering::Less),
        CmpOp::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
    }
}

/// Textual form of a numeric literal: `4512.0` reads as `4512`.
fn number_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
