//! Filter expression tokenizer and parser.
//!
//! Accepts the pandas-style conditions the model is asked to produce:
//!
//! ```text
//! año == 2022 and dependencia == "Salud"
//! importe > 100000 or (proveedor != 'ACME' and año >= 2020)
//! `orden de compra` == "4512"
//! dependencia in ["Salud", "Cultura"]
//! not (año < 2015)
//! ```
//!
//! Grammar (informal):
//! ```text
//! expr       = and_expr (("or" | "||" | "|") and_expr)*
//! and_expr   = unary (("and" | "&&" | "&") unary)*
//! unary      = ("not" | "~" | "!") unary | primary
//! primary    = "(" expr ")" | comparison
//! comparison = operand CMP operand
//!            | column ["not"] "in" "[" literal ("," literal)* "]"
//! operand    = column | literal
//! column     = IDENT+ | `backtick quoted`
//! literal    = QUOTED_STRING | NUMBER
//! NUMBER     = ["-"] DIGITS ["." DIGITS] [("e" | "E") ["+" | "-"] DIGITS]
//! CMP        = "==" | "=" | "!=" | ">" | ">=" | "<" | "<="
//! ```
//!
//! Identifiers must name one of the seven ledger columns; anything else is
//! rejected here, before evaluation.

use ledgerchat_core::{Column, FilterError};
use std::iter::Peekable;
use std::str::Chars;

/// Longest expression accepted, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 4096;

/// Deepest accepted nesting of parentheses and negations.
const MAX_DEPTH: usize = 32;

/// A parsed filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A single comparison.
    Comparison(Comparison),
    /// Column membership in a literal list.
    In {
        column: Column,
        values: Vec<Literal>,
        negated: bool,
    },
    /// Logical AND of two sub-expressions.
    And(Box<Expr>, Box<Expr>),
    /// Logical OR of two sub-expressions.
    Or(Box<Expr>, Box<Expr>),
    /// Negation.
    Not(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: Operand,
    pub op: CmpOp,
    pub right: Operand,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(Column),
    Literal(Literal),
}

/// A literal value in a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(f64),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    /// Whether the operator orders its operands (as opposed to testing equality).
    pub fn is_ordering(self) -> bool {
        matches!(self, CmpOp::Gt | CmpOp::Gte | CmpOp::Lt | CmpOp::Lte)
    }

    /// The operator with its operands swapped: `a < b` ⇔ `b > a`.
    pub fn flipped(self) -> CmpOp {
        match self {
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Gte => CmpOp::Lte,
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Lte => CmpOp::Gte,
            other => other,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
        }
    }
}

// ─── Parser ──────────────────────────────────────────────────────────

/// Parse a filter expression string into an [`Expr`] tree.
pub fn parse_filter(input: &str) -> Result<Expr, FilterError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FilterError::Syntax("empty filter expression".into()));
    }
    if input.len() > MAX_EXPRESSION_LEN {
        return Err(FilterError::Syntax(format!(
            "expression longer than {MAX_EXPRESSION_LEN} bytes"
        )));
    }
    let tokens = tokenize(input)?;
    let (expr, rest) = parse_or(&tokens, 0)?;
    if !rest.is_empty() {
        return Err(FilterError::Syntax(format!(
            "unexpected tokens after expression: {}",
            describe(rest)
        )));
    }
    Ok(expr)
}

/// Token types for the filter grammar.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Quoted(String),
    Str(String),
    Num(f64),
    And,
    Or,
    Not,
    In,
    Eq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, FilterError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            _ if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '"' | '\'' | '`' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => {
                            if let Some(escaped) = chars.next() {
                                s.push(escaped);
                            }
                        }
                        Some(ch) if ch == quote => break,
                        Some(ch) => s.push(ch),
                        None => return Err(FilterError::Syntax("unterminated quoted text".into())),
                    }
                }
                tokens.push(if quote == '`' {
                    Token::Quoted(s)
                } else {
                    Token::Str(s)
                });
            }
            '>' | '<' => {
                chars.next();
                let or_equal = chars.next_if_eq(&'=').is_some();
                tokens.push(match (c, or_equal) {
                    ('>', true) => Token::Gte,
                    ('>', false) => Token::Gt,
                    (_, true) => Token::Lte,
                    (_, false) => Token::Lt,
                });
            }
            '=' => {
                chars.next();
                chars.next_if_eq(&'=');
                tokens.push(Token::Eq);
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::NotEq);
                } else {
                    tokens.push(Token::Not);
                }
            }
            '~' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '&' | '|' => {
                chars.next();
                chars.next_if_eq(&c);
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            _ if c.is_ascii_digit() || c == '-' || c == '.' => {
                let mut num_str = String::new();
                num_str.push(c);
                chars.next();
                while let Some(nc) = chars.next_if(|nc| nc.is_ascii_digit() || *nc == '.' || *nc == '_') {
                    if nc != '_' {
                        num_str.push(nc);
                    }
                }
                if let Some(exponent) = exponent_part(&chars) {
                    for _ in 0..exponent.len() {
                        chars.next();
                    }
                    num_str.push_str(&exponent);
                }
                match num_str.parse::<f64>() {
                    Ok(n) => tokens.push(Token::Num(n)),
                    Err(_) => {
                        return Err(FilterError::Syntax(format!("invalid number: {num_str}")));
                    }
                }
            }
            _ if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(wc) = chars.next_if(|wc| wc.is_alphanumeric() || *wc == '_') {
                    word.push(wc);
                }
                let token = match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "in" => Token::In,
                    _ => Token::Ident(word),
                };
                tokens.push(token);
            }
            _ => return Err(FilterError::Syntax(format!("unexpected character: {c}"))),
        }
    }

    Ok(tokens)
}

type Parsed<'t, T> = Result<(T, &'t [Token]), FilterError>;

fn check_depth(depth: usize) -> Result<(), FilterError> {
    if depth > MAX_DEPTH {
        return Err(FilterError::Syntax(format!(
            "expression nested deeper than {MAX_DEPTH} levels"
        )));
    }
    Ok(())
}

fn parse_or(tokens: &[Token], depth: usize) -> Parsed<'_, Expr> {
    let (mut left, mut rest) = parse_and(tokens, depth)?;
    while rest.first() == Some(&Token::Or) {
        let (right, remaining) = parse_and(&rest[1..], depth)?;
        left = Expr::Or(Box::new(left), Box::new(right));
        rest = remaining;
    }
    Ok((left, rest))
}

fn parse_and(tokens: &[Token], depth: usize) -> Parsed<'_, Expr> {
    let (mut left, mut rest) = parse_unary(tokens, depth)?;
    while rest.first() == Some(&Token::And) {
        let (right, remaining) = parse_unary(&rest[1..], depth)?;
        left = Expr::And(Box::new(left), Box::new(right));
        rest = remaining;
    }
    Ok((left, rest))
}

fn parse_unary(tokens: &[Token], depth: usize) -> Parsed<'_, Expr> {
    if tokens.first() == Some(&Token::Not) {
        check_depth(depth + 1)?;
        let (inner, rest) = parse_unary(&tokens[1..], depth + 1)?;
        return Ok((Expr::Not(Box::new(inner)), rest));
    }
    parse_primary(tokens, depth)
}

fn parse_primary(tokens: &[Token], depth: usize) -> Parsed<'_, Expr> {
    if tokens.first() == Some(&Token::LParen) {
        check_depth(depth + 1)?;
        let (inner, rest) = parse_or(&tokens[1..], depth + 1)?;
        if rest.first() != Some(&Token::RParen) {
            return Err(FilterError::Syntax("expected closing parenthesis".into()));
        }
        return Ok((inner, &rest[1..]));
    }
    parse_comparison(tokens)
}

fn parse_comparison(tokens: &[Token]) -> Parsed<'_, Expr> {
    let (left, rest) = parse_operand(tokens)?;

    // column [not] in [ ... ]
    let (negated, after_not) = match rest {
        [Token::Not, Token::In, ..] => (true, &rest[1..]),
        _ => (false, rest),
    };
    if after_not.first() == Some(&Token::In) {
        let Operand::Column(column) = left else {
            return Err(FilterError::Syntax(
                "left side of 'in' must be a column".into(),
            ));
        };
        let (values, rest) = parse_list(&after_not[1..])?;
        return Ok((
            Expr::In {
                column,
                values,
                negated,
            },
            rest,
        ));
    }

    let (op, rest) = parse_op(rest)?;
    let (right, rest) = parse_operand(rest)?;
    Ok((Expr::Comparison(Comparison { left, op, right }), rest))
}

/// Parse a column reference or a literal.
///
/// Unquoted multi-word column names (`orden de compra`) are assembled from
/// consecutive identifiers, longest match first.
fn parse_operand(tokens: &[Token]) -> Parsed<'_, Operand> {
    match tokens.first() {
        Some(Token::Str(s)) => Ok((Operand::Literal(Literal::Str(s.clone())), &tokens[1..])),
        Some(Token::Num(n)) => Ok((Operand::Literal(Literal::Num(*n)), &tokens[1..])),
        Some(Token::Quoted(name)) => Column::from_name(name)
            .map(|c| (Operand::Column(c), &tokens[1..]))
            .ok_or_else(|| FilterError::UnknownColumn(name.clone())),
        Some(Token::Ident(first)) => {
            let words: Vec<&str> = tokens
                .iter()
                .map_while(|t| match t {
                    Token::Ident(w) => Some(w.as_str()),
                    _ => None,
                })
                .collect();
            for len in (1..=words.len()).rev() {
                if let Some(column) = Column::from_name(&words[..len].join(" ")) {
                    return Ok((Operand::Column(column), &tokens[len..]));
                }
            }
            Err(FilterError::UnknownColumn(first.clone()))
        }
        other => Err(FilterError::Syntax(format!(
            "expected column or value, got {}",
            other.map_or("end of expression".to_string(), |t| format!("{t:?}"))
        ))),
    }
}

fn parse_op(tokens: &[Token]) -> Parsed<'_, CmpOp> {
    let op = match tokens.first() {
        Some(Token::Eq) => CmpOp::Eq,
        Some(Token::NotEq) => CmpOp::NotEq,
        Some(Token::Gt) => CmpOp::Gt,
        Some(Token::Gte) => CmpOp::Gte,
        Some(Token::Lt) => CmpOp::Lt,
        Some(Token::Lte) => CmpOp::Lte,
        other => {
            return Err(FilterError::Syntax(format!(
                "expected comparison operator, got {}",
                other.map_or("end of expression".to_string(), |t| format!("{t:?}"))
            )));
        }
    };
    Ok((op, &tokens[1..]))
}

fn parse_list(tokens: &[Token]) -> Parsed<'_, Vec<Literal>> {
    let close = match tokens.first() {
        Some(Token::LBracket) => Token::RBracket,
        Some(Token::LParen) => Token::RParen,
        _ => return Err(FilterError::Syntax("expected '[' after 'in'".into())),
    };

    let mut values = Vec::new();
    let mut rest = &tokens[1..];
    loop {
        match rest.first() {
            Some(Token::Str(s)) => values.push(Literal::Str(s.clone())),
            Some(Token::Num(n)) => values.push(Literal::Num(*n)),
            Some(t) if *t == close && values.is_empty() => {
                return Err(FilterError::Syntax("empty list after 'in'".into()));
            }
            _ => return Err(FilterError::Syntax("expected literal in list".into())),
        }
        rest = &rest[1..];
        match rest.first() {
            Some(Token::Comma) => rest = &rest[1..],
            Some(t) if *t == close => return Ok((values, &rest[1..])),
            _ => return Err(FilterError::Syntax("unterminated list after 'in'".into())),
        }
    }
}

/// Exponent suffix (`e6`, `E-3`, `e+10`) directly after a number's digits.
///
/// Looks ahead without consuming, so an `e` with no digits after it is left
/// to the identifier rules.
fn exponent_part(chars: &Peekable<Chars<'_>>) -> Option<String> {
    let mut look = chars.clone();
    let mut exponent = String::new();
    exponent.push(look.next_if(|c| matches!(c, 'e' | 'E'))?);
    if let Some(sign) = look.next_if(|c| matches!(c, '+' | '-')) {
        exponent.push(sign);
    }
    let digits_at = exponent.len();
    while let Some(d) = look.next_if(char::is_ascii_digit) {
        exponent.push(d);
    }
    (exponent.len() > digits_at).then_some(exponent)
}

fn describe(tokens: &[Token]) -> String {
    tokens
        .iter()
        .take(3)
        .map(|t| format!("{t:?}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ─── Tests ──────────────────────────────────────────────────────────
