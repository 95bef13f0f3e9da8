//! Literal grammar.
//!
//! Recognizes literal tokens in raw markup. Rules are tried in a fixed order
//! and the first match wins:
//!
//! | # | form | result |
//! |---|------|--------|
//! | 1 | `nil`, `null`, empty text | `Nil` |
//! | 2 | `true`, `false` | `Bool` |
//! | 3 | `blank`, `empty` | `Marker` |
//! | 4 | `'text'`, `"text"` | `Str` (quotes stripped, no escapes) |
//! | 5 | `-?digits` | `Int` |
//! | 6 | `(a..b)` | range bounds, resolved by the caller |
//! | 7 | `-?digit[digits.]+` | `Float` |
//!
//! Integers are tried before floats. An integer that does not fit in `i64`
//! falls through to the float rule. Range bounds are returned as raw markup
//! because each bound may itself be a variable; the context resolves them.

use stencil_value::{Marker, Value};

/// A recognized literal.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal<'a> {
    Value(Value),
    /// `(start..end)`, with both bounds still unresolved.
    Range { start: &'a str, end: &'a str },
}

/// Classify `markup`; `None` means it is not a literal.
pub fn parse_literal(markup: &str) -> Option<Literal<'_>> {
    let value = match markup {
        "" | "nil" | "null" => Value::Nil,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "blank" => Value::Marker(Marker::Blank),
        "empty" => Value::Marker(Marker::Empty),
        _ => {
            if let Some(text) = quoted(markup) {
                Value::string(text)
            } else if let Some(n) = integer(markup) {
                Value::Int(n)
            } else if let Some((start, end)) = range_bounds(markup) {
                return Some(Literal::Range { start, end });
            } else if looks_like_float(markup) {
                Value::Float(float_prefix(markup))
            } else {
                return None;
            }
        }
    };
    Some(Literal::Value(value))
}

fn quoted(markup: &str) -> Option<&str> {
    let bytes = markup.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&open @ (b'\'' | b'"')), Some(&close)) if bytes.len() >= 2 && open == close => {
            Some(&markup[1..markup.len() - 1])
        }
        _ => None,
    }
}

fn unsigned(markup: &str) -> &str {
    markup.strip_prefix('-').unwrap_or(markup)
}

fn integer(markup: &str) -> Option<i64> {
    let digits = unsigned(markup);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    markup.parse().ok()
}

/// Split `(start..end)`. The start bound is greedy, so `(a...b)` splits as
/// `a.` and `b`. Neither bound may be empty or contain whitespace.
fn range_bounds(markup: &str) -> Option<(&str, &str)> {
    let inner = markup.strip_prefix('(')?.strip_suffix(')')?;
    if inner.bytes().any(|b| b.is_ascii_whitespace()) {
        return None;
    }
    let bytes = inner.as_bytes();
    let last_split = bytes.len().checked_sub(3)?;
    (1..=last_split)
        .rev()
        .find(|&i| bytes[i] == b'.' && bytes[i + 1] == b'.')
        .map(|i| (&inner[..i], &inner[i + 2..]))
}

fn looks_like_float(markup: &str) -> bool {
    let body = unsigned(markup).as_bytes();
    match body.split_first() {
        Some((first, rest)) => {
            first.is_ascii_digit()
                && !rest.is_empty()
                && rest.iter().all(|b| b.is_ascii_digit() || *b == b'.')
        }
        None => false,
    }
}

/// Value of the longest `-?digits(.digits)?` prefix, so `1.2.3` reads as 1.2.
fn float_prefix(markup: &str) -> f64 {
    let sign_len = markup.len() - unsigned(markup).len();
    let bytes = markup.as_bytes();
    let mut end = sign_len;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    markup[..end].parse().unwrap_or(0.0)
}
