//! Runtime values for the render core.
//!
//! All compound values go through factory methods on `Value`
//! (`Value::list`, `Value::map`, `Value::drop`, `Value::deferred`, ...), so
//! the sharing strategy of each variant stays an implementation detail.
//!
//! ```text
//! let user = Value::map_from([("name", Value::string("tobi"))]);
//! let posts = Value::list(vec![Value::int(1), Value::int(2)]);
//! let now = Value::deferred(|| Ok(Value::int(1_700_000_000)));
//! ```

mod deferred;
mod shared;

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::capability::{Droppable, RenderContext};
use crate::errors::RenderResult;

pub use deferred::Deferred;
pub use shared::Shared;

/// Ordered string-keyed mapping; iteration follows insertion order.
pub type Mapping = IndexMap<String, Value>;

/// Shared sequence.
pub type ListValue = Shared<Vec<Value>>;

/// Shared mapping.
pub type MapValue = Shared<Mapping>;

/// Shared handle to an external object.
pub type DropRef = Rc<dyn Droppable>;

/// The reserved `blank` and `empty` literals.
///
/// They are not values in their own right; comparison logic asks the marker
/// whether another value matches it (`if name == blank`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Blank,
    Empty,
}

impl Marker {
    /// Whether `value` counts as blank/empty.
    ///
    /// `empty` matches empty strings and empty collections. `blank`
    /// additionally matches nil, false and whitespace-only strings.
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (Marker::Blank, Value::Nil | Value::Bool(false)) => true,
            (Marker::Blank, Value::Str(s)) => s.trim().is_empty(),
            (Marker::Empty, Value::Str(s)) => s.is_empty(),
            (_, Value::List(items)) => items.borrow().is_empty(),
            (_, Value::Map(entries)) => entries.borrow().is_empty(),
            (_, Value::Marker(other)) => self == *other,
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Marker::Blank => "blank",
            Marker::Empty => "empty",
        }
    }
}

/// Runtime value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// Inclusive integer range `(start..end)`.
    Range(i64, i64),
    List(ListValue),
    Map(MapValue),
    /// External object exposing capabilities.
    Drop(DropRef),
    /// Computation evaluated on first fetch.
    Deferred(Deferred),
    Marker(Marker),
}

// Factory Methods

impl Value {
    #[inline]
    pub fn nil() -> Self {
        Value::Nil
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    #[inline]
    pub fn float(f: f64) -> Self {
        Value::Float(f)
    }

    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    #[inline]
    pub fn range(start: i64, end: i64) -> Self {
        Value::Range(start, end)
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Shared::new(items))
    }

    pub fn map(entries: Mapping) -> Self {
        Value::Map(Shared::new(entries))
    }

    /// Build a map from key/value pairs, keeping their order.
    pub fn map_from<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn drop(object: impl Droppable + 'static) -> Self {
        Value::Drop(Rc::new(object))
    }

    /// Zero-argument deferred computation.
    pub fn deferred(f: impl Fn() -> RenderResult + 'static) -> Self {
        Value::Deferred(Deferred::Thunk(Rc::new(f)))
    }

    /// Deferred computation that receives the active context.
    pub fn deferred_with_context(
        f: impl Fn(&mut dyn RenderContext) -> RenderResult + 'static,
    ) -> Self {
        Value::Deferred(Deferred::Contextual(Rc::new(f)))
    }
}

// Queries and coercions

impl Value {
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[inline]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Value::Deferred(_))
    }

    /// Template truthiness: only nil and false are falsy.
    #[inline]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Length of strings (in characters), lists and maps.
    pub fn collection_len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.borrow().len()),
            Value::Map(entries) => Some(entries.borrow().len()),
            _ => None,
        }
    }

    /// Integer coercion used for range bounds.
    ///
    /// Floats truncate, strings contribute their leading integer (`"12px"`
    /// is 12), everything else is 0.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float to int casts saturate, which is the intended coercion"
    )]
    pub fn to_integer(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            Value::Float(f) => f.trunc() as i64,
            Value::Str(s) => leading_integer(s),
            _ => 0,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Range(..) => "range",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Drop(object) => object.type_name(),
            Value::Deferred(_) => "deferred",
            Value::Marker(_) => "marker",
        }
    }
}

/// Parse an optional sign and leading digits, ignoring leading whitespace.
fn leading_integer(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if negative {
        magnitude.saturating_neg()
    } else {
        magnitude
    }
}

impl PartialEq for Value {
    #[expect(
        clippy::cast_precision_loss,
        reason = "int/float equality follows numeric comparison"
    )]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Range(a1, a2), Value::Range(b1, b2)) => a1 == b1 && a2 == b2,
            (Value::List(a), Value::List(b)) => a.ptr_eq(b) || *a.borrow() == *b.borrow(),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b) || *a.borrow() == *b.borrow(),
            (Value::Drop(a), Value::Drop(b)) => Rc::ptr_eq(a, b),
            (Value::Deferred(a), Value::Deferred(b)) => a.ptr_eq(b),
            (Value::Marker(a), Value::Marker(b)) => a == b,
            _ => false,
        }
    }
}

/// Rendered form of a value.
///
/// Nil, markers and unevaluated computations render as nothing; lists render
/// their elements back to back.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil | Value::Marker(_) | Value::Deferred(_) => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => f.write_str(s),
            Value::Range(a, b) => write!(f, "{a}..{b}"),
            Value::List(items) => {
                for item in items.borrow().iter() {
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}=>{value}")?;
                }
                f.write_str("}")
            }
            Value::Drop(object) => match object.renderable() {
                Some(renderable) => write!(f, "{}", renderable.to_renderable()),
                None => f.write_str(object.type_name()),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<Mapping> for Value {
    fn from(entries: Mapping) -> Self {
        Value::map(entries)
    }
}
