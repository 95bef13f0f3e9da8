//! The `size`, `first` and `last` pseudo-methods.
//!
//! Only these three names are callable as methods from a path, and only on
//! values that expose them. Anything else ends the path in `Nil`.

use stencil_value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PseudoMethod {
    Size,
    First,
    Last,
}

impl PseudoMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "size" => Some(PseudoMethod::Size),
            "first" => Some(PseudoMethod::First),
            "last" => Some(PseudoMethod::Last),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PseudoMethod::Size => "size",
            PseudoMethod::First => "first",
            PseudoMethod::Last => "last",
        }
    }

    /// Call the method on `object`, or `None` if `object` does not expose it.
    pub fn apply(self, object: &Value) -> Option<Value> {
        match (self, object) {
            (PseudoMethod::Size, Value::Str(_) | Value::List(_) | Value::Map(_)) => {
                object.collection_len().map(count)
            }
            (PseudoMethod::Size, Value::Range(start, end)) => Some(Value::Int(range_len(*start, *end))),
            (PseudoMethod::First, Value::Range(start, _)) => Some(Value::Int(*start)),
            (PseudoMethod::Last, Value::Range(_, end)) => Some(Value::Int(*end)),
            (PseudoMethod::First, Value::List(items)) => {
                Some(items.borrow().first().cloned().unwrap_or_default())
            }
            (PseudoMethod::Last, Value::List(items)) => {
                Some(items.borrow().last().cloned().unwrap_or_default())
            }
            (PseudoMethod::First, Value::Map(entries)) => Some(
                entries
                    .borrow()
                    .first()
                    .map(|(key, value)| Value::list(vec![Value::string(key), value.clone()]))
                    .unwrap_or_default(),
            ),
            (_, Value::Drop(object)) => {
                let sizeable = object.sizeable()?;
                match self {
                    PseudoMethod::Size => Some(count(sizeable.size())),
                    PseudoMethod::First => sizeable.first(),
                    PseudoMethod::Last => sizeable.last(),
                }
            }
            _ => None,
        }
    }
}

fn count(len: usize) -> Value {
    Value::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

/// Number of integers in `start..=end`.
fn range_len(start: i64, end: i64) -> i64 {
    if end < start {
        return 0;
    }
    end.checked_sub(start)
        .map_or(i64::MAX, |span| span.saturating_add(1))
}
