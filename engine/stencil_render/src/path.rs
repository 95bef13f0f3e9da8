//! Variable path syntax.
//!
//! A path is a root followed by lookups: `product.variants[0].title`,
//! `settings["page-size"]`, `[key_name].value`. Bracketed parts hold markup
//! that is resolved at lookup time; bare parts are used as literal keys.

use std::fmt;

use smallvec::SmallVec;
use stencil_value::Value;

/// One segment of a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathPart<'a> {
    /// Bare name, used verbatim.
    Name(&'a str),
    /// Text between `[` and `]`, resolved as markup.
    Bracket(&'a str),
}

/// Segments of a path; most paths have a handful.
pub type PathParts<'a> = SmallVec<[PathPart<'a>; 4]>;

/// Split `markup` into path parts.
///
/// `[...]` (non-empty, no nested `]`) is one bracket part. A run of ASCII
/// letters, digits, `_` and `-`, optionally ending in `?`, is one name part.
/// Any other character (dots, whitespace) only separates parts.
pub fn split_path(markup: &str) -> PathParts<'_> {
    let bytes = markup.as_bytes();
    let mut parts = PathParts::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b == b'[' {
            let close = bytes[pos + 1..].iter().position(|&c| c == b']');
            if let Some(offset @ 1..) = close {
                let end = pos + 1 + offset;
                parts.push(PathPart::Bracket(&markup[pos + 1..end]));
                pos = end + 1;
                continue;
            }
        } else if is_name_byte(b) {
            let start = pos;
            while pos < bytes.len() && is_name_byte(bytes[pos]) {
                pos += 1;
            }
            if bytes.get(pos) == Some(&b'?') {
                pos += 1;
            }
            parts.push(PathPart::Name(&markup[start..pos]));
            continue;
        }
        pos += 1;
    }
    parts
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// A lookup key after bracket resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(i64),
}

impl Key {
    /// Strings become names and integers become indices. Other values cannot
    /// address anything.
    pub fn from_value(value: &Value) -> Option<Key> {
        match value {
            Value::Str(s) => Some(Key::Name(s.to_string())),
            Value::Int(n) => Some(Key::Index(*n)),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(index) => write!(f, "{index}"),
        }
    }
}
