use serde::{Deserialize, Serialize};
use std::fmt;

use crate::compound::Compound;

/// A single node in a tag tree.
///
/// Leaves are primitives; branches are ordered lists or named compounds.
/// Equality is deep structural equality (list order matters, compound
/// field order does not).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tag {
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// UTF-8 text.
    Text(String),
    /// Raw binary payload.
    Bytes(Vec<u8>),
    /// Ordered list of values.
    List(Vec<Tag>),
    /// Named fields, insertion-ordered.
    Compound(Compound),
}

impl Tag {
    /// The type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Tag::Int(_) => "int",
            Tag::Float(_) => "float",
            Tag::Bool(_) => "bool",
            Tag::Text(_) => "text",
            Tag::Bytes(_) => "bytes",
            Tag::List(_) => "list",
            Tag::Compound(_) => "compound",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tag::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Tag::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Tag::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Tag::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Tag::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Tag>> {
        match self {
            Tag::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match self {
            Tag::Compound(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Int(n) => write!(f, "{n}"),
            Tag::Float(x) => write!(f, "{x}"),
            Tag::Bool(b) => write!(f, "{b}"),
            Tag::Text(s) => write!(f, "\"{s}\""),
            Tag::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Tag::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Tag::Compound(c) => write!(f, "{c}"),
        }
    }
}

impl From<i64> for Tag {
    fn from(value: i64) -> Self {
        Tag::Int(value)
    }
}

impl From<i32> for Tag {
    fn from(value: i32) -> Self {
        Tag::Int(value as i64)
    }
}

impl From<f64> for Tag {
    fn from(value: f64) -> Self {
        Tag::Float(value)
    }
}

impl From<f32> for Tag {
    fn from(value: f32) -> Self {
        Tag::Float(value as f64)
    }
}

impl From<bool> for Tag {
    fn from(value: bool) -> Self {
        Tag::Bool(value)
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::Text(value)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Tag {
    fn from(value: Vec<u8>) -> Self {
        Tag::Bytes(value)
    }
}

impl From<Vec<Tag>> for Tag {
    fn from(value: Vec<Tag>) -> Self {
        Tag::List(value)
    }
}

impl From<Compound> for Tag {
    fn from(value: Compound) -> Self {
        Tag::Compound(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        assert_eq!(Tag::Int(7).as_i64(), Some(7));
        assert_eq!(Tag::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Tag::Bool(true).as_bool(), Some(true));
        assert_eq!(Tag::from("hi").as_str(), Some("hi"));
        assert_eq!(Tag::Int(7).as_str(), None);
        assert_eq!(Tag::Float(1.5).as_i64(), None);
    }

    #[test]
    fn list_equality_is_order_sensitive() {
        let a = Tag::List(vec![Tag::Int(1), Tag::Int(2)]);
        let b = Tag::List(vec![Tag::Int(2), Tag::Int(1)]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn type_names() {
        assert_eq!(Tag::Int(0).type_name(), "int");
        assert_eq!(Tag::Compound(Compound::new()).type_name(), "compound");
    }
}
