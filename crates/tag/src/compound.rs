use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Tag;

/// An insertion-ordered mapping from field name to tag value.
///
/// Backed by a flat vector: compounds in entity snapshots hold tens of
/// fields at most, and preserving insertion order for serialization
/// matters more than sub-linear lookup. Field names are unique; `insert`
/// replaces an existing field in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Compound {
    fields: Vec<(String, Tag)>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tag> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Set a field, replacing any existing value in place so the field
    /// keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Tag>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Remove a field by name, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        let index = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Field names, collected. Handy when removing fields while iterating.
    pub fn key_names(&self) -> Vec<String> {
        self.fields.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn get_compound(&self, name: &str) -> Option<&Compound> {
        self.get(name).and_then(Tag::as_compound)
    }

    pub fn get_compound_mut(&mut self, name: &str) -> Option<&mut Compound> {
        self.get_mut(name).and_then(Tag::as_compound_mut)
    }

    pub fn get_list(&self, name: &str) -> Option<&[Tag]> {
        self.get(name).and_then(Tag::as_list)
    }

    pub fn get_list_mut(&mut self, name: &str) -> Option<&mut Vec<Tag>> {
        self.get_mut(name).and_then(Tag::as_list_mut)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Tag::as_str)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Tag::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Tag::as_i64)
    }

    /// Overlay every field of `other` onto this compound.
    ///
    /// This is a top-level field replacement: a compound value present in
    /// both is replaced wholesale by `other`'s version, never merged
    /// field-by-field. The diff/merge round-trip depends on exactly this.
    pub fn overlay(&mut self, other: &Compound) {
        for (name, value) in other.iter() {
            self.insert(name, value.clone());
        }
    }
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, Tag)> for Compound {
    fn from_iter<I: IntoIterator<Item = (String, Tag)>>(iter: I) -> Self {
        let mut compound = Compound::new();
        for (name, value) in iter {
            compound.insert(name, value);
        }
        compound
    }
}
