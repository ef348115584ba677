//! Backend-independent image modifiers.
//!
//! A [`ModifierSet`] is an insertion-ordered bag of semantic keys (`width`,
//! `quality`, `fit`, `focal`, ...) to [`ModifierValue`]s. It is open-ended:
//! each provider picks the keys it understands and ignores the rest.
//!
//! Order matters: providers that do not impose their own ordering emit
//! transformations in the order keys were inserted.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single modifier value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModifierValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ModifierValue {
    /// The value as a string slice, for string values only.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a whole number: integers, integral floats, and numeric
    /// strings (`"300"`).
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// True for strings carrying a `vw` unit, which only the width engine can
    /// turn into pixels.
    pub fn is_viewport_relative(&self) -> bool {
        self.as_str().is_some_and(|s| s.contains("vw"))
    }
}

impl fmt::Display for ModifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ModifierValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ModifierValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ModifierValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<i64> for ModifierValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ModifierValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ModifierValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ModifierValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ModifierValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Ordered semantic key → value map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierSet {
    entries: IndexMap<String, ModifierValue>,
}

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ModifierValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace; a replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ModifierValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ModifierValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModifierValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layer `self` over `defaults`: every default key keeps its position,
    /// values from `self` win, and keys only in `self` are appended.
    pub fn merged_over(&self, defaults: &ModifierSet) -> ModifierSet {
        let mut merged = defaults.clone();
        for (key, value) in &self.entries {
            merged.entries.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl<K, V> FromIterator<(K, V)> for ModifierSet
where
    K: Into<String>,
    V: Into<ModifierValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
