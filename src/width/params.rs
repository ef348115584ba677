//! Data types shared by the width parser, resolver and generators.
//!
//! - [`ResolvedWidth`]: one breakpoint's width, in pixels, plus the viewport
//!   percentage it came from (`vw == 0` means a fixed pixel width).
//! - [`WidthMap`]: ordered breakpoint → width mapping. Partial after parsing,
//!   complete and in ladder order after resolution.
//! - [`WidthError`]: everything that can go wrong turning a spec into widths.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::breakpoints::DEFAULT_KEY;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidthError {
    #[error("Invalid width spec `{spec}`: {reason}")]
    InvalidWidthSpec { spec: String, reason: String },
    #[error("Unknown breakpoint `{name}` (known: {known})")]
    UnknownBreakpoint { name: String, known: String },
    #[error("Invalid breakpoint table: {0}")]
    InvalidBreakpoints(String),
    #[error("Invalid density `{0}`: expected a multiplier like `2x` or `x2`")]
    InvalidDensity(String),
    #[error("Width spec switches between fixed and viewport widths more than once (at {0})")]
    MultipleTransitions(String),
}

impl WidthError {
    pub(crate) fn invalid_spec(spec: &str, reason: impl Into<String>) -> Self {
        Self::InvalidWidthSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}

/// Width of an image at one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedWidth {
    /// Concrete pixel width.
    pub value: u32,
    /// Viewport percentage, or 0 for a fixed width.
    pub vw: u32,
}

impl ResolvedWidth {
    pub fn fixed(value: u32) -> Self {
        Self { value, vw: 0 }
    }

    /// `vw` percent of `base`, rounded down. Saturates at `u32::MAX`; the
    /// parser rejects percentages that could get there.
    pub fn viewport(vw: u32, base: u32) -> Self {
        Self::checked_viewport(vw, base).unwrap_or(Self {
            value: u32::MAX,
            vw,
        })
    }

    /// `vw` percent of `base`, or `None` when the pixel width overflows.
    pub fn checked_viewport(vw: u32, base: u32) -> Option<Self> {
        let value = u32::try_from(u64::from(base) * u64::from(vw) / 100).ok()?;
        Some(Self { value, vw })
    }

    pub fn is_viewport(&self) -> bool {
        self.vw != 0
    }

    /// CSS length used in `sizes`: `"50vw"` or `"400px"`.
    pub fn size(&self) -> String {
        if self.is_viewport() {
            format!("{}vw", self.vw)
        } else {
            format!("{}px", self.value)
        }
    }
}

impl fmt::Display for ResolvedWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_viewport() {
            write!(f, "{}px ({}vw)", self.value, self.vw)
        } else {
            write!(f, "{}px", self.value)
        }
    }
}

/// Ordered mapping from breakpoint name (including `default`) to width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WidthMap {
    entries: IndexMap<String, ResolvedWidth>,
}

impl WidthMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, width: ResolvedWidth) -> Option<ResolvedWidth> {
        self.entries.insert(key.into(), width)
    }

    pub fn get(&self, key: &str) -> Option<&ResolvedWidth> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The `default` entry.
    pub fn default_width(&self) -> Option<&ResolvedWidth> {
        self.get(DEFAULT_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedWidth)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &ResolvedWidth> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ResolvedWidth)> for WidthMap {
    fn from_iter<T: IntoIterator<Item = (K, ResolvedWidth)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
