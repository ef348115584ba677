//! The breakpoint ladder that every width spec is resolved against.
//!
//! A [`BreakpointTable`] is an ordered list of `(name, threshold)` pairs with
//! strictly increasing thresholds. Traversal always starts with the synthetic
//! [`DEFAULT_KEY`] entry, which has no threshold of its own: viewport math for
//! it uses the smallest declared breakpoint.
//!
//! ```text
//! default → sm (640) → md (768) → lg (1024) → xl (1280) → 2xl (1536)
//! ```

use super::params::WidthError;

/// Key of the synthetic entry that precedes all named breakpoints.
pub const DEFAULT_KEY: &str = "default";

/// A single named screen-width threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub name: String,
    pub threshold: u32,
}

/// Ordered, immutable breakpoint ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointTable {
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointTable {
    /// Build a table from `(name, threshold)` pairs in declaration order.
    ///
    /// Fails when the ladder is empty, a threshold is zero, thresholds do not
    /// strictly increase, a name repeats, or a name collides with
    /// [`DEFAULT_KEY`].
    pub fn new<I, S>(entries: I) -> Result<Self, WidthError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut breakpoints: Vec<Breakpoint> = Vec::new();

        for (name, threshold) in entries {
            let name = name.into();
            if name.is_empty() || name == DEFAULT_KEY {
                return Err(WidthError::InvalidBreakpoints(format!(
                    "`{name}` is not a valid breakpoint name"
                )));
            }
            if threshold == 0 {
                return Err(WidthError::InvalidBreakpoints(format!(
                    "breakpoint `{name}` must have a positive threshold"
                )));
            }
            if breakpoints.iter().any(|b| b.name == name) {
                return Err(WidthError::InvalidBreakpoints(format!(
                    "breakpoint `{name}` is declared twice"
                )));
            }
            if let Some(prev) = breakpoints.last() {
                if threshold <= prev.threshold {
                    return Err(WidthError::InvalidBreakpoints(format!(
                        "breakpoint `{name}` ({threshold}px) must be larger than `{}` ({}px)",
                        prev.name, prev.threshold
                    )));
                }
            }
            breakpoints.push(Breakpoint { name, threshold });
        }

        if breakpoints.is_empty() {
            return Err(WidthError::InvalidBreakpoints(
                "at least one breakpoint is required".into(),
            ));
        }

        Ok(Self { breakpoints })
    }

    /// Threshold of a named breakpoint. `None` for unknown names and for
    /// [`DEFAULT_KEY`].
    pub fn threshold(&self, name: &str) -> Option<u32> {
        self.breakpoints
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.threshold)
    }

    /// Threshold used for viewport math on `name`: the breakpoint's own
    /// threshold, or the smallest one for [`DEFAULT_KEY`].
    pub fn vw_base(&self, name: &str) -> Option<u32> {
        if name == DEFAULT_KEY {
            Some(self.smallest().threshold)
        } else {
            self.threshold(name)
        }
    }

    /// Traversal rank: `default` is 0, the first named breakpoint 1, and so on.
    pub fn rank(&self, name: &str) -> Option<usize> {
        if name == DEFAULT_KEY {
            return Some(0);
        }
        self.breakpoints
            .iter()
            .position(|b| b.name == name)
            .map(|i| i + 1)
    }

    pub fn smallest(&self) -> &Breakpoint {
        &self.breakpoints[0]
    }

    pub fn largest(&self) -> &Breakpoint {
        &self.breakpoints[self.breakpoints.len() - 1]
    }

    /// Named breakpoints in ascending order (without `default`).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Breakpoint> {
        self.breakpoints.iter()
    }

    /// All traversal keys: `default` followed by each breakpoint name.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(DEFAULT_KEY).chain(self.breakpoints.iter().map(|b| b.name.as_str()))
    }
}

impl Default for BreakpointTable {
    /// The Tailwind ladder: `sm=640 md=768 lg=1024 xl=1280 2xl=1536`.
    fn default() -> Self {
        Self {
            breakpoints: [("sm", 640), ("md", 768), ("lg", 1024), ("xl", 1280), ("2xl", 1536)]
                .into_iter()
                .map(|(name, threshold)| Breakpoint {
                    name: name.to_string(),
                    threshold,
                })
                .collect(),
        }
    }
}
