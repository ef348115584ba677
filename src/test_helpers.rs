//! Shared test utilities for the respimg test suite.
//!
//! Provides the standard breakpoint ladder, width-map builders and assertions,
//! and a recording provider that captures every URL request.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let map = resolve_widths("50vw lg:400px", &tailwind()).unwrap();
//! assert_widths(&map, &[
//!     ("default", 320, 50),
//!     ("sm", 320, 50),
//!     ("md", 384, 50),
//!     ("lg", 400, 0),
//!     ("xl", 400, 0),
//!     ("2xl", 400, 0),
//! ]);
//! ```

use std::sync::Mutex;

use crate::modifiers::ModifierSet;
use crate::provider::ModifierMapper;
use crate::width::{BreakpointTable, ResolvedWidth, WidthMap};

// =========================================================================
// Breakpoints and width maps
// =========================================================================

/// The stock `sm`..`2xl` ladder (640, 768, 1024, 1280, 1536).
pub fn tailwind() -> BreakpointTable {
    BreakpointTable::default()
}

/// Build a map from `(key, value, vw)` triples, in the given order.
pub fn width_map(entries: &[(&str, u32, u32)]) -> WidthMap {
    entries
        .iter()
        .map(|&(key, value, vw)| (key.to_string(), ResolvedWidth { value, vw }))
        .collect()
}

/// Assert a map has exactly the given `(key, value, vw)` entries, in order.
pub fn assert_widths(map: &WidthMap, expected: &[(&str, u32, u32)]) {
    let actual: Vec<(&str, u32, u32)> = map.iter().map(|(k, w)| (k, w.value, w.vw)).collect();
    assert_eq!(
        actual, expected,
        "width map mismatch.\n  actual:   {actual:?}\n  expected: {expected:?}"
    );
}

// =========================================================================
// Recording provider
// =========================================================================

/// Provider that records every `build_url` call and returns
/// `<prefix>/<src>?k=v&...` with modifiers in insertion order.
///
/// Mutex-backed so it stays `Sync` under `render_batch`.
pub struct RecordingMapper {
    name: String,
    prefix: String,
    calls: Mutex<Vec<(String, ModifierSet)>>,
}

impl RecordingMapper {
    /// Mapper whose URLs start with `https://<name>.test`.
    pub fn named(name: &str) -> Self {
        Self::with_url(name, &format!("https://{name}.test"))
    }

    pub fn with_url(name: &str, prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every `(src, modifiers)` pair seen so far.
    pub fn calls(&self) -> Vec<(String, ModifierSet)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ModifierMapper for RecordingMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_url(&self, src: &str, modifiers: &ModifierSet) -> String {
        self.calls
            .lock()
            .unwrap()
            .push((src.to_string(), modifiers.clone()));

        let src = src.trim_start_matches('/');
        let query: Vec<String> = modifiers.iter().map(|(k, v)| format!("{k}={v}")).collect();
        if query.is_empty() {
            format!("{}/{src}", self.prefix)
        } else {
            format!("{}/{src}?{}", self.prefix, query.join("&"))
        }
    }
}
