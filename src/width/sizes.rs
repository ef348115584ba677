//! `sizes` / `srcset` generation from a resolved [`WidthMap`].
//!
//! These functions never build URLs themselves: `srcset` generation takes a
//! callback `(src, width) -> url`, so the width engine has no dependency on
//! any provider.

use std::collections::HashSet;

use super::breakpoints::{Breakpoint, BreakpointTable};
use super::params::{ResolvedWidth, WidthError, WidthMap};

/// Build the `sizes` attribute for a resolved map.
///
/// A map that is `100vw` everywhere collapses to `"100vw"`. Otherwise each
/// breakpoint, largest first, contributes `(max-width: <threshold>px) <size>`, plus the next
/// smaller breakpoint's size at the same threshold when it differs. A
/// `default` that differs from the smallest breakpoint adds one more entry at
/// the smallest threshold, and the largest breakpoint's size closes the list
/// unconditionally.
pub fn compute_sizes(widths: &WidthMap, table: &BreakpointTable) -> String {
    let Some(default) = widths.default_width() else {
        return String::new();
    };
    let default_size = default.size();
    if widths.values().all(|w| w.vw == 100) {
        return default_size;
    }

    let populated: Vec<(&Breakpoint, &ResolvedWidth)> = table
        .iter()
        .rev()
        .filter_map(|bp| widths.get(&bp.name).map(|w| (bp, w)))
        .collect();
    let (Some(&(_, largest)), Some(&(smallest_bp, smallest))) =
        (populated.first(), populated.last())
    else {
        return default_size;
    };

    let mut entries: Vec<(u32, String)> = Vec::new();
    for (i, (bp, width)) in populated.iter().enumerate() {
        let size = width.size();
        let next_size = populated.get(i + 1).map(|(_, next)| next.size());
        entries.push((bp.threshold, size.clone()));
        // The size already changes below this threshold.
        if let Some(next_size) = next_size.filter(|next| *next != size) {
            entries.push((bp.threshold, next_size));
        }
    }
    // Stable: entries sharing a threshold keep their emission order.
    entries.sort_by(|a, b| b.0.cmp(&a.0));
    if default_size != smallest.size() {
        entries.push((smallest_bp.threshold, default_size));
    }

    let mut seen = HashSet::new();
    let mut parts: Vec<String> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.clone()))
        .map(|(threshold, size)| format!("(max-width: {threshold}px) {size}"))
        .collect();
    parts.push(largest.size());
    parts.join(", ")
}

/// Build the `srcset` attribute: one `<url> <width>w` candidate per distinct
/// non-zero width in the map.
pub fn compute_srcset<F>(src: &str, widths: &WidthMap, url_fn: F) -> String
where
    F: FnMut(&str, u32) -> String,
{
    let values: Vec<u32> = widths.values().map(|w| w.value).collect();
    srcset_for_widths(src, &values, url_fn)
}

/// Build a `srcset` from an explicit width list (e.g. density widths).
///
/// Zero widths and repeated widths are skipped: a `srcset` must not contain
/// two candidates with the same descriptor.
pub fn srcset_for_widths<F>(src: &str, widths: &[u32], mut url_fn: F) -> String
where
    F: FnMut(&str, u32) -> String,
{
    let mut seen = HashSet::new();
    widths
        .iter()
        .copied()
        .filter(|&w| w > 0 && seen.insert(w))
        .map(|w| format!("{} {}w", url_fn(src, w), w))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Multiply `base` by each density in `spec` (`"1x 2x"`, `"x1 x2"`,
/// `"1.5x"`), truncating to whole pixels, sorted ascending.
///
/// Duplicates are kept; a blank spec yields no widths.
pub fn density_widths(base: u32, spec: &str) -> Result<Vec<u32>, WidthError> {
    let mut widths = spec
        .split_whitespace()
        .map(|token| {
            let factor: f64 = token
                .trim_start_matches(['x', 'X'])
                .trim_end_matches(['x', 'X'])
                .parse()
                .map_err(|_| WidthError::InvalidDensity(token.to_string()))?;
            if !factor.is_finite() || factor <= 0.0 {
                return Err(WidthError::InvalidDensity(token.to_string()));
            }
            Ok((f64::from(base) * factor) as u32)
        })
        .collect::<Result<Vec<u32>, WidthError>>()?;
    widths.sort_unstable();
    Ok(widths)
}

/// Width of the eagerly loaded base image.
///
/// For a spec that opens with a viewport token this is the smallest
/// viewport-derived width, so small screens never download a large image by
/// default; otherwise it is the `default` width.
pub fn initial_width(widths: &WidthMap, spec: &str) -> Option<u32> {
    let default = widths.default_width().map(|w| w.value);
    let leading_vw = spec
        .split_whitespace()
        .next()
        .is_some_and(|token| token.ends_with("vw"));

    if leading_vw {
        widths
            .values()
            .filter(|w| w.is_viewport())
            .map(|w| w.value)
            .min()
            .or(default)
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{tailwind, width_map};
    use crate::width::resolve_widths;

    fn query_url(src: &str, width: u32) -> String {
        format!("{src}?width={width}")
    }

    // =========================================================================
    // compute_sizes
    // =========================================================================

    #[test]
    fn sizes_fullscreen_collapses_to_100vw() {
        let map = resolve_widths("100vw", &tailwind()).unwrap();
        assert_eq!(compute_sizes(&map, &tailwind()), "100vw");
    }

    #[test]
    fn sizes_single_fixed_width_lists_every_breakpoint() {
        let map = resolve_widths("300", &tailwind()).unwrap();
        assert_eq!(
            compute_sizes(&map, &tailwind()),
            "(max-width: 1536px) 300px, \
             (max-width: 1280px) 300px, \
             (max-width: 1024px) 300px, \
             (max-width: 768px) 300px, \
             (max-width: 640px) 300px, \
             300px"
        );
    }

    #[test]
    fn sizes_partial_viewport_does_not_collapse() {
        let map = resolve_widths("50vw", &tailwind()).unwrap();
        assert_eq!(
            compute_sizes(&map, &tailwind()),
            "(max-width: 1536px) 50vw, \
             (max-width: 1280px) 50vw, \
             (max-width: 1024px) 50vw, \
             (max-width: 768px) 50vw, \
             (max-width: 640px) 50vw, \
             50vw"
        );
    }

    #[test]
    fn sizes_fixed_breakpoints() {
        let map = resolve_widths("sm:50 md:100 lg:200", &tailwind()).unwrap();
        assert_eq!(
            compute_sizes(&map, &tailwind()),
            "(max-width: 1536px) 200px, \
             (max-width: 1280px) 200px, \
             (max-width: 1024px) 200px, \
             (max-width: 1024px) 100px, \
             (max-width: 768px) 100px, \
             (max-width: 768px) 50px, \
             (max-width: 640px) 50px, \
             200px"
        );
    }

    #[test]
    fn sizes_halfscreen_and_fixed() {
        let map = resolve_widths("50vw lg:400px", &tailwind()).unwrap();
        let sizes = compute_sizes(&map, &tailwind());
        assert!(sizes.contains("(max-width: 1024px) 50vw"));
        assert!(sizes.ends_with(", 400px"));
    }

    #[test]
    fn sizes_default_differing_from_smallest() {
        let map = resolve_widths("400 sm:500 md:100vw", &tailwind()).unwrap();
        let sizes = compute_sizes(&map, &tailwind());
        assert!(sizes.contains("(max-width: 640px) 400px"));
        assert!(sizes.contains("(max-width: 768px) 500px"));
        assert!(sizes.ends_with(", 100vw"));
    }

    #[test]
    fn sizes_has_no_duplicate_entries() {
        let map = resolve_widths("50vw lg:400px", &tailwind()).unwrap();
        let sizes = compute_sizes(&map, &tailwind());
        let parts: Vec<&str> = sizes.split(", ").collect();
        let unique: HashSet<&str> = parts.iter().copied().collect();
        assert_eq!(parts.len(), unique.len());
    }

    #[test]
    fn sizes_of_empty_map_is_empty() {
        assert_eq!(compute_sizes(&WidthMap::new(), &tailwind()), "");
    }

    // =========================================================================
    // compute_srcset
    // =========================================================================

    #[test]
    fn srcset_basic_widths() {
        let map = width_map(&[("default", 300, 0), ("sm", 400, 0)]);
        assert_eq!(
            compute_srcset("/image.jpg", &map, query_url),
            "/image.jpg?width=300 300w, /image.jpg?width=400 400w"
        );
    }

    #[test]
    fn srcset_skips_repeated_widths() {
        let map = resolve_widths("100vw", &tailwind()).unwrap();
        assert_eq!(
            compute_srcset("/a.jpg", &map, query_url),
            "/a.jpg?width=640 640w, /a.jpg?width=768 768w, /a.jpg?width=1024 1024w, \
             /a.jpg?width=1280 1280w, /a.jpg?width=1536 1536w"
        );
    }

    #[test]
    fn srcset_skips_zero_widths() {
        let map = width_map(&[("default", 0, 0), ("sm", 400, 0)]);
        assert_eq!(compute_srcset("/a.jpg", &map, query_url), "/a.jpg?width=400 400w");
    }

    #[test]
    fn srcset_calls_back_once_per_candidate() {
        let map = resolve_widths("50vw lg:400px", &tailwind()).unwrap();
        let mut calls = Vec::new();
        compute_srcset("/a.jpg", &map, |src, w| {
            calls.push(w);
            format!("{src}#{w}")
        });
        assert_eq!(calls, [320, 384, 400]);
    }

    // =========================================================================
    // density_widths
    // =========================================================================

    #[test]
    fn density_suffix_form() {
        assert_eq!(density_widths(100, "1x 2x").unwrap(), [100, 200]);
    }

    #[test]
    fn density_prefix_form() {
        assert_eq!(density_widths(100, "x1 x2 x3").unwrap(), [100, 200, 300]);
    }

    #[test]
    fn density_fractional_truncates_and_sorts() {
        assert_eq!(density_widths(333, "2x 1.5x").unwrap(), [499, 666]);
    }

    #[test]
    fn density_keeps_duplicates() {
        assert_eq!(density_widths(100, "1x x1").unwrap(), [100, 100]);
    }

    #[test]
    fn density_rejects_garbage() {
        assert_eq!(
            density_widths(100, "2x retina"),
            Err(WidthError::InvalidDensity("retina".into()))
        );
        assert!(density_widths(100, "0x").is_err());
    }

    // =========================================================================
    // initial_width
    // =========================================================================

    #[test]
    fn initial_width_viewport_pattern_uses_smallest() {
        let map = resolve_widths("100vw", &tailwind()).unwrap();
        assert_eq!(initial_width(&map, "100vw"), Some(640));
    }

    #[test]
    fn initial_width_fixed_pattern_uses_default() {
        let map = width_map(&[("default", 300, 0), ("sm", 400, 0)]);
        assert_eq!(initial_width(&map, "300"), Some(300));
    }

    #[test]
    fn initial_width_mixed_pattern_starting_fixed() {
        let map = width_map(&[("default", 400, 0), ("md", 768, 100)]);
        assert_eq!(initial_width(&map, "400 md:100vw"), Some(400));
    }

    #[test]
    fn initial_width_viewport_then_fixed() {
        let map = resolve_widths("50vw lg:400px", &tailwind()).unwrap();
        assert_eq!(initial_width(&map, "50vw lg:400px"), Some(320));
    }
}
