//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Widths
//!
//! ```text
//! Widths: 50vw lg:400px
//!     default        320px (50vw)
//!     sm    ≥640px   320px (50vw)
//!     md    ≥768px   384px (50vw)
//!     lg    ≥1024px  400px
//!     ...
//! Sizes: (max-width: 1536px) 400px, ..., 400px
//! Initial width: 320px
//! ```
//!
//! ## Render
//!
//! ```text
//! src: https://placehold.co/320x320/868e96/FFFFFF?text=320x320
//! width: 320px
//! provider: placeholder
//! srcset:
//!     https://placehold.co/320x320/868e96/FFFFFF?text=320x320 320w
//!     https://placehold.co/384x384/868e96/FFFFFF?text=384x384 384w
//! sizes: (max-width: 1536px) 400px, ...
//! ```
//!
//! ## Providers
//!
//! ```text
//! * placeholder (default)
//!   cloudinary
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::config::Config;
use crate::provider::ProviderRegistry;
use crate::render::{ImageRequest, RenderError, RenderedImage};
use crate::width::{BreakpointTable, DEFAULT_KEY, WidthMap};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// widths
// ============================================================================

/// Resolved width table, one line per ladder entry, plus `sizes` and the
/// eager width.
pub fn format_width_map(
    spec: &str,
    map: &WidthMap,
    table: &BreakpointTable,
    sizes: &str,
    initial: Option<u32>,
) -> Vec<String> {
    let mut lines = vec![format!("Widths: {spec}")];
    for (key, width) in map.iter() {
        let threshold = match table.threshold(key) {
            Some(px) => format!("≥{px}px"),
            None if key == DEFAULT_KEY => String::new(),
            None => "?".to_string(),
        };
        lines.push(format!("{}{:<7}{:<9}{}", indent(1), key, threshold, width));
    }
    lines.push(format!("Sizes: {sizes}"));
    if let Some(px) = initial {
        lines.push(format!("Initial width: {px}px"));
    }
    lines
}

pub fn print_width_map(
    spec: &str,
    map: &WidthMap,
    table: &BreakpointTable,
    sizes: &str,
    initial: Option<u32>,
) {
    for line in format_width_map(spec, map, table, sizes, initial) {
        println!("{}", line);
    }
}

// ============================================================================
// render
// ============================================================================

/// Rendered attributes, `srcset` candidates one per line.
pub fn format_rendered(image: &RenderedImage) -> Vec<String> {
    let mut lines = vec![format!("src: {}", image.src)];
    if let Some(width) = image.width {
        lines.push(format!("width: {width}px"));
    }
    lines.push(format!("provider: {}", image.provider));
    if let Some(srcset) = &image.srcset {
        lines.push("srcset:".to_string());
        for candidate in srcset.split(", ") {
            lines.push(format!("{}{}", indent(1), candidate));
        }
    }
    if let Some(sizes) = &image.sizes {
        lines.push(format!("sizes: {sizes}"));
    }
    lines
}

pub fn print_rendered(image: &RenderedImage) {
    for line in format_rendered(image) {
        println!("{}", line);
    }
}

// ============================================================================
// batch
// ============================================================================

/// One-line summary followed by an indexed line per failed request.
pub fn format_batch_summary(
    requests: &[ImageRequest],
    results: &[Result<RenderedImage, RenderError>],
) -> Vec<String> {
    let failures: Vec<(usize, &str, &RenderError)> = results
        .iter()
        .zip(requests)
        .enumerate()
        .filter_map(|(i, (result, request))| {
            result
                .as_ref()
                .err()
                .map(|err| (i + 1, request.src.as_str(), err))
        })
        .collect();

    let mut lines = vec![format!(
        "Rendered {} of {} images",
        results.len() - failures.len(),
        results.len()
    )];
    for (pos, src, err) in failures {
        let src = if src.is_empty() { "(empty src)" } else { src };
        lines.push(format!("{} {}", format_index(pos), src));
        lines.push(format!("{}Error: {}", indent(1), err));
    }
    lines
}

/// Batch summary goes to stderr so stdout stays valid JSON.
pub fn print_batch_summary(
    requests: &[ImageRequest],
    results: &[Result<RenderedImage, RenderError>],
) {
    for line in format_batch_summary(requests, results) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// providers / check
// ============================================================================

/// Registered providers, the default marked with `*`.
pub fn format_providers(registry: &ProviderRegistry) -> Vec<String> {
    let default = registry.default_name();
    registry
        .providers()
        .map(|(name, _)| {
            if Some(name) == default {
                format!("* {name} (default)")
            } else {
                format!("  {name}")
            }
        })
        .collect()
}

pub fn print_providers(registry: &ProviderRegistry) {
    for line in format_providers(registry) {
        println!("{}", line);
    }
}

/// Summary of a validated configuration.
pub fn format_config_summary(config: &Config) -> Vec<String> {
    let ladder: Vec<String> = config
        .breakpoints
        .iter()
        .map(|(name, px)| format!("{name}={px}"))
        .collect();
    let mut lines = vec![
        format!("Provider: {}", config.provider),
        format!("Enabled providers: {}", config.enabled_providers().join(", ")),
        format!("Breakpoints: {}", ladder.join(" ")),
    ];
    if !config.presets.is_empty() {
        let names: Vec<&str> = config.presets.keys().map(String::as_str).collect();
        lines.push(format!("Presets: {}", names.join(", ")));
    }
    lines
}

pub fn print_config_summary(config: &Config) {
    for line in format_config_summary(config) {
        println!("{}", line);
    }
}
