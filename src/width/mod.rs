//! Responsive width resolution: pure functions, no I/O.
//!
//! | Step | Function |
//! |---|---|
//! | **Parse** `"50vw lg:400px"` | [`parse_width_spec`] |
//! | **Propagate** across the ladder | [`propagate`] / [`resolve_widths`] |
//! | **`sizes`** attribute | [`compute_sizes`] |
//! | **`srcset`** attribute | [`compute_srcset`], [`srcset_for_widths`] |
//! | **Densities** `"1x 2x"` | [`density_widths`] |
//! | **Eager width** | [`initial_width`] |
//!
//! The module is split into:
//! - **Breakpoints**: the ordered ladder every spec resolves against
//! - **Parameters**: widths, width maps and the error type
//! - **Parse / Resolve**: spec → partial map → complete map
//! - **Sizes**: attribute generation from a complete map

mod breakpoints;
mod params;
mod parse;
mod resolve;
mod sizes;

pub use breakpoints::{Breakpoint, BreakpointTable, DEFAULT_KEY};
pub use params::{ResolvedWidth, WidthError, WidthMap};
pub use parse::parse_width_spec;
pub use resolve::{propagate, resolve_widths};
pub use sizes::{compute_sizes, compute_srcset, density_widths, initial_width, srcset_for_widths};

/// Whether a spec describes breakpoint- or viewport-dependent widths, as
/// opposed to a single fixed width.
pub fn is_responsive_spec(spec: &str) -> bool {
    spec.contains("vw") || spec.contains(':')
}
