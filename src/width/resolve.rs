//! Width propagation across the breakpoint ladder.
//!
//! Walks `default` and then every breakpoint in ascending order. The mode is
//! set by `default`:
//!
//! - **viewport**: unfilled breakpoints get `default`'s percentage of their
//!   own threshold (`50vw` is 320px at `sm`, 384px at `md`). Explicit viewport
//!   widths in between (`100vw md:50vw`) apply to their own breakpoint only;
//! - **fixed**: unfilled breakpoints copy the nearest explicit width below.
//!
//! An explicit width of the other kind switches the mode from that breakpoint
//! onwards. After a switch to viewport widths, the percentage re-applied is
//! the one at the switch. This supports "half the viewport on small screens,
//! 400px from `lg` up" (`50vw lg:400px`) and the inverse (`1000 lg:100vw`).
//! Only one such switch is allowed per spec.

use tracing::debug;

use super::breakpoints::{BreakpointTable, DEFAULT_KEY};
use super::params::{ResolvedWidth, WidthError, WidthMap};
use super::parse::parse_width_spec;

/// Parse and resolve a width spec in one step.
pub fn resolve_widths(spec: &str, table: &BreakpointTable) -> Result<WidthMap, WidthError> {
    let explicit = parse_width_spec(spec, table)?;
    propagate(&explicit, table)
}

/// Fill every breakpoint of `table` from a partial map.
///
/// The result holds `default` plus one entry per breakpoint, in ladder order.
/// Resolving an already complete map returns it unchanged.
pub fn propagate(explicit: &WidthMap, table: &BreakpointTable) -> Result<WidthMap, WidthError> {
    check_single_transition(explicit, table)?;

    let mut carried = match explicit.default_width() {
        Some(width) => *width,
        None => smallest_explicit(explicit, table)
            .ok_or_else(|| WidthError::invalid_spec("", "no widths to resolve"))?,
    };

    let mut resolved = WidthMap::new();
    resolved.insert(DEFAULT_KEY, carried);
    // Percentage filled into unfilled slots while in viewport mode.
    let mut mode_vw = carried.vw;

    for bp in table.iter() {
        let width = match explicit.get(&bp.name) {
            Some(width) => {
                if width.is_viewport() != carried.is_viewport() {
                    debug!(
                        breakpoint = %bp.name,
                        from = %carried.size(),
                        to = %width.size(),
                        "width mode transition"
                    );
                    mode_vw = width.vw;
                }
                *width
            }
            None if carried.is_viewport() => ResolvedWidth::viewport(mode_vw, bp.threshold),
            None => carried,
        };
        carried = width;
        resolved.insert(bp.name.as_str(), width);
    }

    Ok(resolved)
}

fn smallest_explicit(explicit: &WidthMap, table: &BreakpointTable) -> Option<ResolvedWidth> {
    table.iter().find_map(|bp| explicit.get(&bp.name).copied())
}

/// Reject specs that flip between fixed and viewport widths more than once.
fn check_single_transition(explicit: &WidthMap, table: &BreakpointTable) -> Result<(), WidthError> {
    let mut previous: Option<bool> = None;
    let mut transitions: Vec<&str> = Vec::new();

    for key in table.keys() {
        let Some(width) = explicit.get(key) else {
            continue;
        };
        if let Some(prev) = previous {
            if prev != width.is_viewport() {
                transitions.push(key);
            }
        }
        previous = Some(width.is_viewport());
    }

    if transitions.len() > 1 {
        return Err(WidthError::MultipleTransitions(transitions.join(", ")));
    }
    Ok(())
}
