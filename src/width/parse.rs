//! Width spec parser.
//!
//! Grammar:
//!
//! ```text
//! spec  := token (WS token)*
//! token := (breakpoint ':')? number unit?
//! unit  := 'px' | 'vw'
//! ```
//!
//! The parser only records what the spec states explicitly; filling the rest
//! of the ladder is [`resolve`](super::resolve)'s job. Viewport tokens are
//! converted to pixels here against their own breakpoint (or the smallest one
//! for the prefix-less token).

use tracing::debug;

use super::breakpoints::{BreakpointTable, DEFAULT_KEY};
use super::params::{ResolvedWidth, WidthError, WidthMap};

/// Parse a width spec into a partial [`WidthMap`].
///
/// The returned map always has a `default` entry. When the spec has no
/// prefix-less token, `default` copies the smallest supplied breakpoint.
///
/// ```
/// # use respimg::width::{parse_width_spec, BreakpointTable, ResolvedWidth};
/// let table = BreakpointTable::default();
/// let map = parse_width_spec("50vw lg:400px", &table).unwrap();
/// assert_eq!(map.get("default"), Some(&ResolvedWidth { value: 320, vw: 50 }));
/// assert_eq!(map.get("lg"), Some(&ResolvedWidth { value: 400, vw: 0 }));
/// assert!(map.get("md").is_none());
/// ```
pub fn parse_width_spec(spec: &str, table: &BreakpointTable) -> Result<WidthMap, WidthError> {
    let tokens: Vec<&str> = spec.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(WidthError::invalid_spec(spec, "spec is empty"));
    }

    let mut explicit = WidthMap::new();
    let mut smallest: Option<(usize, &str)> = None;

    for token in tokens {
        let (key, value) = match token.split_once(':') {
            Some((name, value)) => {
                let rank = table.rank(name).filter(|&r| r > 0).ok_or_else(|| {
                    WidthError::UnknownBreakpoint {
                        name: name.to_string(),
                        known: table
                            .iter()
                            .map(|b| b.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }
                })?;
                if smallest.is_none_or(|(r, _)| rank < r) {
                    smallest = Some((rank, name));
                }
                (name, value)
            }
            None => (DEFAULT_KEY, token),
        };

        if explicit.contains(key) {
            let reason = if key == DEFAULT_KEY {
                "only one token may omit the breakpoint prefix".to_string()
            } else {
                format!("breakpoint `{key}` is given more than once")
            };
            return Err(WidthError::invalid_spec(spec, reason));
        }

        let width = normalize(spec, value, key, table)?;
        explicit.insert(key, width);
    }

    if !explicit.contains(DEFAULT_KEY) {
        if let Some((_, name)) = smallest {
            if let Some(&width) = explicit.get(name) {
                explicit.insert(DEFAULT_KEY, width);
            }
        }
    }

    debug!(spec, entries = explicit.len(), "parsed width spec");
    Ok(explicit)
}

/// Turn a single token value (`"400"`, `"400px"`, `"50vw"`) into a width.
fn normalize(
    spec: &str,
    value: &str,
    key: &str,
    table: &BreakpointTable,
) -> Result<ResolvedWidth, WidthError> {
    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(digits_end);

    if digits.is_empty() {
        return Err(WidthError::invalid_spec(
            spec,
            format!("`{value}` has no numeric width"),
        ));
    }
    let magnitude: u32 = digits
        .parse()
        .map_err(|_| WidthError::invalid_spec(spec, format!("`{digits}` is out of range")))?;

    match unit {
        "" | "px" => Ok(ResolvedWidth::fixed(magnitude)),
        "vw" => {
            // Propagation re-applies the percentage up to the largest threshold.
            if ResolvedWidth::checked_viewport(magnitude, table.largest().threshold).is_none() {
                return Err(WidthError::invalid_spec(
                    spec,
                    format!("`{value}` is too large"),
                ));
            }
            // `key` was validated by the caller; DEFAULT_KEY maps to the smallest breakpoint.
            let base = table.vw_base(key).unwrap_or(table.smallest().threshold);
            Ok(ResolvedWidth::viewport(magnitude, base))
        }
        other => Err(WidthError::invalid_spec(
            spec,
            format!("unknown unit `{other}` (expected `px` or `vw`)"),
        )),
    }
}
