//! Property tests for width resolution.
//!
//! Run with: `cargo test --test width_properties`

use proptest::prelude::*;
use respimg::width::{
    BreakpointTable, ResolvedWidth, compute_sizes, compute_srcset, propagate, resolve_widths,
};
use std::collections::HashSet;

const LADDER: [&str; 5] = ["sm", "md", "lg", "xl", "2xl"];

/// Build a spec from optional per-slot values: slot 0 is the prefix-less
/// token, slots 1.. are the ladder breakpoints.
fn spec_from(slots: &[Option<u32>], unit: &str) -> String {
    slots
        .iter()
        .enumerate()
        .filter_map(|(i, value)| {
            value.map(|v| match i {
                0 => format!("{v}{unit}"),
                _ => format!("{}:{v}{unit}", LADDER[i - 1]),
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn fixed_slots() -> impl Strategy<Value = Vec<Option<u32>>> {
    prop::collection::vec(prop::option::of(1u32..3000), 6)
        .prop_filter("at least one width", |slots| slots.iter().any(Option::is_some))
}

proptest! {
    #[test]
    fn fixed_specs_carry_nearest_value(slots in fixed_slots()) {
        let table = BreakpointTable::default();
        let spec = spec_from(&slots, "px");
        let map = resolve_widths(&spec, &table).unwrap();

        prop_assert_eq!(map.len(), 6);
        prop_assert!(map.values().all(|w| w.vw == 0));

        let first = slots.iter().flatten().next().copied().unwrap();
        let mut carried = slots[0].unwrap_or(first);
        prop_assert_eq!(map.get("default").copied(), Some(ResolvedWidth::fixed(carried)));
        for (i, name) in LADDER.iter().enumerate() {
            if let Some(v) = slots[i + 1] {
                carried = v;
            }
            prop_assert_eq!(map.get(name).copied(), Some(ResolvedWidth::fixed(carried)));
        }
    }

    #[test]
    fn viewport_specs_scale_with_thresholds(vw in 1u32..=100) {
        let table = BreakpointTable::default();
        let map = resolve_widths(&format!("{vw}vw"), &table).unwrap();
        for bp in table.iter() {
            let width = map.get(&bp.name).unwrap();
            prop_assert_eq!(width.vw, vw);
            prop_assert_eq!(u64::from(width.value), u64::from(bp.threshold) * u64::from(vw) / 100);
        }
        let sizes = compute_sizes(&map, &table);
        if vw == 100 {
            prop_assert_eq!(sizes, "100vw");
        } else {
            let parts: Vec<&str> = sizes.split(", ").collect();
            prop_assert_eq!(parts.len(), table.iter().count() + 1);
            let size = format!("{vw}vw");
            let all_parts_match = parts.iter().all(|part| part.ends_with(&format!(" {size}")) || *part == size);
            prop_assert!(all_parts_match);
            prop_assert_eq!(parts.last().copied(), Some(size.as_str()));
        }
    }

    #[test]
    fn resolution_is_idempotent(
        vw in 1u32..=100,
        switch_at in 0usize..5,
        fixed in 1u32..3000,
    ) {
        let table = BreakpointTable::default();
        let spec = format!("{vw}vw {}:{fixed}", LADDER[switch_at]);
        let once = resolve_widths(&spec, &table).unwrap();
        let twice = propagate(&once, &table).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn attributes_have_no_duplicates(
        vw in 1u32..=100,
        tail in prop::collection::vec(prop::option::of(1u32..3000), 5),
    ) {
        let table = BreakpointTable::default();
        let mut tokens = vec![format!("{vw}vw")];
        for (name, value) in LADDER.iter().zip(&tail) {
            if let Some(v) = value {
                tokens.push(format!("{name}:{v}"));
            }
        }
        let map = resolve_widths(&tokens.join(" "), &table).unwrap();

        let sizes = compute_sizes(&map, &table);
        let parts: Vec<&str> = sizes.split(", ").collect();
        let unique: HashSet<&str> = parts.iter().copied().collect();
        prop_assert_eq!(parts.len(), unique.len());
        let largest = map.get("2xl").unwrap().size();
        prop_assert_eq!(parts.last().copied(), Some(largest.as_str()));

        let srcset = compute_srcset("a.jpg", &map, |src, w| format!("{src}?w={w}"));
        let descriptors: Vec<&str> = srcset
            .split(", ")
            .map(|c| c.rsplit(' ').next().unwrap())
            .collect();
        let unique: HashSet<&str> = descriptors.iter().copied().collect();
        prop_assert_eq!(descriptors.len(), unique.len());
    }
}
