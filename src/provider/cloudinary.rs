//! Cloudinary: comma-joined `k_v` transformations in the URL path.
//!
//! `width`, `height`, `quality` and `format` always lead, in that order; every
//! other transformation follows in the order its modifier was given.

use serde::Deserialize;

use super::{ModifierMapper, is_unmappable, skip_unknown, strip_leading_slash};
use crate::modifiers::ModifierSet;

const UPLOAD_MARKER: &str = "/upload/";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CloudinaryConfig {
    /// Delivery base, e.g. `https://res.cloudinary.com/<cloud>/image/upload`.
    pub base_url: String,
    /// Modifiers applied under every request.
    pub defaults: ModifierSet,
}

#[derive(Debug, Clone)]
pub struct CloudinaryProvider {
    config: CloudinaryConfig,
}

impl CloudinaryProvider {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self { config }
    }
}

fn transformation_key(key: &str) -> Option<&'static str> {
    Some(match key {
        "width" => "w",
        "height" => "h",
        "format" => "f",
        "quality" => "q",
        "fit" => "c",
        "focal" | "gravity" => "g",
        "background" => "b",
        "ratio" | "aspectRatio" => "ar",
        "roundCorner" => "r",
        "rotate" => "a",
        "effect" => "e",
        "color" => "co",
        "flags" => "fl",
        "dpr" => "dpr",
        "opacity" => "o",
        "overlay" => "l",
        "underlay" => "u",
        "transformation" => "t",
        "zoom" => "z",
        "colorSpace" => "cs",
        "customFunc" => "fn",
        "density" => "dn",
        "blur" => "e_blur",
        _ => return None,
    })
}

fn fit_value(fit: &str) -> Option<&'static str> {
    Some(match fit {
        "fill" => "fill",
        "inside" => "pad",
        "outside" => "lpad",
        "cover" => "lfill",
        "contain" => "scale",
        "minCover" => "mfit",
        "minInside" => "mpad",
        "thumbnail" => "thumb",
        "cropping" => "crop",
        "coverLimit" => "limit",
        _ => return None,
    })
}

fn gravity_value(gravity: &str) -> Option<&'static str> {
    Some(match gravity {
        "auto" => "auto",
        "subject" => "auto:subject",
        "face" => "face",
        "sink" => "sink",
        "faceCenter" => "face:center",
        "multipleFaces" => "faces",
        "multipleFacesCenter" => "faces:center",
        "north" => "north",
        "northEast" => "north_east",
        "northWest" => "north_west",
        "west" => "west",
        "southWest" => "south_west",
        "south" => "south",
        "southEast" => "south_east",
        "east" => "east",
        "center" => "center",
        _ => return None,
    })
}

fn priority(key: &str) -> u8 {
    match key {
        "width" => 1,
        "height" => 2,
        "quality" => 3,
        "format" => 4,
        _ => u8::MAX,
    }
}

/// `#RRGGBB` → `rgb_RRGGBB`; anything else (named colours) passes through.
fn hex_to_rgb(value: &str) -> String {
    match value.strip_prefix('#') {
        Some(hex) => format!("rgb_{hex}"),
        None => value.to_string(),
    }
}

/// Map one modifier to its `(key, value)` transformation parts.
fn map_modifier(key: &str, raw: String) -> Option<(&'static str, String)> {
    let mut target = transformation_key(key)?;
    let value = match key {
        "fit" => fit_value(&raw).map(str::to_string).unwrap_or(raw),
        "format" if raw == "jpeg" => "jpg".to_string(),
        "gravity" => gravity_value(&raw).map(str::to_string).unwrap_or(raw),
        "background" | "color" => hex_to_rgb(&raw),
        "roundCorner" => raw.replace(':', "_"),
        "blur" => {
            target = "e";
            format!("blur:{raw}")
        }
        _ => raw,
    };
    Some((target, value))
}

impl ModifierMapper for CloudinaryProvider {
    fn name(&self) -> &str {
        "cloudinary"
    }

    fn build_url(&self, src: &str, modifiers: &ModifierSet) -> String {
        let mut src = strip_leading_slash(src);
        let mut base = self.config.base_url.as_str();

        // An already-uploaded asset URL carries its own delivery base.
        let remote = src.starts_with("http://") || src.starts_with("https://");
        if remote {
            if let Some(idx) = src.find(UPLOAD_MARKER) {
                let split = idx + UPLOAD_MARKER.len();
                base = &src[..split];
                src = &src[split..];
            }
        }

        let merged = modifiers.merged_over(&self.config.defaults);
        let mut transformations: Vec<(u8, String)> = Vec::new();
        for (key, value) in merged.iter() {
            if is_unmappable(self.name(), key, value) {
                continue;
            }
            let Some((target, value)) = map_modifier(key, value.to_string()) else {
                skip_unknown(self.name(), key);
                continue;
            };
            let part = if target.contains('_') {
                format!("{target}:{value}")
            } else {
                format!("{target}_{value}")
            };
            transformations.push((priority(key), part));
        }
        transformations.sort_by_key(|(rank, _)| *rank);

        let joined = transformations
            .into_iter()
            .map(|(_, part)| part)
            .collect::<Vec<_>>()
            .join(",");

        let base = base.trim_end_matches('/');
        if joined.is_empty() {
            format!("{base}/{src}")
        } else {
            format!("{base}/{joined}/{src}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> CloudinaryProvider {
        CloudinaryProvider::new(CloudinaryConfig {
            base_url: "https://res.cloudinary.com/demo".into(),
            defaults: ModifierSet::new().with("quality", "80").with("format", "jpeg"),
        })
    }

    fn url(modifiers: ModifierSet) -> String {
        provider().build_url("sample.jpg", &modifiers)
    }

    #[test]
    fn name_is_cloudinary() {
        assert_eq!(provider().name(), "cloudinary");
    }

    // =========================================================================
    // Ordering and defaults
    // =========================================================================

    #[test]
    fn basic_transformation() {
        let modifiers = ModifierSet::new().with("width", "300").with("height", "200");
        assert_eq!(
            url(modifiers),
            "https://res.cloudinary.com/demo/w_300,h_200,q_80,f_jpg/sample.jpg"
        );
    }

    #[test]
    fn fit_follows_priority_keys() {
        let modifiers = ModifierSet::new().with("width", 300).with("fit", "cover");
        assert_eq!(
            url(modifiers),
            "https://res.cloudinary.com/demo/w_300,q_80,f_jpg,c_lfill/sample.jpg"
        );
    }

    #[test]
    fn other_transformations_keep_encounter_order() {
        let modifiers = ModifierSet::new()
            .with("gravity", "face")
            .with("fit", "cover")
            .with("width", 300)
            .with("rotate", 90);
        assert_eq!(
            url(modifiers),
            "https://res.cloudinary.com/demo/w_300,q_80,f_jpg,g_face,c_lfill,a_90/sample.jpg"
        );
    }

    #[test]
    fn caller_format_overrides_default() {
        let modifiers = ModifierSet::new().with("format", "webp");
        assert_eq!(
            url(modifiers),
            "https://res.cloudinary.com/demo/q_80,f_webp/sample.jpg"
        );
    }

    // =========================================================================
    // Value mapping
    // =========================================================================

    #[test]
    fn gravity_mapping() {
        let modifiers = ModifierSet::new().with("gravity", "face");
        assert_eq!(
            url(modifiers),
            "https://res.cloudinary.com/demo/q_80,f_jpg,g_face/sample.jpg"
        );
        let modifiers = ModifierSet::new().with("gravity", "northEast");
        assert!(url(modifiers).contains("g_north_east"));
    }

    #[test]
    fn focal_passes_through() {
        let modifiers = ModifierSet::new().with("focal", "auto:subject");
        assert!(url(modifiers).contains(",g_auto:subject/"));
    }

    #[test]
    fn background_hex_becomes_rgb() {
        let modifiers = ModifierSet::new().with("background", "#ff0000");
        assert_eq!(
            url(modifiers),
            "https://res.cloudinary.com/demo/q_80,f_jpg,b_rgb_ff0000/sample.jpg"
        );
    }

    #[test]
    fn named_colour_passes_through() {
        let modifiers = ModifierSet::new().with("color", "red");
        assert!(url(modifiers).contains(",co_red/"));
    }

    #[test]
    fn round_corner_pair() {
        let modifiers = ModifierSet::new().with("roundCorner", "20:40");
        assert_eq!(
            url(modifiers),
            "https://res.cloudinary.com/demo/q_80,f_jpg,r_20_40/sample.jpg"
        );
        let modifiers = ModifierSet::new().with("roundCorner", "max");
        assert!(url(modifiers).contains(",r_max/"));
    }

    #[test]
    fn blur_is_an_effect() {
        let modifiers = ModifierSet::new().with("blur", "500");
        assert_eq!(
            url(modifiers),
            "https://res.cloudinary.com/demo/q_80,f_jpg,e_blur:500/sample.jpg"
        );
    }

    // =========================================================================
    // Dropped modifiers and sources
    // =========================================================================

    #[test]
    fn unsupported_modifiers_are_ignored() {
        let modifiers = ModifierSet::new().with("width", 300).with("unsupported", "value");
        assert_eq!(
            url(modifiers),
            "https://res.cloudinary.com/demo/w_300,q_80,f_jpg/sample.jpg"
        );
    }

    #[test]
    fn viewport_width_is_dropped() {
        let modifiers = ModifierSet::new().with("width", "50vw");
        assert_eq!(
            url(modifiers),
            "https://res.cloudinary.com/demo/q_80,f_jpg/sample.jpg"
        );
    }

    #[test]
    fn leading_slash_in_source() {
        let result = provider().build_url("/sample.jpg", &ModifierSet::new().with("width", 300));
        assert_eq!(
            result,
            "https://res.cloudinary.com/demo/w_300,q_80,f_jpg/sample.jpg"
        );
    }

    #[test]
    fn upload_url_supplies_its_own_base() {
        let p = provider();
        let remote = "https://res.cloudinary.com/other/image/upload/v1/folder/cat.jpg";
        assert_eq!(
            p.build_url(remote, &ModifierSet::new().with("width", 100)),
            "https://res.cloudinary.com/other/image/upload/w_100,q_80,f_jpg/v1/folder/cat.jpg"
        );
        // The configured base is untouched for the next call.
        assert_eq!(
            p.build_url("sample.jpg", &ModifierSet::new()),
            "https://res.cloudinary.com/demo/q_80,f_jpg/sample.jpg"
        );
    }

    #[test]
    fn no_transformations_yields_plain_path() {
        let p = CloudinaryProvider::new(CloudinaryConfig {
            base_url: "https://res.cloudinary.com/demo/".into(),
            defaults: ModifierSet::new(),
        });
        assert_eq!(
            p.build_url("sample.jpg", &ModifierSet::new()),
            "https://res.cloudinary.com/demo/sample.jpg"
        );
    }
}
