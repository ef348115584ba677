//! Placeholder images from placehold.co, for development and demos.
//!
//! The source path is ignored: the URL only encodes dimensions, colours and
//! a caption.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;

use super::{ModifierMapper, is_unmappable};
use crate::modifiers::{ModifierSet, ModifierValue};

const FORM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

const DEFAULT_WIDTH: i64 = 600;
const DEFAULT_BACKGROUND: &str = "868e96";
const DEFAULT_TEXT_COLOR: &str = "FFFFFF";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    pub base_url: String,
    pub defaults: ModifierSet,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://placehold.co".to_string(),
            defaults: ModifierSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderProvider {
    config: PlaceholderConfig,
}

impl PlaceholderProvider {
    pub fn new(config: PlaceholderConfig) -> Self {
        Self { config }
    }
}

/// `application/x-www-form-urlencoded` text: spaces become `+`.
fn form_encode(text: &str) -> String {
    utf8_percent_encode(text, FORM)
        .to_string()
        .replace("%20", "+")
}

fn colour(value: Option<&ModifierValue>, fallback: &str) -> String {
    value
        .map(ModifierValue::to_string)
        .unwrap_or_else(|| fallback.to_string())
        .trim_start_matches('#')
        .to_string()
}

impl ModifierMapper for PlaceholderProvider {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn build_url(&self, _src: &str, modifiers: &ModifierSet) -> String {
        let merged = modifiers.merged_over(&self.config.defaults);
        let dimension = |key: &str| {
            merged
                .get(key)
                .filter(|value| !is_unmappable(self.name(), key, value))
                .and_then(ModifierValue::as_int)
                .filter(|&px| px > 0)
        };

        let width = dimension("width").unwrap_or(DEFAULT_WIDTH);
        let height = dimension("height").unwrap_or(width);
        let background = colour(merged.get("background"), DEFAULT_BACKGROUND);
        let text_color = colour(merged.get("text_color"), DEFAULT_TEXT_COLOR);
        let text = merged
            .get("text")
            .map(ModifierValue::to_string)
            .unwrap_or_else(|| format!("{width}x{height}"));

        format!(
            "{}/{width}x{height}/{background}/{text_color}?text={}",
            self.config.base_url.trim_end_matches('/'),
            form_encode(&text)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(modifiers: ModifierSet) -> String {
        PlaceholderProvider::default().build_url("ignored.jpg", &modifiers)
    }

    #[test]
    fn defaults_to_square_600() {
        assert_eq!(
            url(ModifierSet::new()),
            "https://placehold.co/600x600/868e96/FFFFFF?text=600x600"
        );
    }

    #[test]
    fn height_defaults_to_width() {
        assert_eq!(
            url(ModifierSet::new().with("width", 320)),
            "https://placehold.co/320x320/868e96/FFFFFF?text=320x320"
        );
    }

    #[test]
    fn colours_lose_their_hash() {
        let modifiers = ModifierSet::new()
            .with("width", 300)
            .with("height", 200)
            .with("background", "#000000")
            .with("text_color", "#ff0");
        assert_eq!(
            url(modifiers),
            "https://placehold.co/300x200/000000/ff0?text=300x200"
        );
    }

    #[test]
    fn text_is_form_encoded() {
        let modifiers = ModifierSet::new().with("text", "Hello world & co");
        assert!(url(modifiers).ends_with("?text=Hello+world+%26+co"));
    }

    #[test]
    fn viewport_width_falls_back_to_default() {
        assert!(url(ModifierSet::new().with("width", "50vw")).contains("/600x600/"));
    }

    #[test]
    fn non_positive_dimensions_fall_back_to_defaults() {
        assert_eq!(
            url(ModifierSet::new().with("width", -5)),
            "https://placehold.co/600x600/868e96/FFFFFF?text=600x600"
        );
        assert!(url(ModifierSet::new().with("width", 300).with("height", 0)).contains("/300x300/"));
        assert!(url(ModifierSet::new().with("width", "-40")).contains("/600x600/"));
    }
}
