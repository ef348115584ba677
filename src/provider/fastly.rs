//! Fastly Image Optimizer: modifiers become query parameters.

use indexmap::IndexMap;
use serde::Deserialize;

use super::{ModifierMapper, is_unmappable, skip_unknown, strip_leading_slash};
use crate::modifiers::ModifierSet;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FastlyConfig {
    pub base_url: String,
    #[serde(default)]
    pub defaults: ModifierSet,
    /// Raw query parameters placed before every mapped modifier
    /// (e.g. `auto = "webp"`).
    #[serde(default)]
    pub default_params: IndexMap<String, String>,
}

impl FastlyConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            defaults: ModifierSet::new(),
            default_params: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FastlyProvider {
    config: FastlyConfig,
}

impl FastlyProvider {
    pub fn new(config: FastlyConfig) -> Self {
        Self { config }
    }
}

fn param_key(key: &str) -> Option<&'static str> {
    Some(match key {
        "width" => "width",
        "height" => "height",
        "format" => "format",
        "quality" => "quality",
        "fit" => "fit",
        "background" => "bg-color",
        "ratio" => "aspect-ratio",
        _ => return None,
    })
}

fn fit_value(fit: &str) -> Option<&'static str> {
    match fit {
        "fill" | "inside" | "outside" => Some("crop"),
        "cover" | "contain" => Some("bounds"),
        _ => None,
    }
}

/// `16:9` → `16/9`; anything not of that exact shape passes through.
fn ratio_value(ratio: &str) -> String {
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match ratio.split_once(':') {
        Some((w, h)) if numeric(w) && numeric(h) => format!("{w}/{h}"),
        _ => ratio.to_string(),
    }
}

impl ModifierMapper for FastlyProvider {
    fn name(&self) -> &str {
        "fastly"
    }

    fn build_url(&self, src: &str, modifiers: &ModifierSet) -> String {
        let src = strip_leading_slash(src);
        let merged = modifiers.merged_over(&self.config.defaults);

        let mut params: Vec<String> = self
            .config
            .default_params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();

        for (key, value) in merged.iter() {
            if is_unmappable(self.name(), key, value) {
                continue;
            }
            let Some(target) = param_key(key) else {
                skip_unknown(self.name(), key);
                continue;
            };
            let raw = value.to_string();
            let value = match key {
                "fit" => fit_value(&raw).map(str::to_string).unwrap_or(raw),
                "background" => raw.trim_start_matches('#').to_string(),
                "ratio" => ratio_value(&raw),
                _ => raw,
            };
            params.push(format!("{target}={value}"));
        }

        let base = self.config.base_url.trim_end_matches('/');
        if params.is_empty() {
            format!("{base}/{src}")
        } else {
            format!("{base}/{src}?{}", params.join("&"))
        }
    }
}
