//! Request → `src`/`srcset`/`sizes` rendering.
//!
//! A [`Renderer`] ties the width engine to a provider: it resolves the
//! request's width spec, picks the eagerly loaded width, and asks the provider
//! for one URL per candidate width.
//!
//! ## Layering
//!
//! Request values win over the named preset, which wins over the configured
//! modifier defaults (`format`, `quality`, `fit`).
//!
//! ## Fallback
//!
//! `fallback` only affects the main `src`: `auto` picks `png` for sources
//! that may carry transparency (`png`, `webp`, `gif`) and `jpg` otherwise,
//! `empty` replaces the URL with a 1×1 transparent GIF, and anything else is
//! used as the format. `srcset` candidates use `format` instead.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ModifierDefaults, Preset};
use crate::modifiers::ModifierSet;
use crate::provider::{ModifierMapper, ProviderError, ProviderRegistry};
use crate::width::{
    self, BreakpointTable, WidthError, compute_sizes, compute_srcset, density_widths,
    initial_width, resolve_widths, srcset_for_widths,
};

/// 1×1 transparent GIF used by `fallback = "empty"`.
pub const EMPTY_GIF: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Image src cannot be empty")]
    EmptySource,
    #[error("Width error: {0}")]
    Width(#[from] WidthError),
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Format forced on the main `src`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Fallback {
    /// `png` for transparency-capable sources, else `jpg`.
    Auto,
    /// The empty GIF instead of a provider URL.
    Empty,
    Format(String),
}

impl From<String> for Fallback {
    fn from(value: String) -> Self {
        match value.as_str() {
            "auto" => Self::Auto,
            "empty" => Self::Empty,
            _ => Self::Format(value),
        }
    }
}

impl From<&str> for Fallback {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Fallback> for String {
    fn from(value: Fallback) -> Self {
        match value {
            Fallback::Auto => "auto".to_string(),
            Fallback::Empty => "empty".to_string(),
            Fallback::Format(format) => format,
        }
    }
}

/// One image to render. Everything except `src` is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageRequest {
    pub src: String,
    /// Width spec, e.g. `"300"` or `"50vw lg:400px"`.
    pub width: Option<String>,
    /// Pixel densities, e.g. `"1x 2x"`.
    pub densities: Option<String>,
    pub format: Option<String>,
    pub fallback: Option<Fallback>,
    pub quality: Option<u32>,
    pub fit: Option<String>,
    pub focal: Option<String>,
    pub background: Option<String>,
    pub ratio: Option<String>,
    /// Explicit `sizes`, overriding the computed one.
    pub sizes: Option<String>,
    pub preset: Option<String>,
    pub provider: Option<String>,
}

impl ImageRequest {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }

    pub fn with_width(mut self, spec: impl Into<String>) -> Self {
        self.width = Some(spec.into());
        self
    }

    pub fn with_densities(mut self, spec: impl Into<String>) -> Self {
        self.densities = Some(spec.into());
        self
    }

    /// Fill unset fields from a preset.
    fn fill_from_preset(&mut self, preset: &Preset) {
        fn fill<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(value);
            }
        }
        fill(&mut self.width, &preset.width);
        fill(&mut self.densities, &preset.densities);
        fill(&mut self.format, &preset.format);
        fill(&mut self.fallback, &preset.fallback);
        fill(&mut self.quality, &preset.quality);
        fill(&mut self.fit, &preset.fit);
        fill(&mut self.focal, &preset.focal);
        fill(&mut self.background, &preset.background);
        fill(&mut self.ratio, &preset.ratio);
        fill(&mut self.sizes, &preset.sizes);
    }

    fn fill_from_defaults(&mut self, defaults: &ModifierDefaults) {
        if self.format.is_none() {
            self.format.clone_from(&defaults.format);
        }
        self.quality = self.quality.or(defaults.quality);
        if self.fit.is_none() {
            self.fit.clone_from(&defaults.fit);
        }
    }

    /// Lowercased file extension of `src`, ignoring any query string.
    fn extension(&self) -> String {
        let path = self.src.split(['?', '#']).next().unwrap_or_default();
        Path::new(path)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// Attributes of a rendered image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedImage {
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srcset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    /// Width of the main `src`, when the request had a width spec.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    pub provider: String,
}

pub struct Renderer<'a> {
    registry: &'a ProviderRegistry,
    table: &'a BreakpointTable,
    defaults: ModifierDefaults,
    presets: IndexMap<String, Preset>,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a ProviderRegistry, table: &'a BreakpointTable) -> Self {
        Self {
            registry,
            table,
            defaults: ModifierDefaults::default(),
            presets: IndexMap::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: ModifierDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_presets(mut self, presets: IndexMap<String, Preset>) -> Self {
        self.presets = presets;
        self
    }

    /// Request with preset and configured defaults layered underneath.
    pub fn effective_request(&self, request: &ImageRequest) -> ImageRequest {
        let mut effective = request.clone();
        if let Some(name) = request.preset.as_deref() {
            match self.presets.get(name) {
                Some(preset) => effective.fill_from_preset(preset),
                None => warn!(preset = name, "unknown preset, ignored"),
            }
        }
        effective.fill_from_defaults(&self.defaults);
        effective
    }

    pub fn render(&self, request: &ImageRequest) -> Result<RenderedImage, RenderError> {
        let request = self.effective_request(request);
        if request.src.trim().is_empty() {
            return Err(RenderError::EmptySource);
        }
        let mapper = self.registry.resolve(request.provider.as_deref())?;
        let urls = UrlBuilder {
            request: &request,
            mapper,
        };

        let mut rendered = RenderedImage {
            src: String::new(),
            srcset: None,
            sizes: None,
            width: None,
            provider: mapper.name().to_string(),
        };

        let Some(spec) = request.width.as_deref() else {
            rendered.src = urls.main(None);
            rendered.sizes = request.sizes.clone();
            return Ok(rendered);
        };

        let widths = resolve_widths(spec, self.table)?;
        let base = initial_width(&widths, spec);
        rendered.src = urls.main(base);
        rendered.width = base;

        let responsive = width::is_responsive_spec(spec);
        let densities = request
            .densities
            .as_deref()
            .filter(|d| !d.trim().is_empty());

        match (densities, base) {
            (Some(densities), Some(base)) => {
                let density = density_widths(base, densities)?;
                if responsive {
                    let mut all: Vec<u32> = widths.values().map(|w| w.value).collect();
                    all.extend(density);
                    all.sort_unstable();
                    all.dedup();
                    rendered.srcset = Some(srcset_for_widths(&request.src, &all, |src, w| {
                        urls.candidate(src, w)
                    }));
                    rendered.sizes = Some(compute_sizes(&widths, self.table));
                } else {
                    rendered.srcset = Some(srcset_for_widths(&request.src, &density, |src, w| {
                        urls.candidate(src, w)
                    }));
                }
            }
            _ if responsive => {
                rendered.srcset = Some(compute_srcset(&request.src, &widths, |src, w| {
                    urls.candidate(src, w)
                }));
                rendered.sizes = Some(compute_sizes(&widths, self.table));
            }
            _ => {}
        }

        if request.sizes.is_some() {
            rendered.sizes = request.sizes.clone();
        }
        debug!(src = %request.src, provider = %rendered.provider, width = ?rendered.width, "rendered image");
        Ok(rendered)
    }
}

/// Builds provider URLs for one effective request.
struct UrlBuilder<'r> {
    request: &'r ImageRequest,
    mapper: &'r dyn ModifierMapper,
}

impl UrlBuilder<'_> {
    /// The main `src`, with fallback handling.
    fn main(&self, width: Option<u32>) -> String {
        let format = match &self.request.fallback {
            Some(Fallback::Empty) => return EMPTY_GIF.to_string(),
            Some(Fallback::Auto) => {
                let transparent = matches!(self.request.extension().as_str(), "png" | "webp" | "gif");
                Some(if transparent { "png" } else { "jpg" }.to_string())
            }
            Some(Fallback::Format(format)) => Some(format.clone()),
            None => self.explicit_format(),
        };
        let modifiers = self.modifiers(width, format);
        self.mapper.build_url(&self.request.src, &modifiers)
    }

    /// One `srcset` candidate.
    fn candidate(&self, src: &str, width: u32) -> String {
        let modifiers = self.modifiers(Some(width), self.explicit_format());
        self.mapper.build_url(src, &modifiers)
    }

    fn explicit_format(&self) -> Option<String> {
        self.request.format.clone().filter(|f| f != "auto")
    }

    fn modifiers(&self, width: Option<u32>, format: Option<String>) -> ModifierSet {
        let request = self.request;
        let mut modifiers = ModifierSet::new();
        if let Some(width) = width {
            modifiers.insert("width", width);
        }
        if let Some(format) = format {
            modifiers.insert("format", format);
        }
        if let Some(quality) = request.quality {
            modifiers.insert("quality", quality);
        }
        let optional = [
            ("fit", &request.fit),
            ("focal", &request.focal),
            ("background", &request.background),
            ("ratio", &request.ratio),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                modifiers.insert(key, value);
            }
        }
        modifiers
    }
}

/// Render many requests in parallel; results keep input order.
pub fn render_batch(
    renderer: &Renderer<'_>,
    requests: &[ImageRequest],
) -> Vec<Result<RenderedImage, RenderError>> {
    requests
        .par_iter()
        .map(|request| renderer.render(request))
        .collect()
}
