//! Configuration module.
//!
//! Handles loading, validating, and merging `respimg.toml`. The stock
//! defaults are the base layer; a user file overrides any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! provider = "placeholder"   # Provider used when a request names none
//!
//! [breakpoints]              # Ordered, strictly increasing pixel thresholds
//! sm = 640
//! md = 768
//! lg = 1024
//! xl = 1280
//! 2xl = 1536
//!
//! [defaults]                 # Modifiers applied under every request
//! format = "webp"
//! quality = 80
//! fit = "cover"
//!
//! [providers.cloudinary]
//! base_url = "https://res.cloudinary.com/demo/image/upload"
//! defaults = { quality = "auto" }
//!
//! [providers.fastly]
//! base_url = "https://images.example.com"   # Required
//! default_params = { auto = "webp" }
//!
//! [providers.liip_imagine]
//! base_url = "/media/cache/resolve"
//! filter = "default"
//! secret = "change-me"
//!
//! [providers.placeholder]
//! base_url = "https://placehold.co"
//!
//! [presets.hero]             # Named request defaults
//! width = "100vw"
//! densities = "1x 2x"
//! fit = "cover"
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want. Tables merge
//! key by key, except `[breakpoints]`: a user ladder replaces the stock one
//! entirely so its order is exactly the order written.
//!
//! Unknown keys are rejected to catch typos early.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::modifiers::ModifierSet;
use crate::provider::{CloudinaryConfig, FastlyConfig, LiipConfig, PlaceholderConfig};
use crate::render::Fallback;
use crate::width::{BreakpointTable, density_widths, resolve_widths};

/// Tables a user layer replaces instead of merging into.
const REPLACED_TABLES: &[&str] = &["breakpoints"];

/// Fit values understood by every provider.
const FITS: &[&str] = &["cover", "contain", "fill", "inside", "outside"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `respimg.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default provider name.
    pub provider: String,
    /// Breakpoint ladder, name → min-width threshold in pixels.
    pub breakpoints: IndexMap<String, u32>,
    /// Modifier defaults layered under every request.
    pub defaults: ModifierDefaults,
    /// Per-provider settings; a provider is enabled by its table.
    pub providers: ProvidersConfig,
    /// Named request presets.
    pub presets: IndexMap<String, Preset>,
    /// Parallel batch rendering settings.
    pub processing: ProcessingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "placeholder".to_string(),
            breakpoints: BreakpointTable::default()
                .iter()
                .map(|bp| (bp.name.clone(), bp.threshold))
                .collect(),
            defaults: ModifierDefaults::default(),
            providers: ProvidersConfig::default(),
            presets: IndexMap::new(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl Config {
    /// The configured breakpoint ladder as a validated table.
    pub fn breakpoint_table(&self) -> Result<BreakpointTable, ConfigError> {
        BreakpointTable::new(self.breakpoints.iter().map(|(name, px)| (name.as_str(), *px)))
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    /// Names of the providers this config enables, in registration order.
    pub fn enabled_providers(&self) -> Vec<&'static str> {
        let mut names = vec!["placeholder"];
        if self.providers.cloudinary.is_some() {
            names.push("cloudinary");
        }
        if self.providers.fastly.is_some() {
            names.push("fastly");
        }
        if self.providers.liip_imagine.is_some() {
            names.push("liip_imagine");
        }
        names
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let table = self.breakpoint_table()?;

        let enabled = self.enabled_providers();
        if !enabled.contains(&self.provider.as_str()) {
            return Err(ConfigError::Validation(format!(
                "provider \"{}\" is not configured (enabled: {})",
                self.provider,
                enabled.join(", ")
            )));
        }

        check_quality("defaults.quality", self.defaults.quality)?;
        check_fit("defaults.fit", self.defaults.fit.as_deref())?;

        for (name, preset) in &self.presets {
            check_quality(&format!("presets.{name}.quality"), preset.quality)?;
            check_fit(&format!("presets.{name}.fit"), preset.fit.as_deref())?;
            if let Some(spec) = &preset.width {
                resolve_widths(spec, &table).map_err(|e| {
                    ConfigError::Validation(format!("presets.{name}.width: {e}"))
                })?;
            }
            if let Some(densities) = &preset.densities {
                density_widths(1, densities).map_err(|e| {
                    ConfigError::Validation(format!("presets.{name}.densities: {e}"))
                })?;
            }
        }
        Ok(())
    }
}

fn check_quality(field: &str, quality: Option<u32>) -> Result<(), ConfigError> {
    match quality {
        Some(q) if !(1..=100).contains(&q) => Err(ConfigError::Validation(format!(
            "{field} must be 1-100, got {q}"
        ))),
        _ => Ok(()),
    }
}

fn check_fit(field: &str, fit: Option<&str>) -> Result<(), ConfigError> {
    match fit {
        Some(fit) if !FITS.contains(&fit) => Err(ConfigError::Validation(format!(
            "{field} must be one of {}, got \"{fit}\"",
            FITS.join(", ")
        ))),
        _ => Ok(()),
    }
}

/// Modifier defaults for every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModifierDefaults {
    pub format: Option<String>,
    pub quality: Option<u32>,
    pub fit: Option<String>,
}

impl ModifierDefaults {
    pub fn to_modifiers(&self) -> ModifierSet {
        let mut set = ModifierSet::new();
        if let Some(format) = &self.format {
            set.insert("format", format);
        }
        if let Some(quality) = self.quality {
            set.insert("quality", quality);
        }
        if let Some(fit) = &self.fit {
            set.insert("fit", fit);
        }
        set
    }
}

/// Provider tables. Absent tables leave the provider unregistered
/// (`placeholder` is always registered).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvidersConfig {
    pub cloudinary: Option<CloudinaryConfig>,
    pub fastly: Option<FastlyConfig>,
    pub liip_imagine: Option<LiipConfig>,
    pub placeholder: Option<PlaceholderConfig>,
}

/// Named bundle of request defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Preset {
    pub width: Option<String>,
    pub densities: Option<String>,
    pub ratio: Option<String>,
    pub fit: Option<String>,
    pub focal: Option<String>,
    pub quality: Option<u32>,
    pub format: Option<String>,
    pub fallback: Option<Fallback>,
    pub background: Option<String>,
    pub sizes: Option<String>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel rendering workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// The stock config as a `toml::Value::Table`, parsed from
/// [`stock_config_toml`]. This is the base layer for user overrides.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::from_str(stock_config_toml())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value. A missing file is not an error.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using stock defaults");
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Layer `overlay` over `base`, deserialize, and validate.
pub fn resolve_config(
    mut base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => {
            if let (Some(base_table), Some(ov_table)) = (base.as_table_mut(), ov.as_table()) {
                for key in REPLACED_TABLES {
                    if ov_table.contains_key(*key) {
                        base_table.remove(*key);
                    }
                }
            }
            merge_toml(base, ov)
        }
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `path` over the stock defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// A documented stock `respimg.toml`. Parses to [`Config::default`].
pub fn stock_config_toml() -> &'static str {
    r##"# respimg configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Provider used when a request does not name one. Must be "placeholder" or a
# provider with a [providers.<name>] table below.
provider = "placeholder"

# ---------------------------------------------------------------------------
# Breakpoints
# ---------------------------------------------------------------------------
# Min-width thresholds in pixels, smallest first. Width specs refer to these
# names ("50vw lg:400px"). A [breakpoints] table in your file replaces this
# ladder entirely.
[breakpoints]
sm = 640
md = 768
lg = 1024
xl = 1280
2xl = 1536

# ---------------------------------------------------------------------------
# Modifier defaults
# ---------------------------------------------------------------------------
# Applied under every request (request and preset values win).
[defaults]
# format = "webp"
# quality = 80        # 1-100
# fit = "cover"       # cover | contain | fill | inside | outside

# ---------------------------------------------------------------------------
# Providers
# ---------------------------------------------------------------------------
# "placeholder" is always available. Uncomment a table to enable a provider.

# [providers.cloudinary]
# base_url = "https://res.cloudinary.com/<cloud>/image/upload"
# defaults = { quality = "auto" }

# [providers.fastly]
# base_url = "https://images.example.com"   # required
# default_params = { auto = "webp" }        # raw query parameters, sent first

# [providers.liip_imagine]
# base_url = "/media/cache/resolve"
# filter = "default"
# secret = "change-me"                      # signs runtime filter URLs

# [providers.placeholder]
# base_url = "https://placehold.co"

# ---------------------------------------------------------------------------
# Presets
# ---------------------------------------------------------------------------
# Named bundles of request defaults, selected with `preset = "<name>"`.
# Keys: width, densities, ratio, fit, focal, quality, format, fallback,
# background, sizes.

# [presets.hero]
# width = "100vw"
# densities = "1x 2x"
# fit = "cover"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for batch rendering.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
