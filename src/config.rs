//! Pipeline configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by an optional `config.toml` placed in the content root:
//!
//! ```text
//! content/projects/
//! ├── config.toml          # Optional overrides (a file, so never a project)
//! ├── alpha/
//! │   ├── thumbnail.jpg
//! │   └── images/
//! └── beta/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! skip_suffixes = [".zip"]      # Project dirs ending in these are ignored
//!
//! [thumbnail]
//! filename = "thumbnail"        # Canonical thumbnail stem
//! extensions = ["jpg", "jpeg", "png"]
//! width = 300
//! height = 400
//! avif_quality = 75
//! webp_quality = 80
//!
//! [gallery]
//! dir = "images"
//! extensions = ["jpg", "jpeg", "png", "webp"]
//! suffix = "_thumb"
//! width = 300
//! height = 300
//! avif_quality = 70
//! webp_quality = 75
//!
//! [encoding]
//! avif_speed = 6                # rav1e speed, 1 (slow, small) - 10
//!
//! [processing]
//! max_processes = 4             # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{Codec, EncodeProfile, Footprint, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the optional config file inside the content root.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `config.toml`.
///
/// Footprints, allow-lists and quality presets live here and are passed
/// explicitly into enumeration and transcoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Project directory names ending in any of these are skipped (archives).
    pub skip_suffixes: Vec<String>,
    /// Per-project thumbnail settings.
    pub thumbnail: ThumbnailConfig,
    /// Per-project gallery settings.
    pub gallery: GalleryConfig,
    /// Encoder effort settings.
    pub encoding: EncodingConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            skip_suffixes: vec![".zip".to_string()],
            thumbnail: ThumbnailConfig::default(),
            gallery: GalleryConfig::default(),
            encoding: EncodingConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_quality("thumbnail.avif_quality", self.thumbnail.avif_quality)?;
        check_quality("thumbnail.webp_quality", self.thumbnail.webp_quality)?;
        check_quality("gallery.avif_quality", self.gallery.avif_quality)?;
        check_quality("gallery.webp_quality", self.gallery.webp_quality)?;
        check_footprint("thumbnail", self.thumbnail.width, self.thumbnail.height)?;
        check_footprint("gallery", self.gallery.width, self.gallery.height)?;
        check_extensions("thumbnail.extensions", &self.thumbnail.extensions)?;
        check_extensions("gallery.extensions", &self.gallery.extensions)?;

        // thumbnail.webp is itself a derivative; it can never be a source
        if let Some(ext) = self
            .thumbnail
            .extensions
            .iter()
            .find(|ext| Codec::from_extension(ext).is_some())
        {
            return Err(ConfigError::Validation(format!(
                "thumbnail.extensions must not contain output format '{ext}'"
            )));
        }
        if self.thumbnail.filename.is_empty() {
            return Err(ConfigError::Validation(
                "thumbnail.filename must not be empty".into(),
            ));
        }
        if self.gallery.dir.is_empty() {
            return Err(ConfigError::Validation(
                "gallery.dir must not be empty".into(),
            ));
        }
        if self.gallery.suffix.is_empty() {
            return Err(ConfigError::Validation(
                "gallery.suffix must not be empty".into(),
            ));
        }
        if !(1..=10).contains(&self.encoding.avif_speed) {
            return Err(ConfigError::Validation(
                "encoding.avif_speed must be 1-10".into(),
            ));
        }
        Ok(())
    }

    /// Encoding profile for project thumbnails.
    pub fn thumbnail_profile(&self) -> EncodeProfile {
        EncodeProfile {
            footprint: Footprint::new(self.thumbnail.width, self.thumbnail.height),
            avif_quality: Quality::new(self.thumbnail.avif_quality),
            webp_quality: Quality::new(self.thumbnail.webp_quality),
            avif_speed: self.encoding.avif_speed,
        }
    }

    /// Encoding profile for gallery images.
    pub fn gallery_profile(&self) -> EncodeProfile {
        EncodeProfile {
            footprint: Footprint::new(self.gallery.width, self.gallery.height),
            avif_quality: Quality::new(self.gallery.avif_quality),
            webp_quality: Quality::new(self.gallery.webp_quality),
            avif_speed: self.encoding.avif_speed,
        }
    }
}

fn check_quality(key: &str, value: u32) -> Result<(), ConfigError> {
    if !(1..=100).contains(&value) {
        return Err(ConfigError::Validation(format!("{key} must be 1-100")));
    }
    Ok(())
}

fn check_footprint(section: &str, width: u32, height: u32) -> Result<(), ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::Validation(format!(
            "{section}.width and {section}.height must be non-zero"
        )));
    }
    Ok(())
}

fn check_extensions(key: &str, extensions: &[String]) -> Result<(), ConfigError> {
    if extensions.is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    if let Some(bad) = extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
        return Err(ConfigError::Validation(format!(
            "{key} entries are bare extensions like \"jpg\", got \"{bad}\""
        )));
    }
    Ok(())
}

/// Project thumbnail settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// Canonical source stem: `thumbnail` finds `thumbnail.jpg`.
    pub filename: String,
    /// Source extensions tried in order; the first existing file wins.
    pub extensions: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub avif_quality: u32,
    pub webp_quality: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            filename: "thumbnail".to_string(),
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            width: 300,
            height: 400,
            avif_quality: 75,
            webp_quality: 80,
        }
    }
}

/// Project gallery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Gallery subdirectory inside each project.
    pub dir: String,
    /// Source extension allow-list (case-insensitive).
    pub extensions: Vec<String>,
    /// Appended to the source base name: `a.jpg` → `a_thumb.avif`.
    pub suffix: String,
    pub width: u32,
    pub height: u32,
    pub avif_quality: u32,
    pub webp_quality: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            dir: "images".to_string(),
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into(), "webp".into()],
            suffix: "_thumb".to_string(),
            width: 300,
            height: 300,
            avif_quality: 70,
            webp_quality: 75,
        }
    }
}

/// Encoder effort settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// rav1e speed preset (1 = slowest/smallest, 10 = fastest).
    pub avif_speed: u8,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self { avif_speed: 6 }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel transcode workers.
    /// When absent or null, defaults to the number of CPU cores.
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

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PipelineConfig::default()).expect("default config must serialize")
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PipelineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio-assets configuration
# ==========================
# Place this file in the content root (next to the project directories).
# All settings are optional; values shown are the defaults.
# Unknown keys will cause an error.

# Project directories whose names end in one of these are ignored.
# Names starting with "." are always ignored.
skip_suffixes = [".zip"]

# ---------------------------------------------------------------------------
# Project thumbnails: <project>/thumbnail.<ext> -> thumbnail.avif + .webp
# ---------------------------------------------------------------------------
[thumbnail]
# Canonical source file stem.
filename = "thumbnail"
# Source extensions tried in order; the first existing file is used.
# Output formats (avif, webp) are not allowed here.
extensions = ["jpg", "jpeg", "png"]
# Exact output size. Sources are scaled to cover it and center-cropped.
width = 300
height = 400
# Encoding quality (1-100).
avif_quality = 75
webp_quality = 80

# ---------------------------------------------------------------------------
# Gallery images: <project>/images/<base>.<ext> -> <base>_thumb.avif + .webp
# ---------------------------------------------------------------------------
[gallery]
# Gallery folder inside each project. Projects without one are fine.
dir = "images"
# Source extensions (case-insensitive).
extensions = ["jpg", "jpeg", "png", "webp"]
# Appended to the source base name for derived files.
# When two sources share a base name (a.jpg, a.png) both use
# <base>.<ext><suffix> instead (a.jpg_thumb.avif, a.png_thumb.avif).
suffix = "_thumb"
width = 300
height = 300
avif_quality = 70
webp_quality = 75

# ---------------------------------------------------------------------------
# Encoder effort
# ---------------------------------------------------------------------------
[encoding]
# rav1e speed preset: 1 = slowest / smallest files, 10 = fastest.
avif_speed = 6

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel transcode workers. Omit for auto (= number of CPU cores).
# Values above the core count are clamped down. Use 1 for sequential runs.
# max_processes = 4
"##
}
