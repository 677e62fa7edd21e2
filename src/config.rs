//! Archive configuration.
//!
//! Handles loading, validating, and merging `keepsake.toml`. Stock defaults
//! are the base layer; a user file only overrides the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [auth.users]
//! "1234" = "Ilya"           # four-digit access code = display name
//!
//! [images]
//! max_size_kb = 500         # Budget for `keepsake compress`
//! photo_max_size_kb = 400   # Budget for photos saved to the archive
//! max_dimension = 1200      # Longest edge after resizing, in pixels
//! max_upload_mb = 10        # Largest accepted source file
//!
//! [dates]
//! locale = "ru"             # "ru" or "en"
//! together_since = "2022-02-14"
//!
//! [store]
//! data_dir = ".keepsake"    # Collections and session state
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::dates::{Locale, parse_date};
use crate::imaging::{CompressOptions, DEFAULT_MAX_SIZE_KB, MAX_DIMENSION};
use crate::validation::DEFAULT_MAX_UPLOAD_MB;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "keepsake.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Archive configuration loaded from `keepsake.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeepsakeConfig {
    /// Access codes.
    pub auth: AuthConfig,
    /// Compression budgets and upload limits.
    pub images: ImagesConfig,
    /// Date output settings.
    pub dates: DatesConfig,
    /// Where collections live.
    pub store: StoreConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl KeepsakeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (code, name) in &self.auth.users {
            if code.len() != 4 || !code.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ConfigError::Validation(format!(
                    "auth.users: access code '{code}' must be four digits"
                )));
            }
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "auth.users: code '{code}' has an empty name"
                )));
            }
        }
        if self.images.max_size_kb == 0 || self.images.photo_max_size_kb == 0 {
            return Err(ConfigError::Validation(
                "images size budgets must be non-zero".into(),
            ));
        }
        if self.images.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "images.max_dimension must be non-zero".into(),
            ));
        }
        if self.images.max_upload_mb == 0 {
            return Err(ConfigError::Validation(
                "images.max_upload_mb must be non-zero".into(),
            ));
        }
        if let Some(since) = &self.dates.together_since
            && parse_date(since).is_none()
        {
            return Err(ConfigError::Validation(format!(
                "dates.together_since: cannot parse '{since}'"
            )));
        }
        if self.store.data_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.data_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Access codes mapped to display names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub users: BTreeMap<String, String>,
}

/// Compression and upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Budget in KB for standalone compression.
    pub max_size_kb: u32,
    /// Budget in KB for photos saved into the archive.
    pub photo_max_size_kb: u32,
    /// Longest edge in pixels.
    pub max_dimension: u32,
    /// Largest accepted upload in MB.
    pub max_upload_mb: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_size_kb: DEFAULT_MAX_SIZE_KB,
            photo_max_size_kb: 400,
            max_dimension: MAX_DIMENSION,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl ImagesConfig {
    pub fn compress_options(&self) -> CompressOptions {
        CompressOptions {
            max_size_kb: self.max_size_kb,
            max_dimension: self.max_dimension,
        }
    }

    pub fn photo_compress_options(&self) -> CompressOptions {
        CompressOptions {
            max_size_kb: self.photo_max_size_kb,
            max_dimension: self.max_dimension,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatesConfig {
    pub locale: Locale,
    /// Start of the relationship, shown by `keepsake since`.
    pub together_since: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Relative paths resolve against the config file's directory.
    pub data_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: ".keepsake".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.data_dir)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel compression workers.
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
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(KeepsakeConfig::default())?)
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<KeepsakeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: KeepsakeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a `keepsake.toml` path.
///
/// A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<KeepsakeConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `keepsake.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Keepsake Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Access codes
# ---------------------------------------------------------------------------
[auth.users]
# Four-digit code = display name. Codes are stored in plain text.
# "1234" = "Ilya"
# "0608" = "Adelya"

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# Size budget in KB for `keepsake compress`.
max_size_kb = 500

# Size budget in KB for photos saved to the archive.
photo_max_size_kb = 400

# Longest edge in pixels; larger images are scaled down, never up.
max_dimension = 1200

# Largest accepted source file in MB.
max_upload_mb = 10

# ---------------------------------------------------------------------------
# Dates
# ---------------------------------------------------------------------------
[dates]
# Output language: "ru" or "en".
locale = "ru"

# The day it all started, for `keepsake since`.
# together_since = "2022-02-14"

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[store]
# Directory for collections and session state, relative to this file.
data_dir = ".keepsake"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel compression workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
