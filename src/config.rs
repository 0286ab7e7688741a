//! Run configuration.
//!
//! Every setting a run depends on lives in one [`Config`] value that is
//! passed into the pipeline explicitly. There are no process-wide settings.
//!
//! ## Config File Location
//!
//! By default the CLI looks for `strip-index.toml` in the source directory.
//! `--config <FILE>` points at any other file. Without either, the stock
//! defaults below apply. CLI flags override whatever the file says.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! base_url = ""             # Prefix for every URL in the index
//! output = "index.json"     # Index path, relative to the source directory
//!
//! [index]
//! id_mode = "sequential"    # "sequential" | "extracted"
//! id_format = "number"      # "number" | "padded"
//! # pad_width = 5           # Zero-pad IDs to this width (padded format)
//! required = ["primary", "mask"]
//! rename = false            # Rename files to {id}.{ext} / {id}_mask.{ext}
//!
//! [index.extract]
//! delimiter = "_"           # Logical key field separator
//! field = 1                 # 0-based field holding the image number
//!
//! [index.keys]
//! primary = "primary"       # JSON key for each variant URL
//! mask = "mask"
//! annotation = "annotation"
//!
//! [naming]
//! mask_suffixes = ["_mask"]
//! annotation_suffixes = ["_an"]
//!
//! [gaps]
//! delimiter = "_"
//! field = 1
//! output = "gaps.txt"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want. The file is
//! merged on top of the stock defaults as TOML tables (see [`merge_toml`]),
//! then deserialized and validated. Unknown keys are rejected to catch typos
//! early.

use crate::types::VariantTag;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config filename looked up in the source directory.
pub const CONFIG_FILENAME: &str = "strip-index.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Prefix for every URL written to the index.
    pub base_url: String,
    /// Index output path. Relative paths resolve against the source directory.
    pub output: String,
    pub index: IndexConfig,
    pub naming: NamingConfig,
    pub gaps: GapsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            output: "index.json".to_string(),
            index: IndexConfig::default(),
            naming: NamingConfig::default(),
            gaps: GapsConfig::default(),
        }
    }
}

/// How index IDs are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IdMode {
    /// Sort complete groups by logical key, number them 1..N.
    Sequential,
    /// Read the ID out of a field of the logical key.
    Extracted,
}

/// How IDs are written to JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdFormat {
    /// JSON number.
    Number,
    /// JSON string, zero-padded.
    Padded,
}

/// Index builder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub id_mode: IdMode,
    pub id_format: IdFormat,
    /// Zero-pad width for the `padded` format. When absent, extracted IDs
    /// keep their original text and sequential IDs use the width of the
    /// largest ID.
    pub pad_width: Option<usize>,
    /// Variant tags a group must carry, exactly, to enter the index.
    pub required: Vec<VariantTag>,
    /// Rename files on disk to their assigned IDs before writing the index.
    pub rename: bool,
    pub extract: FieldConfig,
    pub keys: KeysConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            id_mode: IdMode::Sequential,
            id_format: IdFormat::Number,
            pad_width: None,
            required: vec![VariantTag::Primary, VariantTag::Mask],
            rename: false,
            extract: FieldConfig::default(),
            keys: KeysConfig::default(),
        }
    }
}

impl IndexConfig {
    pub fn required_set(&self) -> BTreeSet<VariantTag> {
        self.required.iter().copied().collect()
    }
}

/// Location of a numeric field inside a logical key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    pub delimiter: String,
    /// 0-based field position after splitting on `delimiter`.
    pub field: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            delimiter: "_".to_string(),
            field: 1,
        }
    }
}

/// JSON key used for each variant's URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysConfig {
    pub primary: String,
    pub mask: String,
    pub annotation: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            primary: "primary".to_string(),
            mask: "mask".to_string(),
            annotation: "annotation".to_string(),
        }
    }
}

impl KeysConfig {
    pub fn key_for(&self, tag: VariantTag) -> &str {
        match tag {
            VariantTag::Primary => &self.primary,
            VariantTag::Mask => &self.mask,
            VariantTag::Annotation => &self.annotation,
            VariantTag::Unknown => "unknown",
        }
    }
}

/// Filename suffixes per variant tag. Matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    pub mask_suffixes: Vec<String>,
    pub annotation_suffixes: Vec<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            mask_suffixes: vec!["_mask".to_string()],
            annotation_suffixes: vec!["_an".to_string()],
        }
    }
}

/// Gap report settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GapsConfig {
    pub delimiter: String,
    pub field: usize,
    /// Report path. Relative paths resolve against the source directory.
    pub output: String,
}

impl Default for GapsConfig {
    fn default() -> Self {
        Self {
            delimiter: "_".to_string(),
            field: 1,
            output: "gaps.txt".to_string(),
        }
    }
}

/// Values given on the command line. `None` leaves the config untouched.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub output: Option<String>,
    pub id_mode: Option<IdMode>,
    pub required: Option<Vec<VariantTag>>,
    pub rename: bool,
    pub gaps_output: Option<String>,
}

impl Config {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index.required.is_empty() {
            return Err(ConfigError::Validation(
                "index.required must not be empty".into(),
            ));
        }
        if self.index.required.contains(&VariantTag::Unknown) {
            return Err(ConfigError::Validation(
                "index.required may not contain \"unknown\"".into(),
            ));
        }
        if self.index.extract.delimiter.is_empty() {
            return Err(ConfigError::Validation(
                "index.extract.delimiter must not be empty".into(),
            ));
        }
        if self.gaps.delimiter.is_empty() {
            return Err(ConfigError::Validation(
                "gaps.delimiter must not be empty".into(),
            ));
        }
        if self.output.trim().is_empty() {
            return Err(ConfigError::Validation("output must not be empty".into()));
        }
        if self.gaps.output.trim().is_empty() {
            return Err(ConfigError::Validation(
                "gaps.output must not be empty".into(),
            ));
        }
        self.validate_suffixes()?;
        self.validate_keys()
    }

    fn validate_suffixes(&self) -> Result<(), ConfigError> {
        let lists = [
            ("naming.mask_suffixes", &self.naming.mask_suffixes),
            ("naming.annotation_suffixes", &self.naming.annotation_suffixes),
        ];
        let mut seen = HashSet::new();
        for (name, list) in lists {
            if list.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{name} must list at least one suffix"
                )));
            }
            for suffix in list {
                if suffix.is_empty() || !suffix.is_ascii() {
                    return Err(ConfigError::Validation(format!(
                        "{name} entries must be non-empty ASCII, got {suffix:?}"
                    )));
                }
                if !seen.insert(suffix.to_ascii_lowercase()) {
                    return Err(ConfigError::Validation(format!(
                        "suffix {suffix:?} is configured more than once"
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_keys(&self) -> Result<(), ConfigError> {
        let keys = &self.index.keys;
        let all = [&keys.primary, &keys.mask, &keys.annotation];
        if all.iter().any(|k| k.is_empty() || k.as_str() == "id") {
            return Err(ConfigError::Validation(
                "index.keys must be non-empty and may not be \"id\"".into(),
            ));
        }
        let distinct: HashSet<&String> = all.into_iter().collect();
        if distinct.len() != 3 {
            return Err(ConfigError::Validation(
                "index.keys must be distinct".into(),
            ));
        }
        Ok(())
    }

    /// Apply command-line overrides, then re-validate.
    pub fn apply(&mut self, overrides: &Overrides) -> Result<(), ConfigError> {
        if let Some(ref base_url) = overrides.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(ref output) = overrides.output {
            self.output = output.clone();
        }
        if let Some(id_mode) = overrides.id_mode {
            self.index.id_mode = id_mode;
        }
        if let Some(ref required) = overrides.required {
            self.index.required = required.clone();
        }
        if overrides.rename {
            self.index.rename = true;
        }
        if let Some(ref output) = overrides.gaps_output {
            self.gaps.output = output.clone();
        }
        self.validate()
    }
}

/// Resolve a possibly-relative output path against the source directory.
pub fn resolve_output(source: &Path, output: &str) -> PathBuf {
    let path = Path::new(output);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        source.join(path)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user files are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, arrays included.
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
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config for a run.
///
/// An explicit path must exist. Without one, `strip-index.toml` in the
/// source directory is used when present, stock defaults otherwise.
pub fn load_config(source: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "config file not found",
                    ),
                });
            }
            load_raw_config(path)?
        }
        None => load_raw_config(&source.join(CONFIG_FILENAME))?,
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `strip-index.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# strip-index configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Place this file in the strip directory as strip-index.toml, or pass
# --config <FILE>. Command-line flags override values set here.

# Prefix for every URL written to the index: "{base_url}/{filename}".
# Leave empty to write bare filenames.
base_url = ""

# Index output path. Relative paths resolve against the source directory.
output = "index.json"

# ---------------------------------------------------------------------------
# Index building
# ---------------------------------------------------------------------------
[index]
# "sequential": sort groups by logical key and number them 1..N.
# "extracted":  read the ID from a field of the logical key (see [index.extract])
#               and sort numerically.
id_mode = "sequential"

# "number": IDs are JSON numbers.
# "padded": IDs are zero-padded JSON strings.
id_format = "number"

# Zero-pad width for the padded format. When omitted, extracted IDs keep
# their original text and sequential IDs use the width of the largest ID.
# pad_width = 5

# Variant tags a group must carry, exactly, to be indexed.
# One of: "primary", "mask", "annotation".
required = ["primary", "mask"]

# Rename files to {id}.{ext} and {id}{suffix}.{ext} before writing the index.
# Destructive. Refused when any group fails ID assignment.
rename = false

[index.extract]
# Field separator inside the logical key, and the 0-based field holding the
# image number. "S3_02858" with "_" and 1 gives 02858.
delimiter = "_"
field = 1

[index.keys]
# JSON key for each variant's URL. The web viewer expects e.g.
# primary = "rgb", mask = "rgb_mask", annotation = "an".
primary = "primary"
mask = "mask"
annotation = "annotation"

# ---------------------------------------------------------------------------
# Filename conventions
# ---------------------------------------------------------------------------
[naming]
# Stem suffixes marking each variant. Case-insensitive. The first entry is
# used when renaming.
mask_suffixes = ["_mask"]
annotation_suffixes = ["_an"]

# ---------------------------------------------------------------------------
# Gap report
# ---------------------------------------------------------------------------
[gaps]
delimiter = "_"
field = 1
# Report path. Relative paths resolve against the source directory.
output = "gaps.txt"
"##
}
