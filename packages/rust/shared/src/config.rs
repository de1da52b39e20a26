//! Application configuration for SmartBuy.
//!
//! User config lives at `~/.smartbuy/smartbuy.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SmartBuyError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "smartbuy.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".smartbuy";

/// Largest material estimate ever returned.
pub const MATERIALS_CEILING: usize = 8;

/// Smallest `min_materials` allowed; the rule table always clears it.
pub const MATERIALS_FLOOR: usize = 4;

// ---------------------------------------------------------------------------
// Config structs (matching smartbuy.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Trained model artifact settings.
    #[serde(default)]
    pub model: ModelSection,

    /// Material cascade limits.
    #[serde(default)]
    pub materials: MaterialsSection,

    /// Vendor directory settings.
    #[serde(default)]
    pub vendors: VendorsSection,
}

/// `[model]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSection {
    /// Path to a JSON model artifact. No path means no model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Categories below this probability are dropped.
    #[serde(default = "default_min_probability")]
    pub min_probability: f64,

    /// Maximum number of categories taken from the classifier.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            path: None,
            min_probability: default_min_probability(),
            top_k: default_top_k(),
        }
    }
}

fn default_min_probability() -> f64 {
    0.05
}
fn default_top_k() -> usize {
    8
}

/// `[materials]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialsSection {
    /// Fewest materials an accepted estimate may contain.
    #[serde(default = "default_min_materials")]
    pub min_materials: usize,

    /// Accepted estimates are truncated to this many materials.
    #[serde(default = "default_max_materials")]
    pub max_materials: usize,
}

impl Default for MaterialsSection {
    fn default() -> Self {
        Self {
            min_materials: default_min_materials(),
            max_materials: default_max_materials(),
        }
    }
}

fn default_min_materials() -> usize {
    4
}
fn default_max_materials() -> usize {
    8
}

/// `[vendors]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorsSection {
    /// Directory search endpoint; the query goes in the `ss` parameter.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Regex an anchor's `href` must match to be taken as the vendor link.
    #[serde(default = "default_vendor_link_pattern")]
    pub vendor_link_pattern: String,

    /// Lower bound of the randomized pre-request delay.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the randomized pre-request delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum listing cards considered per page.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Maximum vendor records returned.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for VendorsSection {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            vendor_link_pattern: default_vendor_link_pattern(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            timeout_secs: default_timeout_secs(),
            max_candidates: default_max_candidates(),
            max_results: default_max_results(),
        }
    }
}

fn default_search_url() -> String {
    "https://dir.indiamart.com/search.mp".into()
}
fn default_vendor_link_pattern() -> String {
    r".*indiamart\.com/[^/]+/?".into()
}
fn default_min_delay_ms() -> u64 {
    2_000
}
fn default_max_delay_ms() -> u64 {
    5_000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_candidates() -> usize {
    30
}
fn default_max_results() -> usize {
    20
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for the material cascade.
#[derive(Debug, Clone)]
pub struct MaterialsConfig {
    pub model_path: Option<PathBuf>,
    pub min_probability: f64,
    pub top_k: usize,
    pub min_materials: usize,
    pub max_materials: usize,
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for MaterialsConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            model_path: config.model.path.as_ref().map(PathBuf::from),
            min_probability: config.model.min_probability,
            top_k: config.model.top_k,
            min_materials: config.materials.min_materials,
            max_materials: config.materials.max_materials,
        }
    }
}

/// Runtime configuration for the vendor cascade.
#[derive(Debug, Clone)]
pub struct VendorSearchConfig {
    pub search_url: String,
    pub vendor_link_pattern: String,
    /// Inclusive range the pre-request delay is drawn from.
    pub delay_ms: (u64, u64),
    pub timeout: Duration,
    pub max_candidates: usize,
    pub max_results: usize,
}

impl Default for VendorSearchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for VendorSearchConfig {
    fn from(config: &AppConfig) -> Self {
        let v = &config.vendors;
        let min = v.min_delay_ms.min(v.max_delay_ms);
        Self {
            search_url: v.search_url.clone(),
            vendor_link_pattern: v.vendor_link_pattern.clone(),
            delay_ms: (min, v.max_delay_ms),
            timeout: Duration::from_secs(v.timeout_secs),
            max_candidates: v.max_candidates,
            max_results: v.max_results,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.smartbuy/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SmartBuyError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.smartbuy/smartbuy.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SmartBuyError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SmartBuyError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SmartBuyError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SmartBuyError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SmartBuyError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that configured limits keep estimates within their fixed bounds:
/// at most [`MATERIALS_CEILING`] classifier categories, and accepted
/// estimates of between [`MATERIALS_FLOOR`] and [`MATERIALS_CEILING`] items.
pub fn validate_limits(config: &AppConfig) -> Result<()> {
    let model = &config.model;
    if !(1..=MATERIALS_CEILING).contains(&model.top_k) {
        return Err(SmartBuyError::config(format!(
            "model.top_k must be between 1 and {MATERIALS_CEILING}, got {}",
            model.top_k
        )));
    }
    if !(0.0..=1.0).contains(&model.min_probability) {
        return Err(SmartBuyError::config(format!(
            "model.min_probability must be between 0 and 1, got {}",
            model.min_probability
        )));
    }

    let materials = &config.materials;
    if !(MATERIALS_FLOOR..=MATERIALS_CEILING).contains(&materials.min_materials) {
        return Err(SmartBuyError::config(format!(
            "materials.min_materials must be between {MATERIALS_FLOOR} and {MATERIALS_CEILING}, got {}",
            materials.min_materials
        )));
    }
    if !(materials.min_materials..=MATERIALS_CEILING).contains(&materials.max_materials) {
        return Err(SmartBuyError::config(format!(
            "materials.max_materials must be between {} and {MATERIALS_CEILING}, got {}",
            materials.min_materials, materials.max_materials
        )));
    }

    if config.vendors.max_results == 0 {
        return Err(SmartBuyError::config("vendors.max_results must be at least 1"));
    }
    Ok(())
}
