//! Configuration for bookmark imports.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (MARKNAV_UNCATEGORIZED_TITLE, MARKNAV_MAX_INPUT_BYTES)
//! 2. Config file (MARKNAV_CONFIG, else .marknav/config.yaml, else the user config dir)
//! 3. Defaults
//!
//! Config file discovery:
//! - MARKNAV_CONFIG names the file explicitly
//! - Otherwise searches current directory and parents for .marknav/config.yaml
//! - Finally falls back to <config_dir>/marknav/config.yaml

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::{ImportLimits, Importer, NormalizeSettings};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const ENV_CONFIG: &str = "MARKNAV_CONFIG";
pub const ENV_UNCATEGORIZED_TITLE: &str = "MARKNAV_UNCATEGORIZED_TITLE";
pub const ENV_MAX_INPUT_BYTES: &str = "MARKNAV_MAX_INPUT_BYTES";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub limits: Option<LimitsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportConfig {
    /// Title of the bucket for root-level links
    pub uncategorized_title: Option<String>,
    /// Title for folders without one
    pub untitled_title: Option<String>,
    /// Omit top-level folders with no items
    pub drop_empty_categories: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_input_bytes: Option<u64>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Normalizer defaulting rules
    pub settings: NormalizeSettings,
    /// Import limits
    pub limits: ImportLimits,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Build an importer from this configuration
    pub fn importer(&self) -> Importer {
        Importer::new(self.settings.clone(), self.limits.clone())
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(ENV_CONFIG) {
        return Some(PathBuf::from(explicit));
    }

    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".marknav").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("marknav").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge file values, environment overrides and defaults
fn resolve(
    file: Option<&ConfigFile>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(NormalizeSettings, ImportLimits)> {
    let mut settings = NormalizeSettings::default();
    let mut limits = ImportLimits::default();

    if let Some(file) = file {
        if let Some(ref title) = file.import.uncategorized_title {
            settings.uncategorized_title = title.clone();
        }
        if let Some(ref title) = file.import.untitled_title {
            settings.untitled_title = title.clone();
        }
        if let Some(drop) = file.import.drop_empty_categories {
            settings.drop_empty_categories = drop;
        }
        if let Some(max) = file.limits.as_ref().and_then(|l| l.max_input_bytes) {
            limits.max_input_bytes = max;
        }
    }

    if let Some(title) = env(ENV_UNCATEGORIZED_TITLE) {
        settings.uncategorized_title = title;
    }
    if let Some(max) = env(ENV_MAX_INPUT_BYTES) {
        limits.max_input_bytes = max
            .trim()
            .parse()
            .with_context(|| format!("{} must be a byte count, got {:?}", ENV_MAX_INPUT_BYTES, max))?;
    }

    if settings.uncategorized_title.trim().is_empty() {
        anyhow::bail!("uncategorized_title must not be empty");
    }
    if settings.untitled_title.trim().is_empty() {
        anyhow::bail!("untitled_title must not be empty");
    }

    Ok((settings, limits))
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    let (settings, limits) = resolve(file.as_ref(), |key| std::env::var(key).ok())?;

    Ok(ResolvedConfig {
        settings,
        limits,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
