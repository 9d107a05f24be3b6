//! Application configuration
//!
//! Re-exports the shared config types from castline-types and adds
//! persistence through confy plus loading of analysis presets.

pub use castline_types::{AnalysisConfig, AppConfig, ExportFormat, GroupingRule, TimeFormat};

use std::path::{Path, PathBuf};

use super::ConfigError;

const APP_NAME: &str = "castline";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence
pub trait AppConfigExt: Sized {
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;
}

impl AppConfigExt for AppConfig {
    /// Load the stored config, falling back to defaults on any error.
    fn load() -> Self {
        Self::try_load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Using default configuration");
            AppConfig::default()
        })
    }

    fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Analysis Presets
// ─────────────────────────────────────────────────────────────────────────────

/// Read an analysis preset from a TOML file. Missing keys take defaults.
pub fn load_analysis_preset(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadPreset {
        path: path.to_path_buf(),
        source,
    })?;
    let preset = toml::from_str(&content).map_err(|source| ConfigError::ParsePreset {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded analysis preset");
    Ok(preset)
}

/// Write an analysis preset as TOML.
pub fn save_analysis_preset(config: &AnalysisConfig, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config).map_err(ConfigError::SerializePreset)?;
    std::fs::write(path, content).map_err(|source| ConfigError::WritePreset {
        path: path.to_path_buf(),
        source,
    })
}
