//! Error types for configuration operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("failed to read preset {path}")]
    ReadPreset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid preset {path}")]
    ParsePreset {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode preset")]
    SerializePreset(#[source] toml::ser::Error),

    #[error("failed to write preset {path}")]
    WritePreset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
