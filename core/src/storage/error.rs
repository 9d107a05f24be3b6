//! Error types for export operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors while writing exports
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create file {path}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write parquet file {path}")]
    WriteParquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("arrow conversion error")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("failed to write JSON file {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create export directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no data directory available on this platform")]
    NoDataDir,
}
