//! Error types for the report source

use thiserror::Error;

use crate::combat_log::ReaderError;

/// Errors while fetching or loading a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("request to report source failed")]
    Http(#[from] reqwest::Error),

    #[error("report source returned an error: {message}")]
    Api { message: String },

    #[error("failed to decode report response")]
    Json(#[from] serde_json::Error),

    #[error("no API token set, export one as {env_var}")]
    MissingToken { env_var: String },

    #[error("not a report url or code: {input}")]
    InvalidReportUrl { input: String },

    #[error("failed to read report file {path}")]
    ReadFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Reader(#[from] ReaderError),
}
