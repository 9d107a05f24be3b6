//! Error types for raw event parsing

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a raw event is skipped during ingestion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid event JSON at line {line_number}: {detail}")]
    InvalidJson { line_number: u64, detail: String },

    #[error("event at line {line_number} has no timestamp")]
    MissingTimestamp { line_number: u64 },

    #[error("event at line {line_number} has no type")]
    MissingKind { line_number: u64 },

    #[error("damage event at line {line_number} has no ability id")]
    MissingAbilityId { line_number: u64 },
}

impl ParseError {
    /// Short stable label used when counting skipped events.
    pub fn reason(&self) -> &'static str {
        match self {
            ParseError::InvalidJson { .. } => "invalid json",
            ParseError::MissingTimestamp { .. } => "missing timestamp",
            ParseError::MissingKind { .. } => "missing event type",
            ParseError::MissingAbilityId { .. } => "missing ability id",
        }
    }
}

/// Errors during event dump reading operations
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("failed to open event dump {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to memory map file {path}")]
    MemoryMap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("event dump {path} is not a JSON array or JSON lines")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
