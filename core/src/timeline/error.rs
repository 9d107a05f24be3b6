//! Error types for analysis runs

use thiserror::Error;

/// Errors that abort an analysis run
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("reference data missing: {table} table")]
    MissingReferenceData { table: &'static str },

    #[error("fight {fight_id} not found in report")]
    FightNotFound { fight_id: i64 },
}
