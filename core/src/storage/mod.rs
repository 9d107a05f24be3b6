//! Export of analysis results.
//!
//! Timelines are written as pretty JSON or ZSTD-compressed parquet. Files are
//! named `{fight name}_Timeline.{ext}` and default to
//! `~/.local/share/castline/exports/`.

mod error;
mod json;
mod writer;

#[cfg(test)]
mod tests;

pub use error::StorageError;
pub use json::{DebugDump, write_debug_dump, write_json};
pub use writer::TimelineWriter;

use castline_types::{ExportFormat, TimelineRow};
use std::path::{Path, PathBuf};

/// Resolve the export directory and create it if needed.
///
/// An empty `configured` value selects the platform data directory.
pub fn exports_dir(configured: &str) -> Result<PathBuf, StorageError> {
    let dir = if configured.trim().is_empty() {
        dirs::data_local_dir()
            .ok_or(StorageError::NoDataDir)?
            .join("castline")
            .join("exports")
    } else {
        PathBuf::from(configured.trim())
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// `<fight name>_Timeline.<ext>` with path-hostile characters replaced.
pub fn timeline_filename(fight_name: &str, format: ExportFormat) -> String {
    format!("{}_Timeline.{}", sanitize(fight_name), format.extension())
}

pub fn debug_dump_filename(fight_name: &str) -> String {
    format!("{}_Debug.json", sanitize(fight_name))
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "fight".to_string()
    } else {
        cleaned
    }
}

/// Write rows in the chosen format.
pub fn export_timeline(
    rows: &[TimelineRow],
    format: ExportFormat,
    path: &Path,
) -> Result<(), StorageError> {
    match format {
        ExportFormat::Json => write_json(rows, path),
        ExportFormat::Parquet => {
            let mut writer = TimelineWriter::new();
            writer.extend(rows.iter().cloned());
            writer.write_to_file(path)
        }
    }
}
