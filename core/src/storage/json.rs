//! JSON exports: timeline rows and the raw debug dump.

use castline_types::TimelineRow;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::StorageError;
use crate::combat_log::RawEvent;
use crate::report::{Fight, MasterData};

/// Everything needed to reproduce a run offline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugDump<'a> {
    pub report_code: Option<&'a str>,
    pub report_title: &'a str,
    pub fight: &'a Fight,
    pub master_data: Option<&'a MasterData>,
    pub events: &'a [RawEvent],
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let file = File::create(path).map_err(|source| StorageError::CreateFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    out.flush().map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json(rows: &[TimelineRow], path: &Path) -> Result<(), StorageError> {
    write_pretty(path, rows)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "Wrote JSON timeline");
    Ok(())
}

pub fn write_debug_dump(dump: &DebugDump<'_>, path: &Path) -> Result<(), StorageError> {
    write_pretty(path, dump)?;
    tracing::info!(
        path = %path.display(),
        events = dump.events.len(),
        "Wrote debug dump"
    );
    Ok(())
}
