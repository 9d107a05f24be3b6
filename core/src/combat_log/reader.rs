use super::{ParseError, RawEvent, ReaderError};
use memchr::memchr_iter;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw events read from a local dump, in file order.
#[derive(Debug, Default)]
pub struct EventDump {
    pub events: Vec<RawEvent>,
    /// Entries that were not valid event JSON
    pub invalid: Vec<ParseError>,
    pub byte_len: u64,
}

/// Reads event dumps saved from the report source.
///
/// Accepts a JSON array of events, a single event page object
/// (`{"data": [...]}`), or JSON lines with one event per line.
pub struct Reader {
    path: PathBuf,
}

impl Reader {
    pub fn from(file_path: impl Into<PathBuf>) -> Self {
        Reader {
            path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_event_dump(&self) -> Result<EventDump, ReaderError> {
        let file = fs::File::open(&self.path).map_err(|source| ReaderError::OpenFile {
            path: self.path.clone(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| ReaderError::ReadFile {
                path: self.path.clone(),
                source,
            })?
            .len();
        if len == 0 {
            return Ok(EventDump::default());
        }

        // SAFETY: the dump is opened read-only and not modified while mapped.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| ReaderError::MemoryMap {
            path: self.path.clone(),
            source,
        })?;
        let bytes = mmap.as_ref();

        let mut dump = match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'[') => self.read_document(parse_document(bytes).map_err(|source| {
                ReaderError::Format {
                    path: self.path.clone(),
                    source,
                }
            })?),
            // A single page object parses as one document, JSON lines fail on the second line.
            Some(b'{') => match parse_document(bytes) {
                Ok(doc) => self.read_document(doc),
                Err(_) => read_json_lines(bytes),
            },
            _ => read_json_lines(bytes),
        };
        dump.byte_len = len;

        tracing::debug!(
            path = %self.path.display(),
            events = dump.events.len(),
            invalid = dump.invalid.len(),
            "Read event dump"
        );
        Ok(dump)
    }

    fn read_document(&self, doc: serde_json::Value) -> EventDump {
        let items = match doc {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut page) => match page.remove("data") {
                Some(serde_json::Value::Array(items)) => items,
                // a lone event object
                _ => vec![serde_json::Value::Object(page)],
            },
            _ => Vec::new(),
        };

        let parsed: Vec<Result<RawEvent, ParseError>> = items
            .into_par_iter()
            .enumerate()
            .map(|(idx, value)| RawEvent::from_value(idx as u64 + 1, value))
            .collect();

        split_results(parsed)
    }
}

fn parse_document(bytes: &[u8]) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}

fn read_json_lines(bytes: &[u8]) -> EventDump {
    let mut line_ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        if end > start {
            line_ranges.push((start, end));
        }
        start = end + 1;
    }
    if start < bytes.len() {
        line_ranges.push((start, bytes.len()));
    }

    let parsed: Vec<Result<RawEvent, ParseError>> = line_ranges
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &(start, end))| {
            let line = bytes[start..end].trim_ascii();
            if line.is_empty() {
                return None;
            }
            Some(
                serde_json::from_slice::<RawEvent>(line).map_err(|e| ParseError::InvalidJson {
                    line_number: idx as u64 + 1,
                    detail: e.to_string(),
                }),
            )
        })
        .collect();

    split_results(parsed)
}

fn split_results(parsed: Vec<Result<RawEvent, ParseError>>) -> EventDump {
    let mut dump = EventDump::default();
    for result in parsed {
        match result {
            Ok(event) => dump.events.push(event),
            Err(err) => dump.invalid.push(err),
        }
    }
    dump
}
