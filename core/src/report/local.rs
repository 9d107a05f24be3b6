//! Offline report source backed by files saved from the API.

use std::path::Path;

use serde_json::Value;

use super::{EventPage, EventSource, Fight, Report, ReportError};
use crate::combat_log::{ParseError, RawEvent, Reader};

/// Events per page served by [`LocalEventDump`].
pub const DEFAULT_PAGE_SIZE: usize = 10_000;

/// Events loaded from a local dump, served in pages like the hosted API.
#[derive(Debug, Clone, Default)]
pub struct LocalEventDump {
    /// Sorted by timestamp
    timed: Vec<RawEvent>,
    /// Events without a timestamp, handed out with the first page so
    /// ingestion can count them
    untimed: Vec<RawEvent>,
    /// Dump entries that were not valid event JSON, reported with the
    /// first page of a fight like the untimed events
    invalid: Vec<ParseError>,
    page_size: usize,
}

impl LocalEventDump {
    pub fn new(events: Vec<RawEvent>, page_size: usize) -> Self {
        let (mut timed, untimed): (Vec<RawEvent>, Vec<RawEvent>) =
            events.into_iter().partition(|e| e.timestamp.is_some());
        timed.sort_by_key(|e| e.timestamp);
        Self {
            timed,
            untimed,
            invalid: Vec::new(),
            page_size: page_size.max(1),
        }
    }

    /// Read a JSON-array or JSON-lines dump.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let dump = Reader::from(path.as_ref()).read_event_dump()?;
        for err in &dump.invalid {
            tracing::warn!(error = %err, "Invalid line in event dump");
        }
        Ok(Self {
            invalid: dump.invalid,
            ..Self::new(dump.events, DEFAULT_PAGE_SIZE)
        })
    }

    pub fn invalid(&self) -> &[ParseError] {
        &self.invalid
    }

    pub fn len(&self) -> usize {
        self.timed.len() + self.untimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One page starting at `start`, restricted to the fight window.
    ///
    /// A page never splits events sharing a timestamp, so the next page
    /// timestamp is always past everything already served.
    pub fn page(&self, fight: &Fight, start: i64) -> EventPage {
        let first = self
            .timed
            .partition_point(|e| e.timestamp.unwrap_or_default() < start);
        let end = self
            .timed
            .partition_point(|e| e.timestamp.unwrap_or_default() <= fight.end_time);
        let window = &self.timed[first..end.max(first)];

        let mut take = window.len().min(self.page_size);
        if let Some(last_ts) = take.checked_sub(1).and_then(|i| window[i].timestamp) {
            while take < window.len() && window[take].timestamp == Some(last_ts) {
                take += 1;
            }
        }

        let first_page = start == fight.start_time;
        let mut data = Vec::with_capacity(take);
        if first_page {
            data.extend(self.untimed.iter().cloned());
        }
        data.extend(window[..take].iter().cloned());

        EventPage {
            data,
            invalid: if first_page {
                self.invalid.clone()
            } else {
                Vec::new()
            },
            next_page_timestamp: window.get(take).and_then(|e| e.timestamp),
        }
    }
}

impl EventSource for LocalEventDump {
    async fn fetch_page(&self, fight: &Fight, start_timestamp: i64) -> Result<EventPage, ReportError> {
        Ok(self.page(fight, start_timestamp))
    }
}

/// Load report metadata saved as JSON.
///
/// Accepts a bare report object or a full API response
/// (`{"data": {"reportData": {"report": ...}}}`).
pub async fn load_report(path: impl AsRef<Path>) -> Result<Report, ReportError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReportError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
    let mut doc: Value = serde_json::from_str(&content)?;

    let report = match doc.pointer_mut("/data/reportData/report") {
        Some(inner) => inner.take(),
        None => match doc.pointer_mut("/reportData/report") {
            Some(inner) => inner.take(),
            None => doc,
        },
    };
    let report: Report = serde_json::from_value(report)?;

    tracing::info!(
        path = %path.display(),
        title = %report.title,
        fights = report.fights.len(),
        "Loaded report file"
    );
    Ok(report)
}
