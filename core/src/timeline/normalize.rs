//! Time origin selection and relative time formatting.

use castline_types::TimeFormat;
use serde::Serialize;

use crate::combat_log::{Event, EventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OriginSource {
    LimitBreak,
    FirstDamage,
    Nominal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeOrigin {
    pub timestamp: i64,
    pub source: OriginSource,
}

impl TimeOrigin {
    pub fn offset(&self, timestamp: i64) -> i64 {
        timestamp - self.timestamp
    }
}

/// Pick the time origin from the unfiltered stream: earliest limit break
/// update, else earliest applied damage, else the nominal fight start.
pub fn effective_start(events: &[Event], nominal_start: i64) -> TimeOrigin {
    let earliest = |kind: EventKind| {
        events
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.timestamp)
            .min()
    };

    if let Some(timestamp) = earliest(EventKind::LimitBreakUpdate) {
        return TimeOrigin {
            timestamp,
            source: OriginSource::LimitBreak,
        };
    }
    if let Some(timestamp) = earliest(EventKind::Damage) {
        return TimeOrigin {
            timestamp,
            source: OriginSource::FirstDamage,
        };
    }
    TimeOrigin {
        timestamp: nominal_start,
        source: OriginSource::Nominal,
    }
}

/// Signed `mm:ss` / `hh:mm:ss`, truncated to whole seconds.
pub fn format_offset(offset_ms: i64, format: TimeFormat) -> String {
    let sign = if offset_ms < 0 { "-" } else { "" };
    let total_secs = offset_ms.unsigned_abs() / 1000;
    match format {
        TimeFormat::MinutesSeconds => {
            format!("{sign}{:02}:{:02}", total_secs / 60, total_secs % 60)
        }
        TimeFormat::HoursMinutesSeconds => format!(
            "{sign}{:02}:{:02}:{:02}",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60
        ),
    }
}
