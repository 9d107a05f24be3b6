use super::*;
use rayon::prelude::*;


macro_rules! amount {
    ($v:expr) => {
        $v.map(|a: f64| a.round() as i64).unwrap_or_default()
    };
}

/// Outcome of converting a batch of raw events.
#[derive(Debug, Default)]
pub struct Ingested {
    /// Valid events in input order
    pub events: Vec<Event>,
    /// Events dropped for missing identifying fields
    pub skipped: Vec<ParseError>,
    /// Events whose multiplier was reported as zero and replaced by 1
    pub zero_multipliers: usize,
}

/// Converts raw report events into pipeline [`Event`]s.
///
/// Stateless; one parser can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventParser;

impl EventParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one JSON-encoded event.
    pub fn parse_line(&self, line_number: u64, line: &str) -> Result<(Event, RawEvent), ParseError> {
        let raw: RawEvent =
            serde_json::from_str(line).map_err(|e| ParseError::InvalidJson {
                line_number,
                detail: e.to_string(),
            })?;
        let event = self.parse_raw(line_number, &raw)?;
        Ok((event, raw))
    }

    /// Validate the identifying fields of a raw event and normalize it.
    pub fn parse_raw(&self, line_number: u64, raw: &RawEvent) -> Result<Event, ParseError> {
        let timestamp = raw
            .timestamp
            .ok_or(ParseError::MissingTimestamp { line_number })?;
        let kind_name = raw
            .kind
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ParseError::MissingKind { line_number })?;
        let kind = EventKind::from_type_name(kind_name);

        let ability_id = match (raw.ability_id(), kind.is_damage_bearing()) {
            (Some(id), _) => id,
            (None, false) => 0,
            (None, true) => return Err(ParseError::MissingAbilityId { line_number }),
        };

        let inline = raw.ability.as_ref();
        let ability_name = inline
            .and_then(|a| a.name.as_deref())
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let ability_type = inline.and_then(|a| a.kind.as_ref()).and_then(TypeCode::as_code);

        Ok(Event {
            line_number,
            timestamp,
            kind,
            source_id: raw.source_id.filter(|id| *id > 0),
            target_id: raw.target_id.filter(|id| *id > 0),
            ability_id,
            ability_name,
            ability_type,
            amount: amount!(raw.amount),
            absorbed: amount!(raw.absorbed),
            overkill: amount!(raw.overkill),
            multiplier: guard_multiplier(raw.multiplier.unwrap_or(1.0)),
            unmitigated_amount: raw.unmitigated_amount.map(|a| a.round() as i64),
            is_tick: raw.tick.unwrap_or(false),
            is_synthetic: false,
            dot: None,
        })
    }

    /// Convert a batch of raw events, skipping malformed ones.
    pub fn ingest(&self, raw_events: &[RawEvent]) -> Ingested {
        let parsed: Vec<Result<Event, ParseError>> = raw_events
            .par_iter()
            .enumerate()
            .map(|(idx, raw)| self.parse_raw(idx as u64 + 1, raw))
            .collect();

        let mut ingested = Ingested {
            zero_multipliers: raw_events.iter().filter(|r| r.has_zero_multiplier()).count(),
            ..Default::default()
        };
        for result in parsed {
            match result {
                Ok(event) => ingested.events.push(event),
                Err(err) => ingested.skipped.push(err),
            }
        }

        tracing::debug!(
            events = ingested.events.len(),
            skipped = ingested.skipped.len(),
            "Ingested raw events"
        );
        ingested
    }
}
