//! Paged event retrieval.

use std::future::Future;

use super::{EventPage, Fight, ReportError};
use crate::combat_log::{ParseError, RawEvent};

/// Upper bound on page requests for one fight.
pub const MAX_PAGES: usize = 500;

/// A producer of event pages for a fight window.
pub trait EventSource {
    /// Fetch events of `fight` starting at `start_timestamp`.
    fn fetch_page(
        &self,
        fight: &Fight,
        start_timestamp: i64,
    ) -> impl Future<Output = Result<EventPage, ReportError>> + Send;
}

/// Every event page of one fight, concatenated in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FightEvents {
    pub events: Vec<RawEvent>,
    /// Entries the source delivered that did not decode
    pub invalid: Vec<ParseError>,
}

impl FightEvents {
    /// Entries received, decodable or not.
    pub fn received(&self) -> usize {
        self.events.len() + self.invalid.len()
    }
}

/// Fetch every page of a fight in order.
///
/// Paging continues while the source reports a next page timestamp before the
/// fight end, up to [`MAX_PAGES`] requests.
pub async fn fetch_all_events<S>(source: &S, fight: &Fight) -> Result<FightEvents, ReportError>
where
    S: EventSource + Sync,
{
    let mut events = FightEvents::default();
    let mut next = fight.start_time;

    for page_idx in 0..MAX_PAGES {
        let page = source.fetch_page(fight, next).await?;
        for err in &page.invalid {
            tracing::warn!(page = page_idx + 1, error = %err, "Undecodable event in page");
        }
        events.events.extend(page.data);
        events.invalid.extend(page.invalid);
        tracing::debug!(
            page = page_idx + 1,
            events = events.events.len(),
            "Fetched event page"
        );

        match page.next_page_timestamp {
            Some(ts) if ts < fight.end_time => next = ts,
            _ => return Ok(events),
        }
    }

    tracing::warn!(
        fight = fight.id,
        pages = MAX_PAGES,
        "Page limit reached, event list may be incomplete"
    );
    Ok(events)
}
