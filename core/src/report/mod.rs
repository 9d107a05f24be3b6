//! Report source: metadata model, paged event retrieval and URL parsing.

mod client;
mod error;
mod local;
mod model;
mod source;
mod url;

pub use client::GraphQlClient;
pub use error::ReportError;
pub use local::{DEFAULT_PAGE_SIZE, LocalEventDump, load_report};
pub use model::{EventPage, Fight, FightSelector, MasterData, RawAbility, RawActor, Report};
pub use source::{EventSource, FightEvents, MAX_PAGES, fetch_all_events};
pub use url::{ReportLocator, parse_fight_fragment, parse_report_code, parse_report_url};
