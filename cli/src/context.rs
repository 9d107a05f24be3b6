use castline_core::context::{AppConfig, AppConfigExt};
use castline_core::report::{
    Fight, FightEvents, FightSelector, GraphQlClient, LocalEventDump, Report, ReportError,
    fetch_all_events,
};
use castline_core::timeline::Analysis;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Where events for the loaded report come from.
pub enum ActiveSource {
    Remote(GraphQlClient),
    Local(LocalEventDump),
}

impl ActiveSource {
    pub async fn fetch(&self, fight: &Fight) -> Result<FightEvents, ReportError> {
        match self {
            ActiveSource::Remote(client) => fetch_all_events(client, fight).await,
            ActiveSource::Local(dump) => fetch_all_events(dump, fight).await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ActiveSource::Remote(client) => format!("report {}", client.code()),
            ActiveSource::Local(dump) => format!("local dump ({} events)", dump.len()),
        }
    }
}

/// The loaded report plus the most recent fetch and analysis.
pub struct ReportSession {
    pub report: Report,
    pub source: ActiveSource,
    /// Fight picked by the report URL, used when none is given
    pub preferred_fight: Option<FightSelector>,
    /// Raw events of the last fetched fight, keyed by fight id
    pub events: Option<(i64, FightEvents)>,
    pub analysis: Option<(Fight, Analysis)>,
}

impl ReportSession {
    pub fn new(report: Report, source: ActiveSource) -> Self {
        Self {
            report,
            source,
            preferred_fight: None,
            events: None,
            analysis: None,
        }
    }

    /// Events for `fight`, fetching them unless already cached.
    pub async fn events_for(&mut self, fight: &Fight) -> Result<&FightEvents, ReportError> {
        if !matches!(&self.events, Some((id, _)) if *id == fight.id) {
            let events = self.source.fetch(fight).await?;
            tracing::info!(
                fight = fight.id,
                events = events.events.len(),
                invalid = events.invalid.len(),
                "Fetched fight events"
            );
            self.events = Some((fight.id, events));
        }
        match &self.events {
            Some((_, events)) => Ok(events),
            None => unreachable!("events cached above"),
        }
    }
}

/// Holds all shared state for the CLI application.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    /// None until a report is opened or fetched
    pub session: Arc<RwLock<Option<ReportSession>>>,
}

impl CliContext {
    pub fn new() -> Self {
        Self::with_config(AppConfig::load())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            session: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn replace_session(&self, session: ReportSession) {
        *self.session.write().await = Some(session);
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}
