pub mod combat_log;
pub mod context;
pub mod game_data;
pub mod report;
pub mod roster;
pub mod storage;
pub mod timeline;

// Re-exports for convenience
pub use combat_log::{Event, EventKind, EventParser, RawEvent, Reader};
pub use context::{AnalysisConfig, AppConfig, AppConfigExt, ConfigError};
pub use game_data::DamageKind;
pub use report::{
    EventSource, Fight, FightEvents, FightSelector, GraphQlClient, LocalEventDump, Report,
    ReportError, fetch_all_events, load_report, parse_report_url,
};
pub use roster::{Actor, ActorCategory, Roster};
pub use storage::{StorageError, export_timeline, exports_dir, timeline_filename};
pub use timeline::{Analysis, AnalysisError, Diagnostics, analyze, analyze_fight};
