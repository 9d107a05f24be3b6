//! Shared configuration types for castline
//!
//! This crate contains serializable configuration and output row types that are
//! shared between the analysis library (castline-core) and the command shell.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Analysis Options
// ─────────────────────────────────────────────────────────────────────────────

/// How hits of one cast are matched together in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupingRule {
    /// Exact timestamps when snapshot binding is on, sliding window otherwise
    #[default]
    Auto,
    /// Hits must share the exact same timestamp
    ExactTimestamp,
    /// Hits within `aoe_time_window_ms` of the group's earliest member
    SlidingWindow,
}

/// Display mode for relative timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeFormat {
    /// `mm:ss`
    #[default]
    MinutesSeconds,
    /// `hh:mm:ss`
    HoursMinutesSeconds,
}

/// Options for one analysis run. Every field has a default so partial
/// presets deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Keep unmerged DoT ticks as their own rows (only relevant when
    /// `merge_dot_ticks` is off)
    #[serde(default = "default_true")]
    pub include_ticks_as_individual: bool,
    #[serde(default)]
    pub merge_dot_ticks: bool,
    #[serde(default = "default_dot_gap_threshold_ms")]
    pub dot_gap_threshold_ms: i64,
    #[serde(default = "default_true")]
    pub merge_aoe_hits: bool,
    #[serde(default = "default_aoe_time_window_ms")]
    pub aoe_time_window_ms: i64,
    #[serde(default = "default_outlier_ratio")]
    pub outlier_ratio: f64,
    #[serde(default)]
    pub ignore_basic_attack: bool,
    #[serde(default = "default_round_raw_damage_to")]
    pub round_raw_damage_to: i64,

    /// Rewrite applied-damage timestamps to their calculated snapshot
    #[serde(default = "default_true")]
    pub bind_snapshots: bool,
    #[serde(default)]
    pub grouping_rule: GroupingRule,
    #[serde(default)]
    pub time_format: TimeFormat,
    /// Write raw events and master data next to the timeline export
    #[serde(default)]
    pub debug_export: bool,
}

fn default_true() -> bool {
    true
}

fn default_dot_gap_threshold_ms() -> i64 {
    4000
}

fn default_aoe_time_window_ms() -> i64 {
    1000
}

fn default_outlier_ratio() -> f64 {
    1.5
}

fn default_round_raw_damage_to() -> i64 {
    1000
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_ticks_as_individual: true,
            merge_dot_ticks: false,
            dot_gap_threshold_ms: default_dot_gap_threshold_ms(),
            merge_aoe_hits: true,
            aoe_time_window_ms: default_aoe_time_window_ms(),
            outlier_ratio: default_outlier_ratio(),
            ignore_basic_attack: false,
            round_raw_damage_to: default_round_raw_damage_to(),
            bind_snapshots: true,
            grouping_rule: GroupingRule::Auto,
            time_format: TimeFormat::MinutesSeconds,
            debug_export: false,
        }
    }
}

impl AnalysisConfig {
    /// The proximity rule actually used for cast grouping.
    ///
    /// `Auto` resolves to exact timestamps only when snapshot binding has
    /// aligned hits; without binding, applied timestamps drift per target and
    /// the sliding window is used instead.
    pub fn effective_grouping_rule(&self) -> GroupingRule {
        match self.grouping_rule {
            GroupingRule::Auto if self.bind_snapshots => GroupingRule::ExactTimestamp,
            GroupingRule::Auto => GroupingRule::SlidingWindow,
            rule => rule,
        }
    }

    /// Time window for grouping, in milliseconds (0 for exact matching).
    pub fn grouping_window_ms(&self) -> i64 {
        match self.effective_grouping_rule() {
            GroupingRule::SlidingWindow => self.aoe_time_window_ms.max(0),
            _ => 0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Options
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportFormat {
    #[default]
    Json,
    Parquet,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Parquet => "parquet",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "parquet" | "pq" => Some(ExportFormat::Parquet),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Config
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// GraphQL endpoint of the report source
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env_var")]
    pub token_env_var: String,
    /// Empty means the platform data directory
    #[serde(default)]
    pub export_directory: String,
    #[serde(default)]
    pub export_format: ExportFormat,
}

fn default_api_endpoint() -> String {
    "https://www.fflogs.com/api/v2/user".to_string()
}

fn default_token_env_var() -> String {
    "FFLOGS_TOKEN".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            api_endpoint: default_api_endpoint(),
            token_env_var: default_token_env_var(),
            export_directory: String::new(),
            export_format: ExportFormat::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output Rows
// ─────────────────────────────────────────────────────────────────────────────

/// Party slot columns, in export order.
pub const ASSIGNMENT_SLOTS: [&str; 8] = ["MT", "ST", "H1", "H2", "D1", "D2", "D3", "D4"];

/// Per-row party slot columns. Exports leave them blank so a timeline can be
/// filled in by hand when planning mitigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct Assignments {
    pub mt: String,
    pub st: String,
    pub h1: String,
    pub h2: String,
    pub d1: String,
    pub d2: String,
    pub d3: String,
    pub d4: String,
}

impl Assignments {
    /// Values in [`ASSIGNMENT_SLOTS`] order.
    pub fn values(&self) -> [&str; 8] {
        [
            &self.mt, &self.st, &self.h1, &self.h2, &self.d1, &self.d2, &self.d3, &self.d4,
        ]
    }
}

/// One timeline row: a single logical ability cast.
///
/// Optional fields are blank (`None`) for DoT summary rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRow {
    /// Signed `mm:ss` or `hh:mm:ss` relative to the effective start
    pub time: String,
    /// Milliseconds relative to the effective start
    pub offset_ms: i64,
    /// Underlying event timestamp
    pub timestamp_ms: i64,
    pub source: String,
    pub ability_id: i64,
    pub ability: String,
    /// Damage kind label, empty when unknown
    pub damage_kind: String,
    pub direct_damage: Option<i64>,
    pub absorbed: Option<i64>,
    pub multiplier: Option<f64>,
    /// Raw damage estimate rounded to `round_raw_damage_to`
    pub raw_damage: Option<i64>,
    pub targets_hit: usize,
    pub dot_duration_ms: Option<i64>,
    pub dot_average_raw_per_tick: Option<i64>,
    /// True when the row was split off as an anomalously large hit
    #[serde(default)]
    pub is_outlier: bool,
    #[serde(flatten)]
    pub assignments: Assignments,
}

impl TimelineRow {
    pub fn is_dot_summary(&self) -> bool {
        self.dot_duration_ms.is_some()
    }

    /// DoT duration rendered as seconds with one decimal (`"12.0s"`).
    pub fn dot_duration_label(&self) -> String {
        self.dot_duration_ms
            .map(|ms| format!("{:.1}s", ms as f64 / 1000.0))
            .unwrap_or_default()
    }
}
