//! Event aggregation pipeline.
//!
//! Stages run strictly in order, each a total function over the output of the
//! previous one:
//!
//! 1. [`filter::filter_events`] keeps hostile damage
//! 2. [`snapshot::bind_snapshots`] re-times hits to their calculated snapshot
//! 3. [`dot_cluster::cluster_dots`] collapses DoT ticks into summaries
//! 4. [`cast_group::group_casts`] + [`cast_group::split_outliers`]
//! 5. [`rows::project_rows`] renders rows relative to the effective start

pub mod cast_group;
mod diagnostics;
pub mod dot_cluster;
mod error;
pub mod filter;
pub mod normalize;
pub mod rows;
pub mod snapshot;

#[cfg(test)]
mod pipeline_tests;

pub use cast_group::{CastGroup, GroupMember};
pub use diagnostics::{Diagnostics, DotStats, FilterStats};
pub use error::AnalysisError;
pub use normalize::{OriginSource, TimeOrigin, effective_start, format_offset};

use castline_types::{AnalysisConfig, TimelineRow};
use serde::Serialize;

use crate::combat_log::{Event, EventParser};
use crate::report::{FightEvents, Report};
use crate::roster::Roster;

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub rows: Vec<TimelineRow>,
    pub origin: TimeOrigin,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Run the pipeline over already-ingested events.
///
/// `diagnostics` carries counters collected before this call (ingestion
/// skips, zero multipliers) and is completed here.
pub fn analyze(
    events: &[Event],
    roster: &Roster,
    nominal_start: i64,
    config: &AnalysisConfig,
    mut diagnostics: Diagnostics,
) -> Analysis {
    let origin = effective_start(events, nominal_start);
    diagnostics.ability_table_missing = roster.ability_table_missing();

    let (kept, filter_stats) = filter::filter_events(events, roster, config);
    diagnostics.filter = filter_stats;

    let bound = if config.bind_snapshots {
        let (bound, count) = snapshot::bind_snapshots(&kept);
        diagnostics.snapshots_bound = count;
        bound
    } else {
        let mut kept = kept;
        kept.sort_by_key(|e| e.timestamp);
        kept
    };

    let clustered = if config.merge_dot_ticks {
        let (merged, dot_stats) = dot_cluster::cluster_dots(bound, config.dot_gap_threshold_ms);
        diagnostics.dot = dot_stats;
        merged
    } else {
        bound
    };

    let groups = cast_group::group_casts(
        clustered,
        config.grouping_window_ms(),
        config.merge_aoe_hits,
    );
    diagnostics.initial_groups = groups.len();

    let (groups, outliers) = cast_group::split_outliers(groups, config.outlier_ratio);
    diagnostics.outliers_split = outliers;

    let rows = rows::project_rows(&groups, roster, origin, config, &mut diagnostics);
    diagnostics.rows = rows.len();

    tracing::info!(
        events = diagnostics.events_received,
        kept = diagnostics.filter.kept,
        ticks_merged = diagnostics.dot.ticks_merged,
        dot_summaries = diagnostics.dot.clusters,
        initial_groups = diagnostics.initial_groups,
        rows = diagnostics.rows,
        "Timeline analysis complete"
    );

    Analysis {
        rows,
        origin,
        diagnostics,
    }
}

/// Ingest the fetched events of one fight of a report and run the pipeline.
///
/// Entries the source could not decode count as skipped malformed events.
pub fn analyze_fight(
    report: &Report,
    fight_id: i64,
    fetched: &FightEvents,
    config: &AnalysisConfig,
) -> Result<Analysis, AnalysisError> {
    let fight = report
        .fight(fight_id)
        .ok_or(AnalysisError::FightNotFound { fight_id })?;
    let roster = Roster::from_master_data(report.master_data.as_ref())?;

    let ingested = EventParser::new().ingest(&fetched.events);
    let mut diagnostics = Diagnostics {
        events_received: fetched.received(),
        zero_multipliers: ingested.zero_multipliers,
        ..Default::default()
    };
    for err in fetched.invalid.iter().chain(&ingested.skipped) {
        tracing::debug!(error = %err, "Skipped malformed event");
        diagnostics.record_skip(err.reason());
    }

    Ok(analyze(
        &ingested.events,
        &roster,
        fight.start_time,
        config,
        diagnostics,
    ))
}
