//! Row projection: one output row per final cast group.

use castline_types::{AnalysisConfig, Assignments, TimelineRow};

use super::Diagnostics;
use super::cast_group::CastGroup;
use super::normalize::{TimeOrigin, format_offset};
use crate::roster::{NameSource, Roster};

const DOT_SUFFIX: &str = " (DoT)";

/// Round to the nearest multiple of `step`; a non-positive step rounds to
/// the nearest integer.
pub fn round_to(value: f64, step: i64) -> i64 {
    if step <= 0 {
        return value.round() as i64;
    }
    let step = step as f64;
    ((value / step).round() * step) as i64
}

pub fn project_rows(
    groups: &[CastGroup],
    roster: &Roster,
    origin: TimeOrigin,
    config: &AnalysisConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<TimelineRow> {
    groups
        .iter()
        .map(|group| {
            let rep = group.representative();
            let event = &rep.event;

            let (source, source_resolved) = roster.source_name(event.source_id);
            if !source_resolved {
                diagnostics.unresolved_sources += 1;
            }
            let (mut ability, name_source) = roster.ability_name(event);
            if name_source == NameSource::Placeholder {
                diagnostics.unresolved_abilities += 1;
            }
            let damage_kind = roster
                .damage_kind(event)
                .map(|k| k.label())
                .unwrap_or_default();

            let offset_ms = origin.offset(group.timestamp);
            let mut row = TimelineRow {
                time: format_offset(offset_ms, config.time_format),
                offset_ms,
                timestamp_ms: group.timestamp,
                source,
                ability_id: event.ability_id,
                ability: String::new(),
                damage_kind,
                direct_damage: Some(event.amount),
                absorbed: Some(event.absorbed),
                multiplier: Some(event.multiplier),
                raw_damage: Some(round_to(rep.calculated_raw, config.round_raw_damage_to)),
                targets_hit: group.len(),
                dot_duration_ms: None,
                dot_average_raw_per_tick: None,
                is_outlier: group.is_outlier,
                assignments: Assignments::default(),
            };

            if let Some(dot) = event.dot.filter(|_| event.is_synthetic) {
                ability.push_str(DOT_SUFFIX);
                row.direct_damage = None;
                row.absorbed = None;
                row.multiplier = None;
                row.raw_damage = None;
                row.dot_duration_ms = Some(dot.duration_ms);
                row.dot_average_raw_per_tick = Some(round_to(
                    dot.average_raw_per_tick,
                    config.round_raw_damage_to,
                ));
            }
            row.ability = ability;
            row
        })
        .collect()
}
