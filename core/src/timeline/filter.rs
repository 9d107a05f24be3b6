//! Event filter: keeps hostile damage worth a timeline row.

use castline_types::AnalysisConfig;

use super::FilterStats;
use crate::combat_log::{Event, EventKind};
use crate::game_data::{is_aggregate_rollup, is_basic_attack};
use crate::roster::Roster;

/// Why an event was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NonDamageKind,
    PlayerSourced,
    PetSourced,
    AggregateRollup,
    BasicAttack,
    UnmergedTick,
}

/// Decide whether a single event survives the filter.
///
/// Snapshot (`calculated`) events are only requested while snapshot binding
/// is on; the binder consumes them.
pub fn classify(event: &Event, roster: &Roster, config: &AnalysisConfig) -> Option<Rejection> {
    match event.kind {
        EventKind::Damage => {}
        EventKind::Calculated if config.bind_snapshots => {}
        _ => return Some(Rejection::NonDamageKind),
    }

    if let Some(source_id) = event.source_id {
        if roster.is_player(source_id) {
            return Some(Rejection::PlayerSourced);
        }
        if roster.is_player_pet(source_id) {
            return Some(Rejection::PetSourced);
        }
    }

    let ability_name = roster.known_ability_name(event);
    let source_name = event
        .source_id
        .and_then(|id| roster.actor(id))
        .map(|a| a.name.as_str());
    if ability_name.is_some_and(is_aggregate_rollup) || source_name.is_some_and(is_aggregate_rollup)
    {
        return Some(Rejection::AggregateRollup);
    }

    if config.ignore_basic_attack && is_basic_attack(event.ability_id, ability_name) {
        return Some(Rejection::BasicAttack);
    }

    if event.is_tick && !config.merge_dot_ticks && !config.include_ticks_as_individual {
        return Some(Rejection::UnmergedTick);
    }

    None
}

/// Keep the events that pass [`classify`], counting removals per rule.
pub fn filter_events(
    events: &[Event],
    roster: &Roster,
    config: &AnalysisConfig,
) -> (Vec<Event>, FilterStats) {
    let mut stats = FilterStats::default();
    let kept: Vec<Event> = events
        .iter()
        .filter(|event| match classify(event, roster, config) {
            None => true,
            Some(rejection) => {
                let counter = match rejection {
                    Rejection::NonDamageKind => &mut stats.non_damage_kind,
                    Rejection::PlayerSourced => &mut stats.player_sourced,
                    Rejection::PetSourced => &mut stats.pet_sourced,
                    Rejection::AggregateRollup => &mut stats.aggregate_rollup,
                    Rejection::BasicAttack => &mut stats.basic_attack,
                    Rejection::UnmergedTick => &mut stats.unmerged_ticks,
                };
                *counter += 1;
                false
            }
        })
        .cloned()
        .collect();
    stats.kept = kept.len();

    tracing::debug!(kept = stats.kept, removed = stats.removed(), "Filtered events");
    (kept, stats)
}
