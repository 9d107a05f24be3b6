use super::cast_group::{group_casts, median, split_outliers};
use super::dot_cluster::{cluster_dots, partition_ticks};
use super::filter::filter_events;
use super::snapshot::bind_snapshots;
use super::*;
use crate::combat_log::{EventKind, ParseError, RawEvent, TypeCode};
use crate::report::{EventPage, Fight, FightEvents, MasterData, RawAbility, RawActor};

const PLAYER: i64 = 1;
const PET: i64 = 10;
const BOSS: i64 = 20;
const ADD: i64 = 21;

const CLEAVE: i64 = 100;
const BLEED: i64 = 200;
const COMBINED_DOTS: i64 = 300;
const ATTACK: i64 = 7;

fn actors() -> Vec<RawActor> {
    let actor = |id: i64, name: &str, kind: &str, pet_owner: Option<i64>| RawActor {
        id,
        name: name.to_string(),
        kind: kind.to_string(),
        sub_type: None,
        pet_owner,
    };
    vec![
        actor(PLAYER, "Warrior", "Player", None),
        actor(PET, "Carbuncle", "Pet", Some(PLAYER)),
        actor(BOSS, "Boss", "NPC", None),
        actor(ADD, "Add", "NPC", None),
    ]
}

fn abilities() -> Vec<RawAbility> {
    let ability = |id: i64, name: &str, code: i64| RawAbility {
        game_id: id,
        name: name.to_string(),
        kind: Some(TypeCode::Number(code)),
    };
    vec![
        ability(CLEAVE, "Cleave", 128),
        ability(BLEED, "Bleed", 1),
        ability(COMBINED_DOTS, "Combined DoTs", 32),
        ability(ATTACK, "Attack", 1),
    ]
}

fn roster() -> Roster {
    Roster::build(&actors(), Some(&abilities()))
}

fn damage(line: u64, ts: i64, source: i64, target: i64, ability: i64, raw: i64) -> Event {
    Event {
        line_number: line,
        timestamp: ts,
        kind: EventKind::Damage,
        source_id: Some(source),
        target_id: Some(target),
        ability_id: ability,
        amount: raw / 2,
        multiplier: 0.5,
        unmitigated_amount: Some(raw),
        ..Default::default()
    }
}

fn snapshot(line: u64, ts: i64, source: i64, target: i64, ability: i64) -> Event {
    Event {
        kind: EventKind::Calculated,
        ..damage(line, ts, source, target, ability, 0)
    }
}

fn tick(line: u64, ts: i64, target: i64, raw: i64) -> Event {
    Event {
        is_tick: true,
        ..damage(line, ts, BOSS, target, BLEED, raw)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filter
// ─────────────────────────────────────────────────────────────────────────────

fn mixed_stream() -> Vec<Event> {
    vec![
        Event {
            kind: EventKind::LimitBreakUpdate,
            timestamp: 0,
            ..Default::default()
        },
        snapshot(1, 100, BOSS, 2, CLEAVE),
        damage(2, 300, BOSS, 2, CLEAVE, 8000),
        damage(3, 300, PLAYER, BOSS, CLEAVE, 8000),
        damage(4, 300, PET, BOSS, CLEAVE, 8000),
        damage(5, 400, BOSS, 2, COMBINED_DOTS, 500),
        damage(6, 500, BOSS, 2, ATTACK, 500),
        damage(7, 600, BOSS, 2, 1, 500),
        tick(8, 700, 2, 300),
        damage(9, 800, ADD, 2, 999, 100),
    ]
}

#[test]
fn test_filter_removes_by_rule() {
    let config = AnalysisConfig {
        ignore_basic_attack: true,
        ..Default::default()
    };
    let (kept, stats) = filter_events(&mixed_stream(), &roster(), &config);

    let lines: Vec<u64> = kept.iter().map(|e| e.line_number).collect();
    // unresolvable ability 999 is kept
    assert_eq!(lines, vec![1, 2, 8, 9]);
    assert_eq!(stats.non_damage_kind, 1);
    assert_eq!(stats.player_sourced, 1);
    assert_eq!(stats.pet_sourced, 1);
    assert_eq!(stats.aggregate_rollup, 1);
    assert_eq!(stats.basic_attack, 2);
    assert_eq!(stats.kept, 4);
}

#[test]
fn test_filter_drops_snapshots_when_binding_off() {
    let config = AnalysisConfig {
        bind_snapshots: false,
        ..Default::default()
    };
    let (kept, stats) = filter_events(&mixed_stream(), &roster(), &config);
    assert!(kept.iter().all(|e| e.kind == EventKind::Damage));
    assert_eq!(stats.non_damage_kind, 2);
}

#[test]
fn test_filter_drops_unmerged_ticks_when_not_individual() {
    let config = AnalysisConfig {
        include_ticks_as_individual: false,
        merge_dot_ticks: false,
        ..Default::default()
    };
    let (kept, stats) = filter_events(&mixed_stream(), &roster(), &config);
    assert!(kept.iter().all(|e| !e.is_tick));
    assert_eq!(stats.unmerged_ticks, 1);
}

#[test]
fn test_filter_is_idempotent() {
    let config = AnalysisConfig {
        ignore_basic_attack: true,
        ..Default::default()
    };
    let roster = roster();
    let (first, _) = filter_events(&mixed_stream(), &roster, &config);
    let (second, stats) = filter_events(&first, &roster, &config);
    assert_eq!(first, second);
    assert_eq!(stats.removed(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot binding
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_binder_uses_nearest_preceding_snapshot() {
    let events = vec![
        snapshot(1, 100, BOSS, 2, CLEAVE),
        damage(2, 400, BOSS, 2, CLEAVE, 1000),
        snapshot(3, 500, BOSS, 2, CLEAVE),
        damage(4, 600, BOSS, 2, CLEAVE, 1000),
        damage(5, 700, BOSS, 3, CLEAVE, 1000),
        snapshot(6, 800, BOSS, 3, CLEAVE),
        tick(7, 900, 2, 100),
    ];
    let (bound, count) = bind_snapshots(&events);

    assert_eq!(count, 2);
    assert!(bound.iter().all(|e| e.kind != EventKind::Calculated));
    let ts_of = |line: u64| {
        bound
            .iter()
            .find(|e| e.line_number == line)
            .map(|e| e.timestamp)
    };
    assert_eq!(ts_of(2), Some(100));
    assert_eq!(ts_of(4), Some(500));
    // snapshot for target 3 only arrives later
    assert_eq!(ts_of(5), Some(700));
    assert_eq!(ts_of(7), Some(900));
    assert!(bound.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_binder_retimes_ticks_with_matching_snapshot() {
    let events = vec![snapshot(1, 1000, BOSS, 2, BLEED), tick(2, 1300, 2, 600)];
    let (bound, count) = bind_snapshots(&events);

    assert_eq!(count, 1);
    assert_eq!(bound.len(), 1);
    assert_eq!(bound[0].timestamp, 1000);
    assert!(bound[0].is_tick);
}

#[test]
fn test_binder_leaves_unsnapshotted_hits_untouched() {
    let events = vec![damage(1, 1234, BOSS, 2, CLEAVE, 1000)];
    let (bound, count) = bind_snapshots(&events);
    assert_eq!(count, 0);
    assert_eq!(bound, events);
}

#[test]
fn test_binder_never_drops_damage() {
    let events = mixed_stream();
    let damage_count = events
        .iter()
        .filter(|e| e.kind != EventKind::Calculated)
        .count();
    let (bound, _) = bind_snapshots(&events);
    assert_eq!(bound.len(), damage_count);
}

// ─────────────────────────────────────────────────────────────────────────────
// DoT clustering
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ticks_split_on_gap() {
    let ticks: Vec<Event> = [0, 2000, 4000, 9000, 11000]
        .iter()
        .enumerate()
        .map(|(i, ts)| tick(i as u64, *ts, 2, 3000))
        .collect();
    let (merged, stats) = cluster_dots(ticks, 4000);

    assert_eq!(stats.ticks_merged, 5);
    assert_eq!(stats.clusters, 2);
    assert_eq!(merged.len(), 2);
    let durations: Vec<i64> = merged
        .iter()
        .filter_map(|e| e.dot.map(|d| d.duration_ms))
        .collect();
    assert_eq!(durations, vec![4000, 2000]);
    assert_eq!(merged[0].timestamp, 0);
    assert_eq!(merged[1].timestamp, 9000);
    assert!(merged.iter().all(|e| e.is_synthetic && !e.is_tick));
}

#[test]
fn test_synthesized_event_sums() {
    let mut first = tick(1, 0, 2, 3000);
    first.absorbed = 50;
    first.multiplier = 0.8;
    let mut second = tick(2, 3000, 2, 0);
    second.amount = 400;
    second.unmitigated_amount = None;
    second.multiplier = 0.0;

    let (merged, _) = cluster_dots(vec![first, second], 4000);
    let event = &merged[0];
    assert_eq!(event.amount, 1500 + 400);
    assert_eq!(event.unmitigated_amount, Some(3000 + 400));
    assert_eq!(event.absorbed, 50);
    assert_eq!(event.multiplier, 0.8);
    let dot = event.dot.unwrap();
    assert_eq!(dot.tick_count, 2);
    // zero multiplier divides by 1
    assert_eq!(dot.average_raw_per_tick, (3000.0 + 400.0) / 2.0);
}

#[test]
fn test_synthesized_sums_saturate() {
    let mut first = tick(1, 0, 2, 0);
    first.amount = i64::MAX;
    first.unmitigated_amount = Some(i64::MAX);
    let second = tick(2, 1000, 2, 2000);

    let (merged, _) = cluster_dots(vec![first, second], 4000);
    assert_eq!(merged[0].amount, i64::MAX);
    assert_eq!(merged[0].unmitigated_amount, Some(i64::MAX));
}

#[test]
fn test_cluster_gap_invariant() {
    let threshold = 4000;
    let mut ticks = Vec::new();
    for (i, ts) in [0, 1000, 5001, 6000, 6500, 11000, 11001, 30000]
        .iter()
        .enumerate()
    {
        ticks.push(tick(i as u64, *ts, 2, 100));
        ticks.push(tick(100 + i as u64, ts + 3999, 3, 100));
    }
    let total = ticks.len();
    let clusters = partition_ticks(ticks, threshold);

    assert_eq!(clusters.iter().map(|c| c.ticks.len()).sum::<usize>(), total);
    for cluster in &clusters {
        assert!(
            cluster
                .ticks
                .windows(2)
                .all(|w| w[1].timestamp - w[0].timestamp <= threshold)
        );
    }
    for pair in clusters.windows(2) {
        if pair[0].key == pair[1].key {
            assert!(pair[1].start_time - pair[0].last_time > threshold);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Grouping and outliers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_outlier_example_eight_targets() {
    let mut raws = vec![1000; 7];
    raws.push(9000);
    let events: Vec<Event> = raws
        .iter()
        .enumerate()
        .map(|(i, raw)| damage(i as u64, 5000, BOSS, 30 + i as i64, CLEAVE, *raw))
        .collect();

    let groups = group_casts(events, 0, true);
    assert_eq!(groups.len(), 1);
    let (groups, split) = split_outliers(groups, 1.5);

    assert_eq!(split, 1);
    assert_eq!(groups.len(), 2);
    let normal = groups.iter().find(|g| !g.is_outlier).unwrap();
    let outlier = groups.iter().find(|g| g.is_outlier).unwrap();
    assert_eq!(normal.len(), 7);
    assert_eq!(normal.representative().calculated_raw, 1000.0);
    assert_eq!(outlier.len(), 1);
    assert_eq!(outlier.representative().calculated_raw, 9000.0);
}

#[test]
fn test_outlier_invariant() {
    let ratio = 1.5;
    let raws = [100, 200, 250, 300, 1000, 5000];
    let events: Vec<Event> = raws
        .iter()
        .enumerate()
        .map(|(i, raw)| damage(i as u64, 0, BOSS, 30 + i as i64, CLEAVE, *raw))
        .collect();
    let mut sorted: Vec<f64> = raws.iter().map(|r| *r as f64).collect();
    sorted.sort_by(f64::total_cmp);
    let mid = median(&sorted);
    assert_eq!(mid, 275.0);

    let (groups, split) = split_outliers(group_casts(events, 0, true), ratio);
    assert_eq!(split, 2);
    for group in &groups {
        for member in &group.members {
            if group.is_outlier {
                assert!(member.calculated_raw > ratio * mid);
            } else {
                assert!(member.calculated_raw <= ratio * mid);
            }
        }
    }
}

#[test]
fn test_group_member_conservation() {
    let mut events = Vec::new();
    for (i, ts) in [0, 0, 0, 300, 900, 1500, 1500, 4000].iter().enumerate() {
        let ability = if i % 3 == 0 { CLEAVE } else { BLEED };
        events.push(damage(i as u64, *ts, BOSS, 30 + i as i64, ability, 1000 * (i as i64 + 1)));
    }
    let total = events.len();

    for window in [0, 1000] {
        let (groups, _) = split_outliers(group_casts(events.clone(), window, true), 1.5);
        assert_eq!(groups.iter().map(CastGroup::len).sum::<usize>(), total);
        assert!(groups.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Full pipeline
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_analyze_eight_target_cast() {
    let mut raws = vec![1000; 7];
    raws.push(9000);
    let events: Vec<Event> = raws
        .iter()
        .enumerate()
        .map(|(i, raw)| damage(i as u64, 5000, BOSS, 30 + i as i64, CLEAVE, *raw))
        .collect();

    let analysis = analyze(&events, &roster(), 0, &AnalysisConfig::default(), Diagnostics::default());
    assert_eq!(analysis.rows.len(), 2);
    let normal = analysis.rows.iter().find(|r| !r.is_outlier).unwrap();
    assert_eq!(normal.targets_hit, 7);
    assert_eq!(normal.raw_damage, Some(1000));
    assert_eq!(normal.source, "Boss");
    assert_eq!(normal.ability, "Cleave");
    assert_eq!(normal.damage_kind, "Physical");
    assert_eq!(normal.time, "00:00");
    assert_eq!(analysis.diagnostics.outliers_split, 1);
    assert_eq!(analysis.diagnostics.initial_groups, 1);
}

#[test]
fn test_analyze_dot_summary_rows() {
    let ticks: Vec<Event> = [0, 2000, 4000, 9000, 11000]
        .iter()
        .enumerate()
        .map(|(i, ts)| tick(i as u64, *ts, 2, 3000))
        .collect();
    let config = AnalysisConfig {
        merge_dot_ticks: true,
        ..Default::default()
    };
    let analysis = analyze(&ticks, &roster(), 0, &config, Diagnostics::default());

    assert_eq!(analysis.rows.len(), 2);
    let first = &analysis.rows[0];
    assert_eq!(first.ability, "Bleed (DoT)");
    assert_eq!(first.direct_damage, None);
    assert_eq!(first.absorbed, None);
    assert_eq!(first.multiplier, None);
    assert_eq!(first.raw_damage, None);
    assert_eq!(first.dot_duration_ms, Some(4000));
    assert_eq!(first.dot_average_raw_per_tick, Some(3000));
    assert_eq!(analysis.rows[1].dot_duration_ms, Some(2000));
    assert_eq!(analysis.rows[1].time, "00:09");
}

#[test]
fn test_analyze_rows_ordered_and_relative() {
    let events = vec![
        Event {
            kind: EventKind::LimitBreakUpdate,
            timestamp: 2000,
            ..Default::default()
        },
        snapshot(1, 1500, BOSS, 2, CLEAVE),
        damage(2, 9000, ADD, 2, BLEED, 500),
        damage(3, 2600, BOSS, 2, CLEAVE, 4000),
        damage(4, 2400, BOSS, 3, CLEAVE, 4000),
        damage(5, 70_000, BOSS, 2, 999, 100),
    ];
    for bind in [true, false] {
        let config = AnalysisConfig {
            bind_snapshots: bind,
            ..Default::default()
        };
        let analysis = analyze(&events, &roster(), 0, &config, Diagnostics::default());
        assert_eq!(analysis.origin.source, OriginSource::LimitBreak);
        assert!(
            analysis
                .rows
                .windows(2)
                .all(|w| w[0].timestamp_ms <= w[1].timestamp_ms)
        );
        assert!(analysis.rows.iter().all(|r| r.offset_ms == r.timestamp_ms - 2000));
        assert_eq!(analysis.diagnostics.unresolved_abilities, 1);
    }

    // bound hit lands before the origin
    let analysis = analyze(&events, &roster(), 0, &AnalysisConfig::default(), Diagnostics::default());
    assert_eq!(analysis.rows[0].time, "-00:00");
    assert_eq!(analysis.rows[0].offset_ms, -500);
    assert_eq!(analysis.diagnostics.snapshots_bound, 1);
}

#[test]
fn test_analyze_unknown_source_is_environment() {
    let mut event = damage(1, 0, BOSS, 2, CLEAVE, 1000);
    event.source_id = None;
    let unknown = damage(2, 10, 404, 2, CLEAVE, 1000);

    let analysis = analyze(
        &[event, unknown],
        &roster(),
        0,
        &AnalysisConfig::default(),
        Diagnostics::default(),
    );
    assert!(analysis.rows.iter().all(|r| r.source == "Environment"));
    assert_eq!(analysis.diagnostics.unresolved_sources, 1);
}

#[test]
fn test_analyze_zero_events_is_empty() {
    let analysis = analyze(&[], &roster(), 77, &AnalysisConfig::default(), Diagnostics::default());
    assert!(analysis.is_empty());
    assert_eq!(analysis.origin.timestamp, 77);
    assert_eq!(analysis.origin.source, OriginSource::Nominal);
}

// ─────────────────────────────────────────────────────────────────────────────
// Fight entry point
// ─────────────────────────────────────────────────────────────────────────────

fn report(master: Option<MasterData>) -> Report {
    Report {
        title: "Test".to_string(),
        master_data: master,
        fights: vec![Fight {
            id: 3,
            name: "Boss".to_string(),
            start_time: 0,
            end_time: 60_000,
            fight_percentage: None,
            kill: Some(true),
        }],
        ..Default::default()
    }
}

fn raw(json: &str) -> RawEvent {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_analyze_fight_missing_actor_table_is_fatal() {
    let master = MasterData {
        actors: None,
        abilities: Some(abilities()),
    };
    let err = analyze_fight(&report(Some(master)), 3, &FightEvents::default(), &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::MissingReferenceData { table: "actors" }));
}

#[test]
fn test_analyze_fight_unknown_fight() {
    let err = analyze_fight(&report(None), 9, &FightEvents::default(), &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::FightNotFound { fight_id: 9 }));
}

#[test]
fn test_analyze_fight_counts_skipped_events() {
    let master = MasterData {
        actors: Some(actors()),
        abilities: None,
    };
    let fetched = FightEvents {
        events: vec![
            raw(r#"{"timestamp":100,"type":"damage","sourceID":20,"targetID":2,"abilityGameID":100,"amount":4400,"multiplier":0}"#),
            raw(r#"{"timestamp":200,"type":"damage","sourceID":20,"targetID":2}"#),
            raw(r#"{"type":"damage","sourceID":20,"abilityGameID":100}"#),
        ],
        invalid: Vec::new(),
    };
    let analysis =
        analyze_fight(&report(Some(master)), 3, &fetched, &AnalysisConfig::default()).unwrap();

    assert_eq!(analysis.diagnostics.events_received, 3);
    assert_eq!(analysis.diagnostics.skipped_total(), 2);
    assert_eq!(analysis.diagnostics.skipped.get("missing ability id"), Some(&1));
    assert_eq!(analysis.diagnostics.zero_multipliers, 1);
    assert!(analysis.diagnostics.ability_table_missing);
    assert_eq!(analysis.rows.len(), 1);
    assert_eq!(analysis.rows[0].ability, "Unknown (100)");
    assert_eq!(analysis.rows[0].raw_damage, Some(4000));
}

#[test]
fn test_analyze_fight_counts_undecodable_entries() {
    let master = MasterData {
        actors: Some(actors()),
        abilities: Some(abilities()),
    };
    let page: EventPage = serde_json::from_str(
        r#"{"data":[
            {"timestamp":100,"type":"damage","sourceID":20,"targetID":2,"abilityGameID":100,"amount":500,"unmitigatedAmount":1000},
            {"timestamp":"late","type":"damage","sourceID":20,"targetID":2,"abilityGameID":100}
        ]}"#,
    )
    .unwrap();
    let fetched = FightEvents {
        events: page.data,
        invalid: page.invalid,
    };
    let analysis =
        analyze_fight(&report(Some(master)), 3, &fetched, &AnalysisConfig::default()).unwrap();

    assert_eq!(analysis.diagnostics.events_received, 2);
    assert_eq!(analysis.diagnostics.skipped.get("invalid json"), Some(&1));
    assert_eq!(analysis.rows.len(), 1);
    assert_eq!(analysis.rows[0].ability, "Cleave");
    assert!(matches!(fetched.invalid[0], ParseError::InvalidJson { line_number: 2, .. }));
}
