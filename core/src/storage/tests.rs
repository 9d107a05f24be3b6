use super::*;
use crate::combat_log::RawEvent;
use crate::report::{Fight, MasterData};
use castline_types::{ASSIGNMENT_SLOTS, Assignments};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

fn row(ts: i64, ability: &str, dot: bool) -> TimelineRow {
    TimelineRow {
        time: "00:01".to_string(),
        offset_ms: ts,
        timestamp_ms: ts,
        source: "Boss".to_string(),
        ability_id: 5,
        ability: ability.to_string(),
        damage_kind: "Magical".to_string(),
        direct_damage: (!dot).then_some(1200),
        absorbed: (!dot).then_some(0),
        multiplier: (!dot).then_some(0.6),
        raw_damage: (!dot).then_some(2000),
        targets_hit: 8,
        dot_duration_ms: dot.then_some(9000),
        dot_average_raw_per_tick: dot.then_some(1000),
        is_outlier: false,
        assignments: Assignments::default(),
    }
}

#[test]
fn test_timeline_filename_sanitized() {
    assert_eq!(
        timeline_filename("The Omega Protocol", ExportFormat::Json),
        "The Omega Protocol_Timeline.json"
    );
    assert_eq!(
        timeline_filename("Phase 1/2: Adds?", ExportFormat::Parquet),
        "Phase 1_2_ Adds__Timeline.parquet"
    );
    assert_eq!(timeline_filename("  ", ExportFormat::Json), "fight_Timeline.json");
}

#[test]
fn test_exports_dir_configured() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("nested").join("out");
    let dir = exports_dir(target.to_str().unwrap()).unwrap();
    assert_eq!(dir, target);
    assert!(dir.is_dir());
}

#[test]
fn test_parquet_export() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("t.parquet");
    let rows = vec![row(1000, "Flare", false), row(2000, "Bleed (DoT)", true)];
    export_timeline(&rows, ExportFormat::Parquet, &path).unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|batch| batch.unwrap()).collect();
    let total: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(total, 2);

    let schema = batches[0].schema();
    let trailing: Vec<&str> = schema.fields()[schema.fields().len() - ASSIGNMENT_SLOTS.len()..]
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    assert_eq!(trailing, ASSIGNMENT_SLOTS);
}

#[test]
fn test_json_export_blank_dot_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("t.json");
    export_timeline(&[row(2000, "Bleed (DoT)", true)], ExportFormat::Json, &path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(value[0]["directDamage"].is_null());
    assert_eq!(value[0]["dotDurationMs"], 9000);
    assert_eq!(value[0]["targetsHit"], 8);
    assert_eq!(value[0]["MT"], "");
    assert_eq!(value[0]["D4"], "");
}

#[test]
fn test_debug_dump() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join(debug_dump_filename("Boss"));
    let fight = Fight {
        id: 4,
        name: "Boss".to_string(),
        ..Default::default()
    };
    let master = MasterData::default();
    let events = vec![RawEvent {
        timestamp: Some(12),
        ..Default::default()
    }];
    let dump = DebugDump {
        report_code: Some("abc"),
        report_title: "Night",
        fight: &fight,
        master_data: Some(&master),
        events: &events,
    };
    write_debug_dump(&dump, &path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["reportCode"], "abc");
    assert_eq!(value["fight"]["id"], 4);
    assert_eq!(value["events"][0]["timestamp"], 12);
}
