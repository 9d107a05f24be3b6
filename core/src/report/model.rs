//! Report metadata as delivered by the report source.

use serde::{Deserialize, Serialize};

use crate::combat_log::{ParseError, RawEvent, TypeCode};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActor {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// "Player", "Pet", "LimitBreak", "NPC", "Boss", "Environment", ...
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub sub_type: Option<String>,
    /// Owner actor id for pets and summons
    #[serde(default)]
    pub pet_owner: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAbility {
    #[serde(rename = "gameID")]
    pub game_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<TypeCode>,
}

/// Reference tables. Either table may be missing in a damaged export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterData {
    #[serde(default)]
    pub actors: Option<Vec<RawActor>>,
    #[serde(default)]
    pub abilities: Option<Vec<RawAbility>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fight {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub fight_percentage: Option<f64>,
    #[serde(default)]
    pub kill: Option<bool>,
}

impl Fight {
    pub fn duration_ms(&self) -> i64 {
        (self.end_time - self.start_time).max(0)
    }

    /// `"Name (m:ss) - Kill - 0%"`
    pub fn label(&self) -> String {
        let secs = (self.duration_ms() as f64 / 1000.0).round() as i64;
        let outcome = if self.kill.unwrap_or(false) {
            "Kill"
        } else {
            "Wipe"
        };
        let pct = self
            .fight_percentage
            .map(|p| format!("{p}"))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} ({}:{:02}) - {} - {}%",
            self.name,
            secs / 60,
            secs % 60,
            outcome,
            pct
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: String,
    /// Unix epoch milliseconds of the report start
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub master_data: Option<MasterData>,
    #[serde(default)]
    pub fights: Vec<Fight>,
}

impl Report {
    pub fn fight(&self, id: i64) -> Option<&Fight> {
        self.fights.iter().find(|f| f.id == id)
    }

    pub fn last_fight(&self) -> Option<&Fight> {
        self.fights.last()
    }

    pub fn select_fight(&self, selector: FightSelector) -> Option<&Fight> {
        match selector {
            FightSelector::Id(id) => self.fight(id),
            FightSelector::Last => self.last_fight(),
        }
    }

    /// Local wall-clock time the report started, for display.
    pub fn started_at(&self) -> Option<chrono::DateTime<chrono::Local>> {
        chrono::DateTime::from_timestamp_millis(self.start_time)
            .map(|utc| utc.with_timezone(&chrono::Local))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightSelector {
    Id(i64),
    Last,
}

impl FightSelector {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "last" => Some(FightSelector::Last),
            other => other.parse().ok().map(FightSelector::Id),
        }
    }
}

/// One page of events from the report source.
///
/// Entries are decoded one by one, so a malformed event lands in `invalid`
/// instead of failing the page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "WireEventPage")]
pub struct EventPage {
    pub data: Vec<RawEvent>,
    /// Entries that did not decode, labelled by position in the page
    pub invalid: Vec<ParseError>,
    pub next_page_timestamp: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEventPage {
    #[serde(default)]
    data: Vec<serde_json::Value>,
    #[serde(default)]
    next_page_timestamp: Option<i64>,
}

impl From<WireEventPage> for EventPage {
    fn from(wire: WireEventPage) -> Self {
        let mut page = EventPage {
            next_page_timestamp: wire.next_page_timestamp,
            ..Default::default()
        };
        for (idx, value) in wire.data.into_iter().enumerate() {
            match RawEvent::from_value(idx as u64 + 1, value) {
                Ok(event) => page.data.push(event),
                Err(err) => page.invalid.push(err),
            }
        }
        page
    }
}
