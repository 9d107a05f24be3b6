//! Wire format of events as delivered by the report source.

use serde::{Deserialize, Serialize};

use super::ParseError;

/// Inline ability reference attached to some events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAbilityRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub guid: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<TypeCode>,
}

/// Damage-kind code that arrives either as a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeCode {
    Number(i64),
    Text(String),
}

impl TypeCode {
    pub fn as_code(&self) -> Option<i64> {
        match self {
            TypeCode::Number(n) => Some(*n),
            TypeCode::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One raw event. Unknown fields are kept so debug dumps stay lossless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, rename = "sourceID")]
    pub source_id: Option<i64>,
    #[serde(default, rename = "targetID")]
    pub target_id: Option<i64>,
    #[serde(default, rename = "abilityGameID")]
    pub ability_game_id: Option<i64>,
    #[serde(default)]
    pub ability: Option<RawAbilityRef>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub absorbed: Option<f64>,
    #[serde(default)]
    pub overkill: Option<f64>,
    #[serde(default)]
    pub multiplier: Option<f64>,
    #[serde(default, rename = "unmitigatedAmount")]
    pub unmitigated_amount: Option<f64>,
    #[serde(default)]
    pub tick: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawEvent {
    /// Decode one entry of an event list. `position` is 1-based and only
    /// used to label the error.
    pub fn from_value(position: u64, value: serde_json::Value) -> Result<Self, ParseError> {
        RawEvent::deserialize(value).map_err(|e| ParseError::InvalidJson {
            line_number: position,
            detail: e.to_string(),
        })
    }

    /// Ability id: `abilityGameID`, then the inline ability guid.
    pub fn ability_id(&self) -> Option<i64> {
        self.ability_game_id
            .filter(|id| *id != 0)
            .or_else(|| self.ability.as_ref().and_then(|a| a.guid))
    }

    pub fn has_zero_multiplier(&self) -> bool {
        self.multiplier == Some(0.0)
    }
}
