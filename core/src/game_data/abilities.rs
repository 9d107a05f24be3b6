//! Ability classification tables.
//!
//! Damage-kind codes follow the report source's ability `type` field, which
//! is a school bitmask; only the codes seen on hostile abilities are named.

use phf::{phf_map, phf_set};
use serde::Serialize;

/// Reserved ability id of the default basic attack.
pub const BASIC_ATTACK_ABILITY_ID: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DamageKind {
    Physical,
    Magical,
    Mixed,
    Special,
    /// Carries the unmapped code
    Unknown(i64),
}

impl DamageKind {
    pub fn from_code(code: i64) -> Self {
        DAMAGE_KIND_CODES
            .get(&code)
            .copied()
            .unwrap_or(DamageKind::Unknown(code))
    }

    pub fn label(&self) -> String {
        match self {
            DamageKind::Physical => "Physical".to_string(),
            DamageKind::Magical => "Magical".to_string(),
            DamageKind::Mixed => "Mixed".to_string(),
            DamageKind::Special => "Special".to_string(),
            DamageKind::Unknown(code) => format!("Type {code}"),
        }
    }
}

static DAMAGE_KIND_CODES: phf::Map<i64, DamageKind> = phf_map! {
    1i64 => DamageKind::Physical,
    2i64 => DamageKind::Magical,
    8i64 => DamageKind::Mixed,
    32i64 => DamageKind::Special,
    128i64 => DamageKind::Physical,
    1024i64 => DamageKind::Magical,
};

/// Rollup abilities that re-report tick damage already present as ticks.
static AGGREGATE_ROLLUP_NAMES: phf::Set<&'static str> = phf_set! {
    "combined dots",
};

/// Basic attack names, normalized.
static BASIC_ATTACK_NAMES: phf::Set<&'static str> = phf_set! {
    "attack",
    "auto attack",
    "auto-attack",
    "autoattack",
};

/// Lowercase and collapse inner whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn is_aggregate_rollup(name: &str) -> bool {
    AGGREGATE_ROLLUP_NAMES.contains(normalize_name(name).as_str())
}

pub fn is_basic_attack(ability_id: i64, name: Option<&str>) -> bool {
    ability_id == BASIC_ATTACK_ABILITY_ID
        || name.is_some_and(|n| BASIC_ATTACK_NAMES.contains(normalize_name(n).as_str()))
}
