mod abilities;

pub use abilities::{
    BASIC_ATTACK_ABILITY_ID, DamageKind, is_aggregate_rollup, is_basic_attack, normalize_name,
};
