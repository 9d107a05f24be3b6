use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum EventKind {
    /// Applied (post-mitigation) damage
    Damage,
    /// Pre-mitigation snapshot reported ahead of the applied hit
    Calculated,
    /// Limit break gauge update, only used to pick the time origin
    LimitBreakUpdate,
    #[default]
    Other,
}

impl EventKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "damage" => EventKind::Damage,
            "calculateddamage" => EventKind::Calculated,
            "limitbreakupdate" => EventKind::LimitBreakUpdate,
            _ => EventKind::Other,
        }
    }

    /// Kinds that carry a damage amount.
    pub fn is_damage_bearing(&self) -> bool {
        matches!(self, EventKind::Damage | EventKind::Calculated)
    }
}

/// Summary fields attached to a synthesized DoT event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DotSummary {
    /// Last tick minus first tick
    pub duration_ms: i64,
    pub tick_count: usize,
    pub average_raw_per_tick: f64,
}

/// A single telemetry record in encounter time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Line (or array index) the event was read from, 1-based
    pub line_number: u64,
    pub timestamp: i64,
    pub kind: EventKind,
    /// None is the environment
    pub source_id: Option<i64>,
    pub target_id: Option<i64>,
    pub ability_id: i64,
    pub ability_name: Option<String>,
    /// Numeric damage-kind code reported inline with the event
    pub ability_type: Option<i64>,
    pub amount: i64,
    pub absorbed: i64,
    pub overkill: i64,
    /// Mitigation factor, never zero
    pub multiplier: f64,
    pub unmitigated_amount: Option<i64>,
    pub is_tick: bool,
    pub is_synthetic: bool,
    pub dot: Option<DotSummary>,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            line_number: 0,
            timestamp: 0,
            kind: EventKind::default(),
            source_id: None,
            target_id: None,
            ability_id: 0,
            ability_name: None,
            ability_type: None,
            amount: 0,
            absorbed: 0,
            overkill: 0,
            multiplier: 1.0,
            unmitigated_amount: None,
            is_tick: false,
            is_synthetic: false,
            dot: None,
        }
    }
}

/// Identity of a hit stream: who hit whom with what.
pub type HitKey = (Option<i64>, Option<i64>, i64);

impl Event {
    pub fn hit_key(&self) -> HitKey {
        (self.source_id, self.target_id, self.ability_id)
    }

    /// Where the raw damage figure of an event came from.
    pub fn raw_damage_source(&self) -> RawDamageSource {
        match self.unmitigated_amount {
            Some(_) => RawDamageSource::Unmitigated,
            None => RawDamageSource::Formula,
        }
    }

    /// Estimated pre-mitigation damage.
    ///
    /// Resolution order: the reported unmitigated amount, then
    /// `(amount + absorbed + overkill) / multiplier`.
    pub fn raw_damage(&self) -> f64 {
        match self.raw_damage_source() {
            RawDamageSource::Unmitigated => self.unmitigated_amount.unwrap_or_default() as f64,
            RawDamageSource::Formula => {
                let total = self.amount as f64 + self.absorbed as f64 + self.overkill as f64;
                total / guard_multiplier(self.multiplier)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDamageSource {
    Unmitigated,
    Formula,
}

/// A zero (or non-finite) multiplier divides by 1 instead.
pub fn guard_multiplier(multiplier: f64) -> f64 {
    if multiplier == 0.0 || !multiplier.is_finite() {
        1.0
    } else {
        multiplier
    }
}
