//! DoT clustering: collapses bursts of periodic ticks into one summary event.

use hashbrown::HashMap;

use super::DotStats;
use crate::combat_log::{DotSummary, Event, HitKey};

/// Contiguous ticks of one (source, target, ability) stream.
#[derive(Debug, Clone)]
pub struct DotCluster {
    pub key: HitKey,
    pub ticks: Vec<Event>,
    pub start_time: i64,
    pub last_time: i64,
}

impl DotCluster {
    fn new(first: Event) -> Self {
        Self {
            key: first.hit_key(),
            start_time: first.timestamp,
            last_time: first.timestamp,
            ticks: vec![first],
        }
    }

    fn accepts(&self, timestamp: i64, gap_threshold_ms: i64) -> bool {
        timestamp - self.last_time <= gap_threshold_ms
    }

    fn push(&mut self, tick: Event) {
        self.last_time = tick.timestamp;
        self.ticks.push(tick);
    }

    pub fn duration_ms(&self) -> i64 {
        self.last_time - self.start_time
    }

    /// One aggregate event standing in for every tick of the cluster.
    pub fn synthesize(&self) -> Event {
        let first = &self.ticks[0];
        let count = self.ticks.len();

        let sum = |value: fn(&Event) -> i64| {
            self.ticks
                .iter()
                .map(value)
                .fold(0i64, i64::saturating_add)
        };
        let amount = sum(|t| t.amount);
        let unmitigated = sum(|t| t.unmitigated_amount.unwrap_or(t.amount));
        let absorbed = sum(|t| t.absorbed);
        let total_raw: f64 = self.ticks.iter().map(Event::raw_damage).sum();

        Event {
            timestamp: self.start_time,
            amount,
            unmitigated_amount: Some(unmitigated),
            absorbed,
            multiplier: first.multiplier,
            is_tick: false,
            is_synthetic: true,
            dot: Some(DotSummary {
                duration_ms: self.duration_ms(),
                tick_count: count,
                average_raw_per_tick: total_raw / count as f64,
            }),
            ..first.clone()
        }
    }
}

/// Split ticks into clusters per key; a gap above the threshold starts a new
/// cluster. Keys keep first-seen order so output is deterministic.
pub fn partition_ticks(ticks: Vec<Event>, gap_threshold_ms: i64) -> Vec<DotCluster> {
    let mut key_order: Vec<HitKey> = Vec::new();
    let mut by_key: HashMap<HitKey, Vec<Event>> = HashMap::new();
    for tick in ticks {
        let key = tick.hit_key();
        by_key
            .entry(key)
            .or_insert_with(|| {
                key_order.push(key);
                Vec::new()
            })
            .push(tick);
    }

    let mut clusters = Vec::new();
    for key in key_order {
        let Some(mut group) = by_key.remove(&key) else {
            continue;
        };
        group.sort_by_key(|t| t.timestamp);

        let mut current: Option<DotCluster> = None;
        for tick in group {
            match current.as_mut() {
                Some(cluster) if cluster.accepts(tick.timestamp, gap_threshold_ms) => {
                    cluster.push(tick)
                }
                _ => {
                    if let Some(done) = current.replace(DotCluster::new(tick)) {
                        clusters.push(done);
                    }
                }
            }
        }
        if let Some(done) = current {
            clusters.push(done);
        }
    }
    clusters
}

/// Replace tick events with one synthetic event per cluster and merge them
/// back into the direct events, ordered by timestamp.
pub fn cluster_dots(events: Vec<Event>, gap_threshold_ms: i64) -> (Vec<Event>, DotStats) {
    let (ticks, mut merged): (Vec<Event>, Vec<Event>) =
        events.into_iter().partition(|e| e.is_tick);

    let stats = DotStats {
        ticks_merged: ticks.len(),
        ..Default::default()
    };
    let clusters = partition_ticks(ticks, gap_threshold_ms);
    let stats = DotStats {
        clusters: clusters.len(),
        ..stats
    };

    merged.extend(clusters.iter().map(DotCluster::synthesize));
    merged.sort_by_key(|e| e.timestamp);

    tracing::debug!(
        ticks = stats.ticks_merged,
        clusters = stats.clusters,
        "Merged DoT ticks"
    );
    (merged, stats)
}
