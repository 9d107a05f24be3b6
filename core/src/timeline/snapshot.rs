//! Snapshot binder: moves applied hits back to their calculated snapshot.
//!
//! Applied damage can land an irregular delay after the cast, while the
//! calculated snapshot for the same (source, target, ability) is reported at
//! cast time. Binding lines up all targets of one cast on a single timestamp.

use hashbrown::HashMap;

use crate::combat_log::{Event, EventKind, HitKey};

/// Rewrite damage timestamps (direct hits and ticks alike) to the latest
/// preceding snapshot with the same key. Snapshots are consumed and not
/// emitted.
///
/// Returns the re-sorted stream and the number of hits that were bound.
pub fn bind_snapshots(events: &[Event]) -> (Vec<Event>, usize) {
    let mut ordered: Vec<&Event> = events.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);

    let mut latest_snapshot: HashMap<HitKey, i64> = HashMap::new();
    let mut bound = 0usize;
    let mut out: Vec<Event> = Vec::with_capacity(ordered.len());

    for event in ordered {
        match event.kind {
            EventKind::Calculated => {
                latest_snapshot.insert(event.hit_key(), event.timestamp);
            }
            EventKind::Damage => {
                match latest_snapshot.get(&event.hit_key()) {
                    Some(&snapshot_ts) => {
                        bound += 1;
                        out.push(Event {
                            timestamp: snapshot_ts,
                            ..event.clone()
                        });
                    }
                    None => out.push(event.clone()),
                }
            }
            _ => out.push(event.clone()),
        }
    }

    // rewrites only move events earlier, which can reorder them
    out.sort_by_key(|e| e.timestamp);

    tracing::debug!(bound, events = out.len(), "Bound damage snapshots");
    (out, bound)
}
