//! Cast grouping and outlier isolation.

use crate::combat_log::Event;

/// An event with its raw damage estimate computed once up front.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    pub event: Event,
    pub calculated_raw: f64,
}

impl GroupMember {
    pub fn new(event: Event) -> Self {
        let calculated_raw = event.raw_damage();
        Self {
            event,
            calculated_raw,
        }
    }
}

/// Hits considered part of one ability use.
#[derive(Debug, Clone, PartialEq)]
pub struct CastGroup {
    /// Earliest member timestamp
    pub timestamp: i64,
    pub source_id: Option<i64>,
    pub ability_id: i64,
    pub members: Vec<GroupMember>,
    /// Index into `members`
    pub representative: usize,
    pub is_outlier: bool,
}

impl CastGroup {
    fn single(member: GroupMember) -> Self {
        Self {
            timestamp: member.event.timestamp,
            source_id: member.event.source_id,
            ability_id: member.event.ability_id,
            members: vec![member],
            representative: 0,
            is_outlier: false,
        }
    }

    fn matches(&self, event: &Event) -> bool {
        self.source_id == event.source_id && self.ability_id == event.ability_id
    }

    pub fn representative(&self) -> &GroupMember {
        &self.members[self.representative]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Group time-ordered events by `(source, ability)` and proximity.
///
/// A hit joins an open group when it lies within `window_ms` of the group's
/// earliest member; `0` means exact timestamp equality. Groups are scanned
/// from newest to oldest and the scan stops at the first group older than
/// the window. With `merge` off every event is its own group.
pub fn group_casts(events: Vec<Event>, window_ms: i64, merge: bool) -> Vec<CastGroup> {
    let mut groups: Vec<CastGroup> = Vec::with_capacity(events.len());

    for event in events {
        let member = GroupMember::new(event);
        if !merge {
            groups.push(CastGroup::single(member));
            continue;
        }

        let earliest_allowed = member.event.timestamp - window_ms;
        let mut target = None;
        for (idx, group) in groups.iter().enumerate().rev() {
            if group.timestamp < earliest_allowed {
                break;
            }
            if group.matches(&member.event) {
                target = Some(idx);
                break;
            }
        }

        match target {
            Some(idx) => groups[idx].members.push(member),
            None => groups.push(CastGroup::single(member)),
        }
    }

    tracing::debug!(groups = groups.len(), window_ms, merge, "Grouped casts");
    groups
}

/// Median of sorted values; mean of the middle pair for even counts.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Split members above `ratio * median` into singleton outlier groups.
///
/// Normal members stay together with the lower-median member of the normal
/// subset as representative. A median of zero disables the split. Returns the
/// groups re-sorted by timestamp and the number of outliers split off.
pub fn split_outliers(groups: Vec<CastGroup>, ratio: f64) -> (Vec<CastGroup>, usize) {
    let mut out = Vec::with_capacity(groups.len());
    let mut split = 0usize;

    for mut group in groups {
        if group.members.len() <= 1 {
            group.representative = 0;
            out.push(group);
            continue;
        }

        group
            .members
            .sort_by(|a, b| a.calculated_raw.total_cmp(&b.calculated_raw));
        let raws: Vec<f64> = group.members.iter().map(|m| m.calculated_raw).collect();
        let mid = median(&raws);
        let threshold = ratio * mid;

        let (normal, outliers): (Vec<GroupMember>, Vec<GroupMember>) = group
            .members
            .into_iter()
            .partition(|m| mid <= 0.0 || m.calculated_raw <= threshold);

        split += outliers.len();
        out.extend(outliers.into_iter().map(|m| CastGroup {
            is_outlier: true,
            ..CastGroup::single(m)
        }));

        if !normal.is_empty() {
            let timestamp = normal
                .iter()
                .map(|m| m.event.timestamp)
                .min()
                .unwrap_or(group.timestamp);
            out.push(CastGroup {
                timestamp,
                representative: (normal.len() - 1) / 2,
                members: normal,
                ..group
            });
        }
    }

    out.sort_by_key(|g| g.timestamp);
    if split > 0 {
        tracing::debug!(split, "Split outlier hits");
    }
    (out, split)
}
