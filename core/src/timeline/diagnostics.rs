//! Run-level counters for non-fatal anomalies.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Events removed by each filter rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub kept: usize,
    pub non_damage_kind: usize,
    pub player_sourced: usize,
    pub pet_sourced: usize,
    pub aggregate_rollup: usize,
    pub basic_attack: usize,
    pub unmerged_ticks: usize,
}

impl FilterStats {
    pub fn removed(&self) -> usize {
        self.non_damage_kind
            + self.player_sourced
            + self.pet_sourced
            + self.aggregate_rollup
            + self.basic_attack
            + self.unmerged_ticks
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DotStats {
    pub ticks_merged: usize,
    pub clusters: usize,
}

/// Everything a run noticed but did not fail on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub events_received: usize,
    /// Malformed events skipped, keyed by reason
    pub skipped: BTreeMap<&'static str, usize>,
    /// Zero multipliers replaced by 1
    pub zero_multipliers: usize,
    pub ability_table_missing: bool,
    pub filter: FilterStats,
    pub snapshots_bound: usize,
    pub dot: DotStats,
    pub initial_groups: usize,
    pub outliers_split: usize,
    pub unresolved_abilities: usize,
    pub unresolved_sources: usize,
    pub rows: usize,
}

impl Diagnostics {
    pub fn record_skip(&mut self, reason: &'static str) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Human readable lines, only for counters that fired.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (reason, count) in &self.skipped {
            lines.push(format!("{count} events skipped for {reason}"));
        }
        if self.ability_table_missing {
            lines.push("ability table missing, abilities labelled by id".to_string());
        }
        if self.zero_multipliers > 0 {
            lines.push(format!(
                "{} events reported a zero multiplier, 1 was used instead",
                self.zero_multipliers
            ));
        }
        let f = &self.filter;
        for (count, what) in [
            (f.non_damage_kind, "non-damage events removed"),
            (f.player_sourced, "player-sourced events removed"),
            (f.pet_sourced, "pet-sourced events removed"),
            (f.aggregate_rollup, "aggregate rollup events removed"),
            (f.basic_attack, "basic attacks removed"),
            (f.unmerged_ticks, "unmerged DoT ticks removed"),
        ] {
            if count > 0 {
                lines.push(format!("{count} {what}"));
            }
        }
        if self.snapshots_bound > 0 {
            lines.push(format!(
                "{} hits re-timed to their damage snapshot",
                self.snapshots_bound
            ));
        }
        if self.dot.clusters > 0 {
            lines.push(format!(
                "{} DoT ticks merged into {} summaries",
                self.dot.ticks_merged, self.dot.clusters
            ));
        }
        if self.outliers_split > 0 {
            lines.push(format!("{} outlier hits split into own rows", self.outliers_split));
        }
        if self.unresolved_abilities > 0 {
            lines.push(format!(
                "{} rows with unresolved ability names",
                self.unresolved_abilities
            ));
        }
        if self.unresolved_sources > 0 {
            lines.push(format!(
                "{} rows with unknown source actors",
                self.unresolved_sources
            ));
        }
        lines
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} events received, {} kept after filtering, {} initial groups, {} rows",
            self.events_received, self.filter.kept, self.initial_groups, self.rows
        )?;
        for line in self.lines() {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_only_include_fired_counters() {
        let mut diag = Diagnostics::default();
        assert!(diag.lines().is_empty());

        diag.record_skip("missing ability id");
        diag.record_skip("missing ability id");
        diag.filter.player_sourced = 4;
        let lines = diag.lines();
        assert_eq!(
            lines,
            vec![
                "2 events skipped for missing ability id".to_string(),
                "4 player-sourced events removed".to_string(),
            ]
        );
        assert_eq!(diag.skipped_total(), 2);
    }

    #[test]
    fn test_filter_removed_total() {
        let stats = FilterStats {
            kept: 10,
            non_damage_kind: 1,
            player_sourced: 2,
            pet_sourced: 3,
            aggregate_rollup: 4,
            basic_attack: 5,
            unmerged_ticks: 6,
        };
        assert_eq!(stats.removed(), 21);
    }
}
