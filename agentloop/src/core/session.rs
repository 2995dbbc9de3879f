//! Session aggregates and the per-cycle metrics record.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::prompt::Category;

/// One line of the metrics log; immutable once written.
///
/// Keys are camelCase on the wire so existing log consumers keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    /// 1-based cycle index, monotonic across the session.
    pub cycle: u64,
    /// RFC 3339 UTC timestamp of the measurement.
    pub timestamp: String,
    pub prompt: String,
    pub category: Category,
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
}

/// Running totals for one orchestrator run.
///
/// Owned by the loop thread and mutated only when a cycle produced a record;
/// no-op and failed cycles leave it untouched.
#[derive(Debug)]
pub struct Session {
    started: Instant,
    pub cycles: u64,
    pub total_insertions: u64,
    pub total_deletions: u64,
    pub total_files_changed: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            cycles: 0,
            total_insertions: 0,
            total_deletions: 0,
            total_files_changed: 0,
        }
    }

    /// Fold one recorded cycle into the totals.
    pub fn record(&mut self, record: &CycleRecord) {
        self.cycles += 1;
        self.total_insertions += record.insertions;
        self.total_deletions += record.deletions;
        self.total_files_changed += record.files_changed;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cycle: u64, files: u64, insertions: u64, deletions: u64) -> CycleRecord {
        CycleRecord {
            cycle,
            timestamp: "2026-08-07T12:00:00.000Z".to_string(),
            prompt: format!("cycle {cycle} prompt"),
            category: Category::Additive,
            files_changed: files,
            insertions,
            deletions,
        }
    }

    #[test]
    fn totals_are_the_sum_of_recorded_cycles() {
        let mut session = Session::new();
        session.record(&record(1, 2, 10, 1));
        session.record(&record(2, 1, 5, 0));
        session.record(&record(3, 4, 20, 7));

        assert_eq!(session.cycles, 3);
        assert_eq!(session.total_files_changed, 7);
        assert_eq!(session.total_insertions, 35);
        assert_eq!(session.total_deletions, 8);
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&record(1, 3, 10, 2)).expect("serialize");
        assert!(json.contains("\"filesChanged\":3"));
        assert!(json.contains("\"category\":\"additive\""));
        assert!(json.contains("\"prompt\""));
    }

    #[test]
    fn record_round_trips_through_json() {
        let original = record(9, 1, 2, 3);
        let json = serde_json::to_string(&original).expect("serialize");
        let parsed: CycleRecord = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, original);
    }
}
