//! Unused index detection.
//!
//! An index with zero reads and material write traffic is pure write
//! overhead: every insert and update pays to maintain it, and nothing ever
//! seeks it. Each finding carries the start of the observation window it was
//! measured over: usage that only occurs periodically (month-end reporting,
//! say) looks identical to no usage inside a single window, so callers must
//! cross-check findings against multiple windows before dropping anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::catalog::{IndexDescriptor, IndexUsage};
use crate::config::UsageConfig;

/// One write-only index, with its observation window boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedIndexFinding {
    /// Index name
    pub index: String,
    /// Engine index id
    pub index_id: u32,
    /// Writes paid over the window
    pub updates: u64,
    /// Start of the observation window this evidence covers
    pub observed_since: DateTime<Utc>,
}

/// Detector for indexes that are written but never read.
#[derive(Debug, Clone)]
pub struct UnusedIndexDetector {
    min_updates: u64,
}

impl UnusedIndexDetector {
    /// Create a detector flagging read-free indexes with at least
    /// `min_updates` writes.
    pub fn new(min_updates: u64) -> Self {
        Self { min_updates }
    }

    /// Build a detector from configuration.
    pub fn from_config(config: &UsageConfig) -> Self {
        Self::new(config.min_updates_to_flag)
    }

    /// Detect write-only indexes, ranked by descending write count.
    ///
    /// Primary and unique-constraint indexes are never flagged regardless of
    /// usage: they enforce correctness, not performance. An index absent
    /// from the usage map has never been touched at all and is not flagged
    /// either (zero writes falls below any sensible floor).
    pub fn detect(
        &self,
        indexes: &[IndexDescriptor],
        usage: &HashMap<u32, IndexUsage>,
        observed_since: DateTime<Utc>,
    ) -> Vec<UnusedIndexFinding> {
        let mut findings: Vec<UnusedIndexFinding> = indexes
            .iter()
            .filter(|ix| !ix.is_heap() && !ix.is_primary_or_unique)
            .filter_map(|ix| {
                let stats = usage.get(&ix.index_id).cloned().unwrap_or_default();
                if stats.total_reads() == 0 && stats.updates >= self.min_updates {
                    debug!(
                        index = %ix.name,
                        updates = stats.updates,
                        "Index has write traffic and no reads"
                    );
                    Some(UnusedIndexFinding {
                        index: ix.name.clone(),
                        index_id: ix.index_id,
                        updates: stats.updates,
                        observed_since,
                    })
                } else {
                    None
                }
            })
            .collect();

        findings.sort_by(|a, b| b.updates.cmp(&a.updates));
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(id: u32, name: &str, primary: bool) -> IndexDescriptor {
        IndexDescriptor {
            index_id: id,
            name: name.into(),
            table: "dbo.Transactions".into(),
            key_columns: vec!["AccountID".into()],
            included_columns: vec![],
            filter_predicate: None,
            is_primary_or_unique: primary,
            is_aligned: true,
        }
    }

    fn usage(seeks: u64, scans: u64, lookups: u64, updates: u64) -> IndexUsage {
        IndexUsage {
            seeks,
            scans,
            lookups,
            updates,
            ..Default::default()
        }
    }

    fn window() -> DateTime<Utc> {
        "2024-01-15T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_write_only_index_flagged() {
        let detector = UnusedIndexDetector::new(100);
        let indexes = vec![index(2, "IX_Status", false)];
        let usage = HashMap::from([(2, usage(0, 0, 0, 150))]);

        let findings = detector.detect(&indexes, &usage, window());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].index, "IX_Status");
        assert_eq!(findings[0].updates, 150);
        assert_eq!(findings[0].observed_since, window());
    }

    #[test]
    fn test_below_update_floor_not_flagged() {
        let detector = UnusedIndexDetector::new(100);
        let indexes = vec![index(2, "IX_Status", false)];
        let usage = HashMap::from([(2, usage(0, 0, 0, 50))]);

        assert!(detector.detect(&indexes, &usage, window()).is_empty());
    }

    #[test]
    fn test_any_read_disqualifies() {
        let detector = UnusedIndexDetector::new(100);
        let indexes = vec![index(2, "IX_Status", false)];

        for reads in [
            usage(1, 0, 0, 150),
            usage(0, 1, 0, 150),
            usage(0, 0, 1, 150),
        ] {
            let usage = HashMap::from([(2, reads)]);
            assert!(detector.detect(&indexes, &usage, window()).is_empty());
        }
    }

    #[test]
    fn test_primary_or_unique_never_flagged() {
        let detector = UnusedIndexDetector::new(100);
        let indexes = vec![index(1, "PK_Transactions", true)];
        let usage = HashMap::from([(1, usage(0, 0, 0, 1000))]);

        assert!(detector.detect(&indexes, &usage, window()).is_empty());
    }

    #[test]
    fn test_missing_usage_row_not_flagged() {
        let detector = UnusedIndexDetector::new(100);
        let indexes = vec![index(2, "IX_Never_Touched", false)];

        assert!(detector.detect(&indexes, &HashMap::new(), window()).is_empty());
    }

    #[test]
    fn test_ranked_by_descending_updates() {
        let detector = UnusedIndexDetector::new(100);
        let indexes = vec![
            index(2, "IX_Light", false),
            index(3, "IX_Heavy", false),
            index(4, "IX_Middle", false),
        ];
        let usage = HashMap::from([
            (2, usage(0, 0, 0, 120)),
            (3, usage(0, 0, 0, 9000)),
            (4, usage(0, 0, 0, 700)),
        ]);

        let findings = detector.detect(&indexes, &usage, window());
        let names: Vec<&str> = findings.iter().map(|f| f.index.as_str()).collect();
        assert_eq!(names, vec!["IX_Heavy", "IX_Middle", "IX_Light"]);
    }
}
