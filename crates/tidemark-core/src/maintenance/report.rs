//! Structured run reports.
//!
//! Every planning run yields a report alongside its directives: one line per
//! evaluated partition, one per rolling-index boundary check, and one per
//! skipped item with a reason code. Nothing is skipped silently.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::action::FragmentationAction;
use super::filtered::BoundaryState;
use super::temperature::StorageTier;

/// Reason code attached to a skipped item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Index storage is not aligned with the table's partition scheme
    NotAligned,
    /// Filter predicate could not be canonicalized
    AmbiguousPredicate,
    /// Structure is a heap, not an index
    Heap,
    /// Index has no key columns
    EmptyKeyColumns,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotAligned => write!(f, "not_aligned"),
            SkipReason::AmbiguousPredicate => write!(f, "ambiguous_predicate"),
            SkipReason::Heap => write!(f, "heap"),
            SkipReason::EmptyKeyColumns => write!(f, "empty_key_columns"),
        }
    }
}

/// An item excluded from planning, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedItem {
    /// What was skipped (index or structure name)
    pub target: String,
    /// Why
    pub reason: SkipReason,
    /// Free-form detail for the report sink
    pub detail: String,
}

/// Decision taken for one (index, partition) sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionDecision {
    /// Index name
    pub index: String,
    /// Partition ordinal
    pub partition_number: u32,
    /// Observed fragmentation
    pub fragmentation_pct: f64,
    /// Observed page count
    pub page_count: u64,
    /// Tier the partition falls in
    pub tier: StorageTier,
    /// Action advised
    pub action: FragmentationAction,
}

/// Outcome of one rolling-index boundary check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryDecision {
    /// Index name
    pub index: String,
    /// Whether the boundary needed a refresh
    pub state: BoundaryState,
    /// Boundary the index carries after the run
    pub boundary: NaiveDate,
}

/// Aggregate counts for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Partitions advised to reorganize
    pub reorganizes: usize,
    /// Partitions advised to rebuild
    pub rebuilds: usize,
    /// Rolling indexes needing a boundary refresh
    pub boundary_refreshes: usize,
    /// Pages the advised maintenance is expected to touch
    pub estimated_pages: u64,
}

/// Full report for one table's planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceReport {
    /// Table the run covered
    pub table: String,
    /// The run's single clock reading
    pub generated_at: DateTime<Utc>,
    /// Whether the caller intends to execute the directives
    pub dry_run: bool,
    /// Per-partition decisions inside the hot window
    pub decisions: Vec<PartitionDecision>,
    /// Rolling-index boundary outcomes
    pub boundaries: Vec<BoundaryDecision>,
    /// Skipped items with reason codes
    pub skips: Vec<SkippedItem>,
    /// Aggregate counts
    pub summary: PlanSummary,
}
