//! Statistics catalog abstraction.
//!
//! The advisor never inspects storage itself: everything it knows about a
//! table arrives as an immutable snapshot of the storage engine's own
//! statistics catalog, re-read on every run:
//!
//! - Per-index, per-partition fragmentation and page counts
//! - Per-index read/write usage counters
//! - Index shape (key order, includes, filter predicate, alignment)
//! - Table-level profiles for partitioning-candidate ranking

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::Result;

mod snapshot;

pub use snapshot::{SnapshotStatSource, StatisticsSnapshot, TableSnapshot};

/// On-disk compression mode of a partition or index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// No compression
    #[default]
    None,
    /// Row compression
    Row,
    /// Page compression
    Page,
}

impl std::fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressionMode::None => write!(f, "NONE"),
            CompressionMode::Row => write!(f, "ROW"),
            CompressionMode::Page => write!(f, "PAGE"),
        }
    }
}

/// Physical statistics for one (index, partition) pair.
///
/// Read-only snapshot; classification never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionStat {
    /// Index the sample belongs to
    pub index_id: u32,
    /// Partition ordinal (1-based, ascending with the partition key)
    pub partition_number: u32,
    /// Logical fragmentation percentage, in [0, 100]
    pub fragmentation_pct: f64,
    /// Pages allocated to this partition of the index
    pub page_count: u64,
    /// Rows in this partition
    pub row_count: u64,
    /// Current compression mode
    #[serde(default)]
    pub compression: CompressionMode,
}

/// Read/write usage counters for one index.
///
/// Counters accumulate from an engine-controlled observation start; callers
/// supply the "observed since" timestamp when one is needed for reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexUsage {
    /// Seek operations
    pub seeks: u64,
    /// Scan operations
    pub scans: u64,
    /// Bookmark lookups
    pub lookups: u64,
    /// Write operations
    pub updates: u64,
    /// Last seek time, if any
    #[serde(default)]
    pub last_seek: Option<DateTime<Utc>>,
    /// Last scan time, if any
    #[serde(default)]
    pub last_scan: Option<DateTime<Utc>>,
}

impl IndexUsage {
    /// Total read operations over the observation window.
    pub fn total_reads(&self) -> u64 {
        self.seeks + self.scans + self.lookups
    }
}

/// Shape of one index, immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Engine index id; 0 denotes the heap (no index structure)
    pub index_id: u32,
    /// Index name, unique within its table
    pub name: String,
    /// Owning table
    pub table: String,
    /// Key columns in key order; order defines prefix relationships
    pub key_columns: Vec<String>,
    /// Included (non-key) columns
    #[serde(default)]
    pub included_columns: Vec<String>,
    /// Filter predicate for filtered indexes
    #[serde(default)]
    pub filter_predicate: Option<String>,
    /// Primary key or unique constraint backing index
    #[serde(default)]
    pub is_primary_or_unique: bool,
    /// Whether the index is stored on the table's partition scheme
    #[serde(default = "default_aligned")]
    pub is_aligned: bool,
}

impl IndexDescriptor {
    /// Whether this descriptor is the heap placeholder rather than an index.
    pub fn is_heap(&self) -> bool {
        self.index_id == 0
    }
}

fn default_aligned() -> bool {
    true
}

/// Table-level profile used for partitioning-candidate scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    /// Table name
    pub name: String,
    /// Row count
    pub row_count: u64,
    /// Total size across all indexes, in MB
    pub total_size_mb: u64,
    /// Number of indexes
    pub index_count: u32,
    /// Whether the table carries a date/time column usable as a partition key
    pub has_temporal_column: bool,
    /// Whether the table is already partitioned
    pub is_partitioned: bool,
}

/// Source of storage statistics.
///
/// Implementations wrap a live engine catalog or a captured snapshot. Calls
/// are synchronous request/response from the advisor's point of view: the
/// core issues no retries, and a failure for one table leaves runs for other
/// tables unaffected.
#[async_trait]
pub trait StatSource: Send + Sync {
    /// Fragmentation and page statistics for a table, optionally restricted
    /// to one index.
    async fn partition_stats(
        &self,
        table: &str,
        index_id: Option<u32>,
    ) -> Result<Vec<PartitionStat>>;

    /// Usage counters for a table, keyed by index id.
    async fn index_usage(&self, table: &str) -> Result<HashMap<u32, IndexUsage>>;

    /// All index descriptors for a table, heap placeholder included.
    async fn index_descriptors(&self, table: &str) -> Result<Vec<IndexDescriptor>>;

    /// Profiles of tables with at least `min_row_count` rows.
    async fn table_profiles(&self, min_row_count: u64) -> Result<Vec<TableProfile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_reads() {
        let usage = IndexUsage {
            seeks: 10,
            scans: 5,
            lookups: 2,
            updates: 100,
            ..Default::default()
        };
        assert_eq!(usage.total_reads(), 17);

        assert_eq!(IndexUsage::default().total_reads(), 0);
    }

    #[test]
    fn test_heap_detection() {
        let heap = IndexDescriptor {
            index_id: 0,
            name: "HEAP".into(),
            table: "dbo.Staging".into(),
            key_columns: vec![],
            included_columns: vec![],
            filter_predicate: None,
            is_primary_or_unique: false,
            is_aligned: true,
        };
        assert!(heap.is_heap());
    }

    #[test]
    fn test_compression_mode_display() {
        assert_eq!(CompressionMode::Page.to_string(), "PAGE");
        assert_eq!(CompressionMode::None.to_string(), "NONE");
    }

    #[test]
    fn test_descriptor_deserialization_defaults() {
        let json = r#"{
            "index_id": 2,
            "name": "IX_Transactions_Account",
            "table": "dbo.Transactions",
            "key_columns": ["AccountID"]
        }"#;
        let descriptor: IndexDescriptor = serde_json::from_str(json).unwrap();
        assert!(descriptor.is_aligned);
        assert!(!descriptor.is_primary_or_unique);
        assert!(descriptor.included_columns.is_empty());
        assert!(descriptor.filter_predicate.is_none());
    }
}
