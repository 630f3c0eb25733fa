//! Offline statistics snapshots.
//!
//! Planning does not require a live engine connection: statistics exported
//! from the engine's catalog views can be captured as a JSON document and
//! replayed through [`SnapshotStatSource`]. The CLI plans exclusively from
//! snapshot files; tests use them as fixtures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::{IndexDescriptor, IndexUsage, PartitionStat, StatSource, TableProfile};
use crate::error::StatSourceError;
use crate::Result;

/// Captured statistics for one table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Table-level profile, when captured
    #[serde(default)]
    pub profile: Option<TableProfile>,
    /// Index descriptors, heap placeholder included
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
    /// Per-(index, partition) physical statistics
    #[serde(default)]
    pub partition_stats: Vec<PartitionStat>,
    /// Usage counters keyed by index id
    #[serde(default)]
    pub usage: HashMap<u32, IndexUsage>,
}

/// A full statistics capture across tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    /// When the capture was taken
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    /// When the engine started accumulating usage counters
    #[serde(default)]
    pub observed_since: Option<DateTime<Utc>>,
    /// Per-table captures, keyed by table name
    #[serde(default)]
    pub tables: BTreeMap<String, TableSnapshot>,
}

/// [`StatSource`] backed by a [`StatisticsSnapshot`].
#[derive(Debug)]
pub struct SnapshotStatSource {
    snapshot: StatisticsSnapshot,
}

impl SnapshotStatSource {
    /// Wrap an in-memory snapshot.
    pub fn new(snapshot: StatisticsSnapshot) -> Self {
        Self { snapshot }
    }

    /// Parse a snapshot from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: StatisticsSnapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    /// Load a snapshot from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// When the snapshot was captured.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.captured_at
    }

    /// Start of the usage observation window, when recorded.
    pub fn observed_since(&self) -> Option<DateTime<Utc>> {
        self.snapshot.observed_since
    }

    fn table(&self, name: &str) -> Result<&TableSnapshot> {
        self.snapshot.tables.get(name).ok_or_else(|| {
            StatSourceError::UnknownTable {
                table: name.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl StatSource for SnapshotStatSource {
    async fn partition_stats(
        &self,
        table: &str,
        index_id: Option<u32>,
    ) -> Result<Vec<PartitionStat>> {
        let table = self.table(table)?;
        Ok(table
            .partition_stats
            .iter()
            .filter(|s| index_id.map_or(true, |id| s.index_id == id))
            .cloned()
            .collect())
    }

    async fn index_usage(&self, table: &str) -> Result<HashMap<u32, IndexUsage>> {
        Ok(self.table(table)?.usage.clone())
    }

    async fn index_descriptors(&self, table: &str) -> Result<Vec<IndexDescriptor>> {
        Ok(self.table(table)?.indexes.clone())
    }

    async fn table_profiles(&self, min_row_count: u64) -> Result<Vec<TableProfile>> {
        Ok(self
            .snapshot
            .tables
            .values()
            .filter_map(|t| t.profile.clone())
            .filter(|p| p.row_count >= min_row_count)
            .collect())
    }
}
