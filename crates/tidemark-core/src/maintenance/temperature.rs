//! Partition temperature classification.
//!
//! Partitions are tiered by ordinal position, not by date: the storage
//! engine already maps dates to partition numbers, so the classifier only
//! needs the count of trailing partitions the caller designates as hot.
//! Each tier carries a target compression mode.

use serde::{Deserialize, Serialize};

use crate::catalog::CompressionMode;

/// Storage tier of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    /// Actively read and written
    Hot,
    /// Still queried, no longer written
    Warm,
    /// Rarely read, never written
    Cold,
    /// Retained for compliance only
    Archive,
}

impl StorageTier {
    /// Compression mode the tier should converge to.
    pub fn target_compression(&self) -> CompressionMode {
        match self {
            StorageTier::Hot | StorageTier::Warm => CompressionMode::Row,
            StorageTier::Cold | StorageTier::Archive => CompressionMode::Page,
        }
    }

    /// Whether a stored compression mode already satisfies the tier.
    ///
    /// Hot data tolerates uncompressed storage; cold data must be
    /// page-compressed.
    pub fn accepts_compression(&self, mode: CompressionMode) -> bool {
        match self {
            StorageTier::Hot | StorageTier::Warm => {
                matches!(mode, CompressionMode::None | CompressionMode::Row)
            }
            StorageTier::Cold | StorageTier::Archive => mode == CompressionMode::Page,
        }
    }
}

impl std::fmt::Display for StorageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageTier::Hot => write!(f, "hot"),
            StorageTier::Warm => write!(f, "warm"),
            StorageTier::Cold => write!(f, "cold"),
            StorageTier::Archive => write!(f, "archive"),
        }
    }
}

/// Count-based tier lookup over partition ordinals.
#[derive(Debug, Clone)]
pub struct TemperatureClassifier {
    hot_count: u32,
}

impl TemperatureClassifier {
    /// Create a classifier treating the trailing `hot_count` partitions as hot.
    pub fn new(hot_count: u32) -> Self {
        Self { hot_count }
    }

    /// Classify a partition by ordinal position.
    ///
    /// A partition is hot iff `partition_number > max_partition_number - hot_count`.
    pub fn classify(&self, partition_number: u32, max_partition_number: u32) -> StorageTier {
        if u64::from(partition_number) + u64::from(self.hot_count) > u64::from(max_partition_number)
        {
            StorageTier::Hot
        } else {
            StorageTier::Cold
        }
    }

    /// Whether a partition falls inside the hot window.
    pub fn is_hot(&self, partition_number: u32, max_partition_number: u32) -> bool {
        self.classify(partition_number, max_partition_number) == StorageTier::Hot
    }
}
