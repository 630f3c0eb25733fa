//! Configuration structures for tidemark.
//!
//! Configuration is loaded from TOML files and can be overridden via CLI flags.

use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Fragmentation policy configuration
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Unused-index detection configuration
    #[serde(default)]
    pub usage: UsageConfig,

    /// Partitioning-candidate scan configuration
    #[serde(default)]
    pub candidates: CandidateConfig,

    /// Monitoring configuration
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    /// Per-table configuration
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

/// Fragmentation-to-action policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Fragmentation percentage at which reorganize is advised
    #[serde(default = "default_reorg_threshold")]
    pub reorg_threshold: f64,

    /// Fragmentation percentage at which rebuild is advised
    #[serde(default = "default_rebuild_threshold")]
    pub rebuild_threshold: f64,

    /// Partitions with fewer pages than this are never acted on
    #[serde(default = "default_min_page_count")]
    pub min_page_count: u64,

    /// Number of trailing partitions treated as hot
    #[serde(default = "default_hot_partition_count")]
    pub hot_partition_count: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            reorg_threshold: default_reorg_threshold(),
            rebuild_threshold: default_rebuild_threshold(),
            min_page_count: default_min_page_count(),
            hot_partition_count: default_hot_partition_count(),
        }
    }
}

/// Unused-index detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UsageConfig {
    /// Minimum write count before a read-free index is flagged
    #[serde(default = "default_min_updates_to_flag")]
    pub min_updates_to_flag: u64,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            min_updates_to_flag: default_min_updates_to_flag(),
        }
    }
}

/// Partitioning-candidate scan configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CandidateConfig {
    /// Tables below this row count are not profiled
    #[serde(default = "default_min_row_count")]
    pub min_row_count: u64,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            min_row_count: default_min_row_count(),
        }
    }
}

/// Per-table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Rolling filtered indexes maintained on this table
    #[serde(default)]
    pub rolling_indexes: Vec<RollingIndexConfig>,
}

/// Definition of a rolling "recent window" filtered index.
///
/// The index covers only rows newer than a boundary literal baked into its
/// filter predicate; the boundary is recomputed from `lookback_days` plus
/// `buffer_days` on every planning run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RollingIndexConfig {
    /// Index name
    pub name: String,

    /// Date column the filter predicate bounds
    pub filter_column: String,

    /// Days of recent data the index must cover
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Extra days kept beyond the lookback so the boundary can be refreshed
    /// on a slower cadence than queries move
    #[serde(default = "default_buffer_days")]
    pub buffer_days: u32,

    /// Key columns, used when the index must be created from scratch
    #[serde(default)]
    pub key_columns: Vec<String>,

    /// Included columns, used when the index must be created from scratch
    #[serde(default)]
    pub included_columns: Vec<String>,
}

/// Monitoring configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MonitoringConfig {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log format
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

/// Log format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// Plain text format
    Text,
}

impl Config {
    /// Validate the configuration.
    ///
    /// Runs before any planning; a failure here means no directives are
    /// generated at all.
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=100.0).contains(&self.policy.reorg_threshold) {
            return Err(crate::Error::Config(
                "reorg_threshold must be within [0, 100]".into(),
            ));
        }

        if !(0.0..=100.0).contains(&self.policy.rebuild_threshold) {
            return Err(crate::Error::Config(
                "rebuild_threshold must be within [0, 100]".into(),
            ));
        }

        if self.policy.reorg_threshold >= self.policy.rebuild_threshold {
            return Err(crate::Error::Config(format!(
                "reorg_threshold ({}) must be below rebuild_threshold ({})",
                self.policy.reorg_threshold, self.policy.rebuild_threshold
            )));
        }

        if self.policy.hot_partition_count == 0 {
            return Err(crate::Error::Config(
                "hot_partition_count must be at least 1".into(),
            ));
        }

        for table in &self.tables {
            if table.name.is_empty() {
                return Err(crate::Error::Config("Table name is required".into()));
            }

            for index in &table.rolling_indexes {
                if index.filter_column.is_empty() {
                    return Err(crate::Error::Config(format!(
                        "Rolling index '{}' requires a filter_column",
                        index.name
                    )));
                }

                if index.lookback_days == 0 {
                    return Err(crate::Error::Config(format!(
                        "Rolling index '{}' requires a non-zero lookback window",
                        index.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Rolling-index definitions configured for a table, if any.
    pub fn rolling_indexes_for(&self, table: &str) -> &[RollingIndexConfig] {
        self.tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.rolling_indexes.as_slice())
            .unwrap_or(&[])
    }
}

// Default value functions
fn default_reorg_threshold() -> f64 {
    10.0
}
fn default_rebuild_threshold() -> f64 {
    30.0
}
fn default_min_page_count() -> u64 {
    1000
}
fn default_hot_partition_count() -> u32 {
    3
}
fn default_min_updates_to_flag() -> u64 {
    100
}
fn default_min_row_count() -> u64 {
    100_000
}
fn default_lookback_days() -> u32 {
    90
}
fn default_buffer_days() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.policy.reorg_threshold, 10.0);
        assert_eq!(config.policy.rebuild_threshold, 30.0);
        assert_eq!(config.policy.min_page_count, 1000);
        assert_eq!(config.policy.hot_partition_count, 3);
        assert_eq!(config.usage.min_updates_to_flag, 100);
        assert_eq!(config.candidates.min_row_count, 100_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [policy]
            reorg_threshold = 5.0
            rebuild_threshold = 25.0
            hot_partition_count = 6

            [[tables]]
            name = "dbo.Transactions"

            [[tables.rolling_indexes]]
            name = "IX_Transactions_Recent"
            filter_column = "TransactionDate"
            lookback_days = 90
            key_columns = ["AccountID", "TransactionDate"]
            included_columns = ["Amount"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.policy.reorg_threshold, 5.0);
        assert_eq!(config.policy.hot_partition_count, 6);

        let rolling = config.rolling_indexes_for("dbo.Transactions");
        assert_eq!(rolling.len(), 1);
        assert_eq!(rolling[0].buffer_days, 30);
        assert_eq!(rolling[0].key_columns.len(), 2);

        assert!(config.rolling_indexes_for("dbo.Other").is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_threshold_order() {
        let mut config = Config::default();
        config.policy.reorg_threshold = 30.0;
        config.policy.rebuild_threshold = 10.0;
        assert!(config.validate().is_err());

        // Equal thresholds are also rejected
        config.policy.rebuild_threshold = 30.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut config = Config::default();
        config.policy.rebuild_threshold = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_hot_partition_count() {
        let mut config = Config::default();
        config.policy.hot_partition_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rolling_index() {
        let mut config = Config::default();
        config.tables.push(TableConfig {
            name: "dbo.Transactions".into(),
            rolling_indexes: vec![RollingIndexConfig {
                name: "IX_Transactions_Recent".into(),
                filter_column: String::new(),
                lookback_days: 90,
                buffer_days: 30,
                key_columns: vec!["TransactionDate".into()],
                included_columns: vec![],
            }],
        });
        assert!(config.validate().is_err());

        config.tables[0].rolling_indexes[0].filter_column = "TransactionDate".into();
        assert!(config.validate().is_ok());

        config.tables[0].rolling_indexes[0].lookback_days = 0;
        assert!(config.validate().is_err());
    }
}
