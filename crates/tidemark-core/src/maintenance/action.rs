//! Fragmentation-to-action policy.
//!
//! Maps one partition's measured fragmentation to the maintenance action it
//! needs. Partitions below a page-count floor are never acted on: the cost
//! of touching them exceeds any scan benefit at that size.

use serde::{Deserialize, Serialize};

use crate::catalog::PartitionStat;
use crate::config::PolicyConfig;
use crate::{Error, Result};

/// Action advised for one (index, partition) fragmentation sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentationAction {
    /// Leave the partition alone
    NoAction,
    /// Reorganize in place
    Reorganize,
    /// Full rebuild
    Rebuild,
}

impl FragmentationAction {
    /// Whether the action produces a directive.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, FragmentationAction::NoAction)
    }
}

impl std::fmt::Display for FragmentationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FragmentationAction::NoAction => write!(f, "no_action"),
            FragmentationAction::Reorganize => write!(f, "reorganize"),
            FragmentationAction::Rebuild => write!(f, "rebuild"),
        }
    }
}

/// Threshold policy mapping fragmentation samples to actions.
#[derive(Debug, Clone)]
pub struct ActionPolicy {
    reorg_threshold: f64,
    rebuild_threshold: f64,
    min_page_count: u64,
}

impl ActionPolicy {
    /// Create a policy after validating threshold ordering.
    ///
    /// Thresholds must satisfy `0 <= reorg < rebuild <= 100`.
    pub fn new(reorg_threshold: f64, rebuild_threshold: f64, min_page_count: u64) -> Result<Self> {
        if !(0.0..=100.0).contains(&reorg_threshold) || !(0.0..=100.0).contains(&rebuild_threshold)
        {
            return Err(Error::Config(
                "Fragmentation thresholds must be within [0, 100]".into(),
            ));
        }

        if reorg_threshold >= rebuild_threshold {
            return Err(Error::Config(format!(
                "reorg_threshold ({}) must be below rebuild_threshold ({})",
                reorg_threshold, rebuild_threshold
            )));
        }

        Ok(Self {
            reorg_threshold,
            rebuild_threshold,
            min_page_count,
        })
    }

    /// Build a policy from configuration.
    pub fn from_config(config: &PolicyConfig) -> Result<Self> {
        Self::new(
            config.reorg_threshold,
            config.rebuild_threshold,
            config.min_page_count,
        )
    }

    /// Evaluate one fragmentation sample.
    ///
    /// Ties at a threshold take the more aggressive action.
    pub fn evaluate(&self, stat: &PartitionStat) -> FragmentationAction {
        if stat.page_count < self.min_page_count {
            return FragmentationAction::NoAction;
        }

        if stat.fragmentation_pct >= self.rebuild_threshold {
            FragmentationAction::Rebuild
        } else if stat.fragmentation_pct >= self.reorg_threshold {
            FragmentationAction::Reorganize
        } else {
            FragmentationAction::NoAction
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CompressionMode;

    fn stat(fragmentation_pct: f64, page_count: u64) -> PartitionStat {
        PartitionStat {
            index_id: 1,
            partition_number: 1,
            fragmentation_pct,
            page_count,
            row_count: page_count * 50,
            compression: CompressionMode::None,
        }
    }

    #[test]
    fn test_threshold_mapping() {
        let policy = ActionPolicy::new(10.0, 30.0, 1000).unwrap();

        assert_eq!(policy.evaluate(&stat(5.0, 5000)), FragmentationAction::NoAction);
        assert_eq!(
            policy.evaluate(&stat(15.0, 5000)),
            FragmentationAction::Reorganize
        );
        assert_eq!(policy.evaluate(&stat(45.0, 5000)), FragmentationAction::Rebuild);
    }

    #[test]
    fn test_exact_threshold_takes_aggressive_action() {
        let policy = ActionPolicy::new(10.0, 30.0, 1000).unwrap();

        assert_eq!(policy.evaluate(&stat(30.0, 5000)), FragmentationAction::Rebuild);
        assert_eq!(
            policy.evaluate(&stat(10.0, 5000)),
            FragmentationAction::Reorganize
        );
    }

    #[test]
    fn test_page_floor_suppresses_everything() {
        let policy = ActionPolicy::new(10.0, 30.0, 1000).unwrap();

        assert_eq!(policy.evaluate(&stat(99.9, 999)), FragmentationAction::NoAction);
        assert_eq!(policy.evaluate(&stat(99.9, 0)), FragmentationAction::NoAction);
        assert_eq!(policy.evaluate(&stat(99.9, 1000)), FragmentationAction::Rebuild);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(ActionPolicy::new(30.0, 10.0, 1000).is_err());
        assert!(ActionPolicy::new(30.0, 30.0, 1000).is_err());
        assert!(ActionPolicy::new(-1.0, 30.0, 1000).is_err());
        assert!(ActionPolicy::new(10.0, 130.0, 1000).is_err());
    }

    #[test]
    fn test_from_config_defaults() {
        let policy = ActionPolicy::from_config(&PolicyConfig::default()).unwrap();
        assert_eq!(policy.evaluate(&stat(30.0, 5000)), FragmentationAction::Rebuild);
        assert_eq!(
            policy.evaluate(&stat(10.0, 5000)),
            FragmentationAction::Reorganize
        );
    }
}
