//! Per-table maintenance planning.
//!
//! One run composes the policy components over a single statistics snapshot:
//!
//! 1. **Pull**: index descriptors and per-partition statistics, heaps skipped
//! 2. **Classify**: partitions tiered by ordinal; only the hot window is
//!    evaluated for fragmentation
//! 3. **Decide**: the action policy maps each hot sample to a directive;
//!    rebuilds pick up the tier's target compression when storage has drifted
//! 4. **Refresh**: rolling filtered indexes get drop+recreate pairs when
//!    their boundary literal has drifted
//! 5. **Finish**: one statistics-refresh directive closes the run
//!
//! Partition maintenance directives always precede index drop/create pairs
//! so boundary refreshes are evaluated against decisions made with the
//! pre-refresh index set. The planner mutates nothing; executing (or merely
//! logging) the directives belongs to the caller.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::action::{ActionPolicy, FragmentationAction};
use super::filtered::{BoundaryState, FilteredIndexPlanner};
use super::report::{
    BoundaryDecision, MaintenanceReport, PartitionDecision, PlanSummary, SkipReason, SkippedItem,
};
use super::temperature::{StorageTier, TemperatureClassifier};
use crate::catalog::StatSource;
use crate::config::{Config, RollingIndexConfig};
use crate::directive::MaintenanceDirective;
use crate::error::PlanningError;
use crate::{Error, Result};

/// Directives plus the report describing how they were decided.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Ordered maintenance directives
    pub directives: Vec<MaintenanceDirective>,
    /// Structured run report
    pub report: MaintenanceReport,
}

/// Orchestrator for one table's maintenance run.
pub struct MaintenancePlanner {
    policy: ActionPolicy,
    classifier: TemperatureClassifier,
    rolling: Vec<RollingIndexConfig>,
    dry_run: bool,
}

impl MaintenancePlanner {
    /// Create a planner from its policy components.
    pub fn new(policy: ActionPolicy, classifier: TemperatureClassifier) -> Self {
        Self {
            policy,
            classifier,
            rolling: Vec::new(),
            dry_run: true,
        }
    }

    /// Create a planner for one table from validated configuration.
    ///
    /// Configuration problems surface here, before any directive exists.
    pub fn from_config(config: &Config, table: &str) -> Result<Self> {
        config.validate()?;
        let policy = ActionPolicy::from_config(&config.policy)?;
        let classifier = TemperatureClassifier::new(config.policy.hot_partition_count);
        Ok(Self::new(policy, classifier)
            .with_rolling_indexes(config.rolling_indexes_for(table).to_vec()))
    }

    /// Set the rolling filtered indexes to keep bounded.
    pub fn with_rolling_indexes(mut self, rolling: Vec<RollingIndexConfig>) -> Self {
        self.rolling = rolling;
        self
    }

    /// Mark whether the caller intends to execute the directives.
    ///
    /// Planning is identical either way; the flag rides on the report for
    /// the executing collaborator.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Plan maintenance for `table` against a statistics snapshot.
    ///
    /// `now` is the run's single clock reading; boundary literals are
    /// materialized from it so the run is deterministic.
    pub async fn run(
        &self,
        source: &dyn StatSource,
        table: &str,
        now: DateTime<Utc>,
    ) -> Result<PlanOutcome> {
        debug!(table, "Starting maintenance planning run");

        let descriptors = source.index_descriptors(table).await?;

        let mut decisions: Vec<PartitionDecision> = Vec::new();
        let mut skips: Vec<SkippedItem> = Vec::new();
        let mut partition_directives: Vec<MaintenanceDirective> = Vec::new();

        // Pull statistics per real index; heaps have nothing to defragment.
        let mut indexed_stats = Vec::new();
        for descriptor in &descriptors {
            if descriptor.is_heap() {
                skips.push(SkippedItem {
                    target: descriptor.name.clone(),
                    reason: SkipReason::Heap,
                    detail: "heap structure, no index to maintain".into(),
                });
                continue;
            }

            let mut stats = source
                .partition_stats(table, Some(descriptor.index_id))
                .await?;
            stats.sort_by_key(|s| s.partition_number);
            indexed_stats.push((descriptor, stats));
        }

        let max_partition = indexed_stats
            .iter()
            .flat_map(|(_, stats)| stats.iter())
            .map(|s| s.partition_number)
            .max()
            .unwrap_or(0);

        for (descriptor, stats) in &indexed_stats {
            for stat in stats {
                let tier = self.classifier.classify(stat.partition_number, max_partition);
                if tier != StorageTier::Hot {
                    debug!(
                        index = %descriptor.name,
                        partition = stat.partition_number,
                        %tier,
                        "Partition outside the hot window"
                    );
                    continue;
                }

                let action = self.policy.evaluate(stat);
                decisions.push(PartitionDecision {
                    index: descriptor.name.clone(),
                    partition_number: stat.partition_number,
                    fragmentation_pct: stat.fragmentation_pct,
                    page_count: stat.page_count,
                    tier,
                    action,
                });

                match action {
                    FragmentationAction::NoAction => {}
                    FragmentationAction::Reorganize => {
                        partition_directives.push(MaintenanceDirective::reorganize(
                            table,
                            &descriptor.name,
                            stat.partition_number,
                            stat.page_count,
                        ));
                    }
                    FragmentationAction::Rebuild => {
                        // A rebuild rewrites the partition anyway; use the
                        // opportunity to converge on the tier's compression.
                        let compression = (!tier.accepts_compression(stat.compression))
                            .then(|| tier.target_compression());
                        partition_directives.push(MaintenanceDirective::rebuild(
                            table,
                            &descriptor.name,
                            stat.partition_number,
                            compression,
                            stat.page_count,
                        ));
                    }
                }
            }
        }

        // Rolling filtered-index refreshes, evaluated after fragmentation
        // decisions so their drop/create pairs trail partition maintenance.
        let mut boundaries: Vec<BoundaryDecision> = Vec::new();
        let mut refresh_directives: Vec<MaintenanceDirective> = Vec::new();

        for rolling in &self.rolling {
            let existing = descriptors.iter().find(|d| d.name == rolling.name);
            let planner = FilteredIndexPlanner::new(rolling.clone())?;

            match planner.plan(table, existing, now) {
                Ok(plan) => {
                    boundaries.push(BoundaryDecision {
                        index: plan.index.clone(),
                        state: plan.state,
                        boundary: plan.boundary,
                    });
                    refresh_directives.extend(plan.directives);
                }
                Err(Error::Planning(err @ PlanningError::IndexNotAligned { .. })) => {
                    warn!(index = %rolling.name, error = %err, "Skipping boundary refresh");
                    skips.push(SkippedItem {
                        target: rolling.name.clone(),
                        reason: SkipReason::NotAligned,
                        detail: err.to_string(),
                    });
                }
                Err(Error::Planning(err @ PlanningError::EmptyKeyColumns { .. })) => {
                    warn!(index = %rolling.name, error = %err, "Skipping boundary refresh");
                    skips.push(SkippedItem {
                        target: rolling.name.clone(),
                        reason: SkipReason::EmptyKeyColumns,
                        detail: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let mut directives = partition_directives;
        directives.extend(refresh_directives);
        directives.push(MaintenanceDirective::update_statistics(table));

        let summary = PlanSummary {
            reorganizes: decisions
                .iter()
                .filter(|d| d.action == FragmentationAction::Reorganize)
                .count(),
            rebuilds: decisions
                .iter()
                .filter(|d| d.action == FragmentationAction::Rebuild)
                .count(),
            boundary_refreshes: boundaries
                .iter()
                .filter(|b| b.state == BoundaryState::Stale)
                .count(),
            estimated_pages: directives.iter().filter_map(|d| d.estimated_pages).sum(),
        };

        info!(
            table,
            directives = directives.len(),
            reorganizes = summary.reorganizes,
            rebuilds = summary.rebuilds,
            boundary_refreshes = summary.boundary_refreshes,
            skips = skips.len(),
            "Maintenance planning completed"
        );

        Ok(PlanOutcome {
            directives,
            report: MaintenanceReport {
                table: table.to_string(),
                generated_at: now,
                dry_run: self.dry_run,
                decisions,
                boundaries,
                skips,
                summary,
            },
        })
    }
}
