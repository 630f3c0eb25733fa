//! Rolling filtered-index boundary refresh.
//!
//! A "recent window" filtered index covers only rows newer than a boundary
//! date baked into its predicate as a literal. Time moves, the literal does
//! not, so the index slowly covers more history than queries need. The
//! planner recomputes the boundary from the lookback and buffer windows and,
//! when the stored boundary differs, emits an idempotent drop+recreate pair.
//!
//! The boundary literal is always materialized at plan time from an explicit
//! `now`: the predicate never contains a non-constant expression, and the
//! clock is read once per run by the caller.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::IndexDescriptor;
use crate::config::RollingIndexConfig;
use crate::directive::{IndexDefinition, MaintenanceDirective};
use crate::error::PlanningError;
use crate::{Error, Result};

/// Whether the stored boundary still matches the recomputed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryState {
    /// Stored boundary matches; nothing to do
    Current,
    /// Boundary has drifted; the index needs a refresh
    Stale,
}

/// Outcome of planning one rolling index.
#[derive(Debug, Clone)]
pub struct BoundaryPlan {
    /// Index the plan refers to
    pub index: String,
    /// Whether a refresh is needed
    pub state: BoundaryState,
    /// The boundary the index should carry after this run
    pub boundary: NaiveDate,
    /// The predicate the index should carry after this run
    pub predicate: String,
    /// Refresh directives; empty when the boundary is current
    pub directives: Vec<MaintenanceDirective>,
}

/// Planner for one rolling filtered index.
pub struct FilteredIndexPlanner {
    config: RollingIndexConfig,
}

impl FilteredIndexPlanner {
    /// Create a planner for a rolling-index definition.
    pub fn new(config: RollingIndexConfig) -> Result<Self> {
        if config.filter_column.is_empty() {
            return Err(Error::Config(format!(
                "Rolling index '{}' requires a filter_column",
                config.name
            )));
        }

        if config.lookback_days == 0 {
            return Err(Error::Config(format!(
                "Rolling index '{}' requires a non-zero lookback window",
                config.name
            )));
        }

        Ok(Self { config })
    }

    /// The boundary the index should carry as of `now`, at day granularity.
    pub fn candidate_boundary(&self, now: DateTime<Utc>) -> NaiveDate {
        let window = u64::from(self.config.lookback_days) + u64::from(self.config.buffer_days);
        now.date_naive() - Days::new(window)
    }

    /// Render the filter predicate for a boundary date.
    pub fn predicate_for(&self, boundary: NaiveDate) -> String {
        format!(
            "{} >= '{}'",
            self.config.filter_column,
            boundary.format("%Y-%m-%d")
        )
    }

    /// Plan the refresh for this index.
    ///
    /// `existing` is the descriptor currently in the catalog, if the index
    /// exists. Planning is idempotent: once the refresh has been applied,
    /// planning again with the same `now` observes the new boundary and
    /// reports [`BoundaryState::Current`] with no directives.
    pub fn plan(
        &self,
        table: &str,
        existing: Option<&IndexDescriptor>,
        now: DateTime<Utc>,
    ) -> Result<BoundaryPlan> {
        if let Some(index) = existing {
            if !index.is_aligned {
                return Err(PlanningError::IndexNotAligned {
                    index: index.name.clone(),
                    table: table.to_string(),
                }
                .into());
            }

            if index.key_columns.is_empty() {
                return Err(PlanningError::EmptyKeyColumns {
                    index: index.name.clone(),
                }
                .into());
            }
        } else if self.config.key_columns.is_empty() {
            return Err(PlanningError::EmptyKeyColumns {
                index: self.config.name.clone(),
            }
            .into());
        }

        let boundary = self.candidate_boundary(now);
        let predicate = self.predicate_for(boundary);

        let stored = existing
            .and_then(|ix| ix.filter_predicate.as_deref())
            .and_then(boundary_from_predicate);

        if existing.is_some() && stored == Some(boundary) {
            debug!(
                index = %self.config.name,
                boundary = %boundary,
                "Rolling index boundary is current"
            );
            return Ok(BoundaryPlan {
                index: self.config.name.clone(),
                state: BoundaryState::Current,
                boundary,
                predicate,
                directives: Vec::new(),
            });
        }

        // Recreate with the layout already in the catalog; fall back to the
        // configured layout for first-time creation.
        let definition = match existing {
            Some(ix) => IndexDefinition {
                key_columns: ix.key_columns.clone(),
                included_columns: ix.included_columns.clone(),
            },
            None => IndexDefinition {
                key_columns: self.config.key_columns.clone(),
                included_columns: self.config.included_columns.clone(),
            },
        };

        let mut directives = Vec::with_capacity(2);
        if existing.is_some() {
            directives.push(MaintenanceDirective::drop_index(table, &self.config.name));
        }
        directives.push(MaintenanceDirective::create_index(
            table,
            &self.config.name,
            definition,
            &predicate,
        ));

        debug!(
            index = %self.config.name,
            stored = ?stored,
            boundary = %boundary,
            first_time = existing.is_none(),
            "Rolling index boundary is stale"
        );

        Ok(BoundaryPlan {
            index: self.config.name.clone(),
            state: BoundaryState::Stale,
            boundary,
            predicate,
            directives,
        })
    }
}

/// Extract the boundary date literal from a stored filter predicate.
///
/// Returns `None` when no parseable date literal is present, which the
/// planner treats as a stale boundary.
pub fn boundary_from_predicate(predicate: &str) -> Option<NaiveDate> {
    let start = predicate.find('\'')?;
    let rest = &predicate[start + 1..];
    let end = rest.find('\'')?;
    let literal = &rest[..end];

    // Accept plain dates and datetime literals truncated to their date part.
    NaiveDate::parse_from_str(literal, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            literal
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveKind;

    fn rolling_config() -> RollingIndexConfig {
        RollingIndexConfig {
            name: "IX_Transactions_Recent".into(),
            filter_column: "TransactionDate".into(),
            lookback_days: 90,
            buffer_days: 30,
            key_columns: vec!["AccountID".into(), "TransactionDate".into()],
            included_columns: vec!["Amount".into()],
        }
    }

    fn descriptor(predicate: Option<&str>, aligned: bool) -> IndexDescriptor {
        IndexDescriptor {
            index_id: 5,
            name: "IX_Transactions_Recent".into(),
            table: "dbo.Transactions".into(),
            key_columns: vec!["AccountID".into(), "TransactionDate".into()],
            included_columns: vec!["Amount".into()],
            filter_predicate: predicate.map(str::to_string),
            is_primary_or_unique: false,
            is_aligned: aligned,
        }
    }

    fn now() -> DateTime<Utc> {
        "2024-03-15T08:30:00Z".parse().unwrap()
    }

    #[test]
    fn test_candidate_boundary_day_granularity() {
        let planner = FilteredIndexPlanner::new(rolling_config()).unwrap();

        // 90 + 30 days before 2024-03-15, regardless of time of day
        let expected = NaiveDate::from_ymd_opt(2023, 11, 16).unwrap();
        assert_eq!(planner.candidate_boundary(now()), expected);
        assert_eq!(
            planner.candidate_boundary("2024-03-15T23:59:59Z".parse().unwrap()),
            expected
        );
    }

    #[test]
    fn test_drifted_boundary_yields_drop_and_create() {
        let planner = FilteredIndexPlanner::new(rolling_config()).unwrap();
        let existing = descriptor(Some("TransactionDate >= '2023-10-01'"), true);

        let plan = planner
            .plan("dbo.Transactions", Some(&existing), now())
            .unwrap();

        assert_eq!(plan.state, BoundaryState::Stale);
        assert_eq!(plan.directives.len(), 2);
        assert_eq!(plan.directives[0].kind, DirectiveKind::DropIndex);
        assert_eq!(plan.directives[1].kind, DirectiveKind::CreateIndex);
        assert_eq!(
            plan.directives[1].new_filter_predicate.as_deref(),
            Some("TransactionDate >= '2023-11-16'")
        );
        // Recreation keeps the catalog's layout
        assert_eq!(
            plan.directives[1].definition.as_ref().unwrap().key_columns,
            vec!["AccountID".to_string(), "TransactionDate".to_string()]
        );
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let planner = FilteredIndexPlanner::new(rolling_config()).unwrap();
        let existing = descriptor(Some("TransactionDate >= '2023-10-01'"), true);

        let first = planner
            .plan("dbo.Transactions", Some(&existing), now())
            .unwrap();
        assert_eq!(first.state, BoundaryState::Stale);

        // Apply the refresh: the catalog now stores the new predicate.
        let mut applied = existing.clone();
        applied.filter_predicate = Some(first.predicate.clone());

        let second = planner
            .plan("dbo.Transactions", Some(&applied), now())
            .unwrap();
        assert_eq!(second.state, BoundaryState::Current);
        assert!(second.directives.is_empty());
    }

    #[test]
    fn test_missing_index_creates_only() {
        let planner = FilteredIndexPlanner::new(rolling_config()).unwrap();

        let plan = planner.plan("dbo.Transactions", None, now()).unwrap();

        assert_eq!(plan.state, BoundaryState::Stale);
        assert_eq!(plan.directives.len(), 1);
        assert_eq!(plan.directives[0].kind, DirectiveKind::CreateIndex);
        // First-time creation uses the configured layout
        assert_eq!(
            plan.directives[0].definition.as_ref().unwrap().included_columns,
            vec!["Amount".to_string()]
        );
    }

    #[test]
    fn test_unparseable_predicate_is_stale() {
        let planner = FilteredIndexPlanner::new(rolling_config()).unwrap();
        let existing = descriptor(Some("IsActive = 1"), true);

        let plan = planner
            .plan("dbo.Transactions", Some(&existing), now())
            .unwrap();
        assert_eq!(plan.state, BoundaryState::Stale);
    }

    #[test]
    fn test_unaligned_index_is_rejected() {
        let planner = FilteredIndexPlanner::new(rolling_config()).unwrap();
        let existing = descriptor(Some("TransactionDate >= '2023-11-16'"), false);

        let err = planner
            .plan("dbo.Transactions", Some(&existing), now())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Planning(PlanningError::IndexNotAligned { .. })
        ));
    }

    #[test]
    fn test_empty_key_columns_rejected() {
        let mut bare = rolling_config();
        bare.key_columns.clear();
        let planner = FilteredIndexPlanner::new(bare).unwrap();

        let err = planner.plan("dbo.Transactions", None, now()).unwrap_err();
        assert!(matches!(
            err,
            Error::Planning(PlanningError::EmptyKeyColumns { .. })
        ));
    }

    #[test]
    fn test_zero_lookback_rejected() {
        let mut bad = rolling_config();
        bad.lookback_days = 0;
        assert!(FilteredIndexPlanner::new(bad).is_err());
    }

    #[test]
    fn test_boundary_from_predicate() {
        assert_eq!(
            boundary_from_predicate("TransactionDate >= '2023-11-16'"),
            NaiveDate::from_ymd_opt(2023, 11, 16)
        );
        assert_eq!(
            boundary_from_predicate("TransactionDate >= '2023-11-16T00:00:00'"),
            NaiveDate::from_ymd_opt(2023, 11, 16)
        );
        assert_eq!(boundary_from_predicate("IsActive = 1"), None);
        assert_eq!(boundary_from_predicate("TransactionDate >= 'soon'"), None);
    }
}
