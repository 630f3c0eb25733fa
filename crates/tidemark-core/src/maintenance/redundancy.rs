//! Redundant index detection.
//!
//! An index is dead weight when a wider index on the same table starts with
//! the same key columns in the same order and carries the same filter
//! predicate: every seek the narrow index can serve, the wide one can serve
//! too. Comparison is a full pairwise pass; per-table index counts are tens,
//! not thousands.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::report::{SkipReason, SkippedItem};
use crate::catalog::IndexDescriptor;
use crate::error::PlanningError;

/// A (narrower, wider) subsumption pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedundantPair {
    /// The index whose keys and filter are subsumed
    pub narrower: String,
    /// The index subsuming it
    pub wider: String,
}

/// Redundancy findings for one table.
#[derive(Debug, Clone, Default)]
pub struct RedundancyFindings {
    /// Subsumption pairs found
    pub pairs: Vec<RedundantPair>,
    /// Indexes excluded from comparison, with reasons
    pub skips: Vec<SkippedItem>,
}

/// Pairwise prefix-subsumption detector.
#[derive(Debug, Clone, Default)]
pub struct RedundancyDetector;

impl RedundancyDetector {
    /// Create a detector.
    pub fn new() -> Self {
        Self
    }

    /// Find subsumption pairs among one table's indexes.
    ///
    /// The primary or clustering index is never reported as the narrower
    /// side. Indexes whose predicate cannot be canonicalized are excluded
    /// from every pair rather than compared on a guess.
    pub fn detect(&self, indexes: &[IndexDescriptor]) -> RedundancyFindings {
        let mut findings = RedundancyFindings::default();

        // Canonicalize once per index; exclusions are recorded, not guessed.
        let mut comparable: Vec<(&IndexDescriptor, Option<String>)> = Vec::new();
        for index in indexes {
            if index.is_heap() {
                findings.skips.push(SkippedItem {
                    target: index.name.clone(),
                    reason: SkipReason::Heap,
                    detail: "heap structure has no keys to compare".into(),
                });
                continue;
            }

            if index.key_columns.is_empty() {
                findings.skips.push(SkippedItem {
                    target: index.name.clone(),
                    reason: SkipReason::EmptyKeyColumns,
                    detail: "index has no key columns".into(),
                });
                continue;
            }

            match index
                .filter_predicate
                .as_deref()
                .map(|p| canonicalize_predicate(&index.name, p))
                .transpose()
            {
                Ok(canonical) => comparable.push((index, canonical)),
                Err(err) => {
                    warn!(index = %index.name, error = %err, "Excluding index from redundancy comparison");
                    findings.skips.push(SkippedItem {
                        target: index.name.clone(),
                        reason: SkipReason::AmbiguousPredicate,
                        detail: err.to_string(),
                    });
                }
            }
        }

        for (narrow, narrow_filter) in &comparable {
            if narrow.is_primary_or_unique {
                continue;
            }

            for (wide, wide_filter) in &comparable {
                if narrow.index_id == wide.index_id {
                    continue;
                }

                if narrow_filter != wide_filter {
                    continue;
                }

                if !is_key_prefix(&narrow.key_columns, &wide.key_columns) {
                    continue;
                }

                // Equal key lists need a tie-break so a pair is reported once:
                // the narrower side is the one with the subset of includes,
                // name order deciding exact duplicates.
                if narrow.key_columns.len() == wide.key_columns.len() {
                    let subset = is_subset(&narrow.included_columns, &wide.included_columns);
                    let equal = subset
                        && narrow.included_columns.len() == wide.included_columns.len();
                    if !subset || (equal && narrow.name >= wide.name) {
                        continue;
                    }
                }

                debug!(
                    narrower = %narrow.name,
                    wider = %wide.name,
                    "Found subsumed index"
                );
                findings.pairs.push(RedundantPair {
                    narrower: narrow.name.clone(),
                    wider: wide.name.clone(),
                });
            }
        }

        findings
    }
}

/// Whether `narrow` is a leading prefix of `wide` (equal lists included).
fn is_key_prefix(narrow: &[String], wide: &[String]) -> bool {
    narrow.len() <= wide.len() && wide[..narrow.len()] == *narrow
}

/// Whether every column in `a` appears in `b`, ignoring order.
fn is_subset(a: &[String], b: &[String]) -> bool {
    a.iter().all(|col| b.contains(col))
}

/// Normalize a filter predicate for textual comparison.
///
/// Case is folded and whitespace collapsed outside quoted literals. A
/// predicate with unbalanced quotes or parentheses cannot be normalized and
/// is rejected as ambiguous.
pub(crate) fn canonicalize_predicate(
    index: &str,
    predicate: &str,
) -> std::result::Result<String, PlanningError> {
    let mut out = String::with_capacity(predicate.len());
    let mut in_literal = false;
    let mut depth: i32 = 0;
    let mut pending_space = false;

    for ch in predicate.chars() {
        if in_literal {
            out.push(ch);
            if ch == '\'' {
                in_literal = false;
            }
            continue;
        }

        match ch {
            '\'' => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(ch);
                in_literal = true;
            }
            '(' | ')' => {
                depth += if ch == '(' { 1 } else { -1 };
                if depth < 0 {
                    return Err(ambiguous(index, predicate));
                }
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(ch);
            }
            c if c.is_whitespace() => pending_space = true,
            c => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.extend(c.to_lowercase());
            }
        }
    }

    if in_literal || depth != 0 {
        return Err(ambiguous(index, predicate));
    }

    Ok(out)
}

fn ambiguous(index: &str, predicate: &str) -> PlanningError {
    PlanningError::AmbiguousPredicate {
        index: index.to_string(),
        predicate: predicate.to_string(),
    }
}
