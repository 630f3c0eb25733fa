//! Partitioning-candidate scoring.
//!
//! Ranks tables by how much they would benefit from adopting sliding-window
//! partitioning. Signals are scored independently and summed: row count,
//! presence of a temporal column to partition on, total size, index count
//! (every index multiplies maintenance cost), and whether the table is
//! already partitioned.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::TableProfile;

// Row-count buckets
const ROWS_HUGE: u64 = 10_000_000;
const ROWS_LARGE: u64 = 1_000_000;
const ROWS_MEDIUM: u64 = 100_000;

// Size buckets in MB
const SIZE_HUGE_MB: u64 = 10_240;
const SIZE_LARGE_MB: u64 = 1_024;
const SIZE_MEDIUM_MB: u64 = 100;

// Index-count bucket
const MANY_INDEXES: u32 = 5;

/// How strongly a table is recommended for partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    /// Large, temporal, unpartitioned: adopt now
    Strong,
    /// Worth adopting
    Good,
    /// Possible future candidate
    Possible,
    /// Nothing to do
    AlreadyPartitioned,
    /// Too small or no temporal column
    NotRecommended,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Strong => write!(f, "strong"),
            Recommendation::Good => write!(f, "good"),
            Recommendation::Possible => write!(f, "possible"),
            Recommendation::AlreadyPartitioned => write!(f, "already-partitioned"),
            Recommendation::NotRecommended => write!(f, "not-recommended"),
        }
    }
}

/// A profile annotated with its score and recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The table's profile
    pub profile: TableProfile,
    /// Total score, 0-11
    pub score: u8,
    /// Recommendation tier
    pub recommendation: Recommendation,
}

/// Weighted scoring model over table profiles.
#[derive(Debug, Clone, Default)]
pub struct CandidateScorer;

impl CandidateScorer {
    /// Create a scorer.
    pub fn new() -> Self {
        Self
    }

    /// Score one profile (0-11).
    pub fn score(&self, profile: &TableProfile) -> u8 {
        let mut score = 0u8;

        score += match profile.row_count {
            n if n >= ROWS_HUGE => 3,
            n if n >= ROWS_LARGE => 2,
            n if n >= ROWS_MEDIUM => 1,
            _ => 0,
        };

        if profile.has_temporal_column {
            score += 2;
        }

        score += match profile.total_size_mb {
            n if n >= SIZE_HUGE_MB => 3,
            n if n >= SIZE_LARGE_MB => 2,
            n if n >= SIZE_MEDIUM_MB => 1,
            _ => 0,
        };

        if profile.index_count >= MANY_INDEXES {
            score += 2;
        }

        if !profile.is_partitioned {
            score += 1;
        }

        score
    }

    /// Recommendation tier for one profile.
    pub fn recommend(&self, profile: &TableProfile) -> Recommendation {
        if profile.is_partitioned {
            return Recommendation::AlreadyPartitioned;
        }

        if profile.has_temporal_column {
            if profile.row_count >= ROWS_HUGE {
                return Recommendation::Strong;
            }
            if profile.row_count >= ROWS_LARGE {
                return Recommendation::Good;
            }
            if profile.row_count >= ROWS_MEDIUM {
                return Recommendation::Possible;
            }
        }

        Recommendation::NotRecommended
    }

    /// Score and rank a set of profiles.
    ///
    /// Sorted by descending score; ties broken by descending row count.
    pub fn rank(&self, profiles: Vec<TableProfile>) -> Vec<ScoredCandidate> {
        let mut candidates: Vec<ScoredCandidate> = profiles
            .into_iter()
            .map(|profile| {
                let score = self.score(&profile);
                let recommendation = self.recommend(&profile);
                debug!(
                    table = %profile.name,
                    score,
                    recommendation = %recommendation,
                    "Scored partitioning candidate"
                );
                ScoredCandidate {
                    profile,
                    score,
                    recommendation,
                }
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.profile.row_count.cmp(&a.profile.row_count))
        });
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(
        name: &str,
        row_count: u64,
        total_size_mb: u64,
        index_count: u32,
        has_temporal_column: bool,
        is_partitioned: bool,
    ) -> TableProfile {
        TableProfile {
            name: name.into(),
            row_count,
            total_size_mb,
            index_count,
            has_temporal_column,
            is_partitioned,
        }
    }

    #[test]
    fn test_maximum_score() {
        let scorer = CandidateScorer::new();
        let p = profile("dbo.Transactions", 15_000_000, 20_000, 6, true, false);

        assert_eq!(scorer.score(&p), 11);
        assert_eq!(scorer.recommend(&p), Recommendation::Strong);
    }

    #[test]
    fn test_score_buckets() {
        let scorer = CandidateScorer::new();

        // Row buckets alone (small size, few indexes, partitioned)
        assert_eq!(scorer.score(&profile("t", 10_000_000, 0, 0, false, true)), 3);
        assert_eq!(scorer.score(&profile("t", 1_000_000, 0, 0, false, true)), 2);
        assert_eq!(scorer.score(&profile("t", 100_000, 0, 0, false, true)), 1);
        assert_eq!(scorer.score(&profile("t", 99_999, 0, 0, false, true)), 0);

        // Size buckets alone
        assert_eq!(scorer.score(&profile("t", 0, 10_240, 0, false, true)), 3);
        assert_eq!(scorer.score(&profile("t", 0, 1_024, 0, false, true)), 2);
        assert_eq!(scorer.score(&profile("t", 0, 100, 0, false, true)), 1);
        assert_eq!(scorer.score(&profile("t", 0, 99, 0, false, true)), 0);

        // Index count and partitioning status
        assert_eq!(scorer.score(&profile("t", 0, 0, 5, false, true)), 2);
        assert_eq!(scorer.score(&profile("t", 0, 0, 0, false, false)), 1);
    }

    #[test]
    fn test_recommendation_tiers() {
        let scorer = CandidateScorer::new();

        assert_eq!(
            scorer.recommend(&profile("t", 10_000_000, 0, 0, true, false)),
            Recommendation::Strong
        );
        assert_eq!(
            scorer.recommend(&profile("t", 1_000_000, 0, 0, true, false)),
            Recommendation::Good
        );
        assert_eq!(
            scorer.recommend(&profile("t", 100_000, 0, 0, true, false)),
            Recommendation::Possible
        );
        assert_eq!(
            scorer.recommend(&profile("t", 50_000_000, 0, 0, true, true)),
            Recommendation::AlreadyPartitioned
        );
        // No temporal column: nothing to partition on
        assert_eq!(
            scorer.recommend(&profile("t", 50_000_000, 0, 0, false, false)),
            Recommendation::NotRecommended
        );
        assert_eq!(
            scorer.recommend(&profile("t", 10_000, 0, 0, true, false)),
            Recommendation::NotRecommended
        );
    }

    #[test]
    fn test_rank_order() {
        let scorer = CandidateScorer::new();
        let ranked = scorer.rank(vec![
            profile("dbo.Small", 200_000, 150, 2, true, false),
            profile("dbo.Huge", 15_000_000, 20_000, 6, true, false),
            profile("dbo.Large", 2_000_000, 1_500, 5, true, false),
        ]);

        let names: Vec<&str> = ranked.iter().map(|c| c.profile.name.as_str()).collect();
        assert_eq!(names, vec!["dbo.Huge", "dbo.Large", "dbo.Small"]);
    }

    #[test]
    fn test_rank_ties_broken_by_row_count() {
        let scorer = CandidateScorer::new();
        // Identical scores, different row counts
        let ranked = scorer.rank(vec![
            profile("dbo.Fewer", 1_000_000, 1_024, 0, false, true),
            profile("dbo.More", 2_000_000, 1_024, 0, false, true),
        ]);

        assert_eq!(ranked[0].profile.name, "dbo.More");
        assert_eq!(ranked[0].score, ranked[1].score);
    }
}
