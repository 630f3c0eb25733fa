//! Candidates command implementation.

use anyhow::Result;
use std::path::Path;
use tidemark_core::catalog::{SnapshotStatSource, StatSource};
use tidemark_core::maintenance::CandidateScorer;
use tidemark_core::Config;
use tracing::info;

/// Rank tables as partitioning candidates.
pub async fn run(config: Config, stats: &Path, json: bool) -> Result<()> {
    config.validate()?;

    let source = SnapshotStatSource::from_file(stats)?;
    let profiles = source
        .table_profiles(config.candidates.min_row_count)
        .await?;

    info!(
        profiles = profiles.len(),
        min_row_count = config.candidates.min_row_count,
        "Scoring partitioning candidates"
    );

    let ranked = CandidateScorer::new().rank(profiles);

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!(
            "No tables with at least {} rows in the snapshot.",
            config.candidates.min_row_count
        );
        return Ok(());
    }

    println!(
        "{:<40} {:>12} {:>10} {:>8} {:>6}  {}",
        "Table", "Rows", "Size MB", "Indexes", "Score", "Recommendation"
    );
    for candidate in &ranked {
        println!(
            "{:<40} {:>12} {:>10} {:>8} {:>6}  {}",
            candidate.profile.name,
            candidate.profile.row_count,
            candidate.profile.total_size_mb,
            candidate.profile.index_count,
            candidate.score,
            candidate.recommendation
        );
    }

    Ok(())
}
