//! Audit command implementation.

use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use tidemark_core::catalog::{SnapshotStatSource, StatSource};
use tidemark_core::maintenance::{RedundancyDetector, UnusedIndexDetector};
use tidemark_core::Config;
use tracing::info;

/// Audit one table for redundant and write-only indexes.
pub async fn run(config: Config, table: &str, stats: &Path, json: bool) -> Result<()> {
    config.validate()?;

    let source = SnapshotStatSource::from_file(stats)?;
    let indexes = source.index_descriptors(table).await?;
    let usage = source.index_usage(table).await?;

    // Usage counters only carry evidence back to the window start; the
    // snapshot records it when known.
    let observed_since = source
        .observed_since()
        .or_else(|| source.captured_at())
        .unwrap_or_else(Utc::now);

    info!(
        table,
        indexes = indexes.len(),
        observed_since = %observed_since,
        "Auditing indexes"
    );

    let redundancy = RedundancyDetector::new().detect(&indexes);
    let unused =
        UnusedIndexDetector::from_config(&config.usage).detect(&indexes, &usage, observed_since);

    if json {
        let payload = serde_json::json!({
            "redundant_pairs": redundancy.pairs,
            "skips": redundancy.skips,
            "unused_indexes": unused,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Index audit for {}", table);
    println!();

    if redundancy.pairs.is_empty() {
        println!("No subsumed indexes.");
    } else {
        println!("Subsumed indexes:");
        for pair in &redundancy.pairs {
            println!("  {} is covered by {}", pair.narrower, pair.wider);
        }
    }

    if !redundancy.skips.is_empty() {
        println!();
        println!("Excluded from comparison:");
        for skip in &redundancy.skips {
            println!("  {} ({}): {}", skip.target, skip.reason, skip.detail);
        }
    }

    println!();
    if unused.is_empty() {
        println!("No write-only indexes.");
    } else {
        println!(
            "Write-only indexes (observed since {}):",
            observed_since.format("%Y-%m-%d")
        );
        for finding in &unused {
            println!("  {} - {} writes, zero reads", finding.index, finding.updates);
        }
        println!();
        println!(
            "Cross-check against other observation windows before dropping: \
             periodic workloads read nothing between runs."
        );
    }

    Ok(())
}
