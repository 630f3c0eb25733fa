//! Plan command implementation.

use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use tidemark_core::catalog::SnapshotStatSource;
use tidemark_core::maintenance::MaintenancePlanner;
use tidemark_core::Config;
use tracing::info;

use crate::render;

/// Plan maintenance for one table from a statistics snapshot.
pub async fn run(
    config: Config,
    table: &str,
    stats: &Path,
    script: bool,
    json: bool,
) -> Result<()> {
    let source = SnapshotStatSource::from_file(stats)?;

    // The run's single clock reading: the snapshot capture time when present,
    // so planning an old capture reproduces the boundaries it saw.
    let now = source.captured_at().unwrap_or_else(Utc::now);

    info!(
        table,
        stats = %stats.display(),
        now = %now,
        "Planning maintenance"
    );

    let planner = MaintenancePlanner::from_config(&config, table)?;
    let outcome = planner.run(&source, table, now).await?;

    if json {
        let payload = serde_json::json!({
            "report": outcome.report,
            "directives": outcome.directives,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_report(&outcome);
    }

    if script {
        println!();
        println!("{}", render::render_script(&outcome.directives));
    }

    Ok(())
}

fn print_report(outcome: &tidemark_core::maintenance::PlanOutcome) {
    let report = &outcome.report;

    println!(
        "Maintenance plan for {} (as of {})",
        report.table,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if report.decisions.is_empty() {
        println!("No partitions inside the hot window.");
    } else {
        println!("Hot-window decisions:");
        for decision in &report.decisions {
            println!(
                "  {} partition {:>3}: {:>5.1}% fragmented, {:>8} pages -> {}",
                decision.index,
                decision.partition_number,
                decision.fragmentation_pct,
                decision.page_count,
                decision.action
            );
        }
    }

    if !report.boundaries.is_empty() {
        println!();
        println!("Rolling index boundaries:");
        for boundary in &report.boundaries {
            println!(
                "  {}: {:?} (boundary {})",
                boundary.index, boundary.state, boundary.boundary
            );
        }
    }

    if !report.skips.is_empty() {
        println!();
        println!("Skipped:");
        for skip in &report.skips {
            println!("  {} ({}): {}", skip.target, skip.reason, skip.detail);
        }
    }

    println!();
    println!(
        "Summary: {} rebuild(s), {} reorganize(s), {} boundary refresh(es), ~{} pages",
        report.summary.rebuilds,
        report.summary.reorganizes,
        report.summary.boundary_refreshes,
        report.summary.estimated_pages
    );
    println!("Directives: {}", outcome.directives.len());
}
