//! Sweep command - terminate every watched process.

use anyhow::{bail, Result};
use orphan_reaper_core::SweepReport;

use super::build_reconciler;

pub async fn run(patterns: &[String], ports: &[u16], json: bool) -> Result<()> {
    let reconciler = build_reconciler(patterns, ports).await?;
    let report = reconciler.sweep().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }

    let failed: Vec<String> = report
        .failures()
        .map(|entry| format!("{} ({})", entry.handle.pid, entry.outcome.reason))
        .collect();
    if !failed.is_empty() {
        bail!("Could not terminate: {}", failed.join(", "));
    }
    Ok(())
}

fn print_table(report: &SweepReport) {
    if report.total == 0 {
        println!("No orphaned processes found.");
        return;
    }

    println!("{:<8} {:<20} {:<18} RESULT", "PID", "MATCHED", "REASON");
    println!("{}", "-".repeat(60));

    for entry in &report.entries {
        println!(
            "{:<8} {:<20} {:<18} {}",
            entry.handle.pid,
            truncate(&entry.handle.label, 20),
            entry.outcome.reason,
            if entry.outcome.success { "ok" } else { "FAILED" }
        );
    }

    println!("\nKilled: {}", report);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}
