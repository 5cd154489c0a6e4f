//! List command - show what a sweep would terminate.

use anyhow::Result;

use super::build_reconciler;

pub async fn run(patterns: &[String], ports: &[u16], json: bool) -> Result<()> {
    let reconciler = build_reconciler(patterns, ports).await?;
    let handles: Vec<_> = reconciler.discover().await.into_iter().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&handles)?);
        return Ok(());
    }

    if handles.is_empty() {
        println!("No orphaned processes found.");
        return Ok(());
    }

    println!("{:<8} {:<6} MATCHED", "PID", "PORT");
    println!("{}", "-".repeat(40));

    for handle in &handles {
        let port = handle
            .port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<8} {:<6} {}", handle.pid, port, handle.label);
    }

    println!("\nTotal: {} processes", handles.len());
    Ok(())
}
