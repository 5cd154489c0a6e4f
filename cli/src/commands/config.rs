//! Config command - show the effective configuration.

use anyhow::Result;
use orphan_reaper_core::{ConfigStore, WatchList};

pub async fn show(json: bool) -> Result<()> {
    let store = ConfigStore::new()?;
    let config = store.load().await?;

    // Built-in defaults first, then whatever the config adds
    let watch = WatchList::with_defaults();
    config.apply(&watch);
    let effective = watch.snapshot();

    if json {
        let value = serde_json::json!({
            "path": store.path().display().to_string(),
            "config": config,
            "effective": effective,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Config file: {}", store.path().display());
    println!("Grace period: {} ms", config.grace_period_ms);
    println!("Forced grace period: {} ms", config.forced_grace_period_ms);
    println!("Watched patterns:");
    for pattern in &effective.patterns {
        println!("  {}", pattern);
    }
    println!("Watched ports:");
    for port in &effective.ports {
        println!("  {}", port);
    }
    Ok(())
}
