//! Watch command - persist extra patterns and ports.

use anyhow::Result;
use orphan_reaper_core::ConfigStore;

pub async fn add_pattern(pattern: &str) -> Result<()> {
    let store = ConfigStore::new()?;
    if store.add_pattern(pattern).await? {
        println!("Watching pattern {:?}", pattern);
    } else {
        println!("Pattern {:?} is already watched", pattern);
    }
    Ok(())
}

pub async fn add_port(port: u16) -> Result<()> {
    let store = ConfigStore::new()?;
    if store.add_port(port).await? {
        println!("Watching port {}", port);
    } else {
        println!("Port {} is already watched", port);
    }
    Ok(())
}
