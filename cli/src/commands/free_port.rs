//! Free-port command - terminate whatever listens on one port.

use anyhow::{bail, Result};

use super::build_reconciler;

pub async fn run(port: u16, json: bool) -> Result<()> {
    if port == 0 {
        bail!("Port must be non-zero");
    }

    let reconciler = build_reconciler(&[], &[]).await?;
    let freed = reconciler.free_port(port).await;

    if json {
        println!("{}", serde_json::json!({ "port": port, "freed": freed }));
    }

    if !freed {
        bail!("Port {} is still in use", port);
    }
    if !json {
        println!("Port {} is free.", port);
    }
    Ok(())
}
