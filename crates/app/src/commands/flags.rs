//! The `palace dismiss` and `palace flags` commands.

use anyhow::Result;

use crate::config::Config;

pub async fn dismiss(config: &Config, key: &str) -> Result<()> {
    let services = super::connect(config).await?;
    services.settings().dismiss(&config.context(), key).await?;
    println!("{key}: dismissed");
    Ok(())
}

pub async fn show(config: &Config, key: &str) -> Result<()> {
    let services = super::connect(config).await?;
    let dismissed = services
        .settings()
        .is_dismissed(&config.context(), key)
        .await?;
    println!("{key}: {}", if dismissed { "dismissed" } else { "active" });
    Ok(())
}
