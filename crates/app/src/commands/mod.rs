pub mod arcade;
pub mod flags;
pub mod gate;

use anyhow::{Context, Result};
use services::{AppServices, Clock, Notice};
use tracing::info;

use crate::config::{Config, prepare_sqlite_file};

async fn connect(config: &Config) -> Result<AppServices> {
    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(&config.db_url, Clock::default())
        .await
        .with_context(|| format!("opening {}", config.db_url))?;
    info!(db = %config.db_url, user = ?config.user, "database ready");
    Ok(services)
}

fn print_notice(notice: &Notice) {
    println!("[{:?}] {}: {}", notice.level, notice.title, notice.message);
}
