use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use palace_core::model::UserId;
use services::SessionContext;

pub const DEFAULT_DB_URL: &str = "sqlite://palace.sqlite3";

const MEMORY_URL: &str = "sqlite::memory:";

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub user: Option<UserId>,
}

impl Config {
    /// # Errors
    ///
    /// Returns an error for a blank database URL.
    pub fn new(raw_db: &str, user: Option<UserId>) -> Result<Self> {
        if raw_db.trim().is_empty() {
            bail!("invalid --db value: {raw_db:?}");
        }
        Ok(Self {
            db_url: normalize_sqlite_url(raw_db),
            user,
        })
    }

    pub fn context(&self) -> SessionContext {
        self.user
            .map_or_else(SessionContext::anonymous, SessionContext::signed_in)
    }
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == MEMORY_URL {
        return trimmed.to_owned();
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

/// Create the database file (and its directory) so the pool can open it.
///
/// # Errors
///
/// Returns an error for a malformed URL or filesystem failures.
pub fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == MEMORY_URL {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}
