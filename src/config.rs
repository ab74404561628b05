//! Runtime configuration, read from `FEATUREVOTE_*` environment variables.
//! Command-line flags override whatever is loaded here.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{bail, Context};
use tracing::{info, warn};

use crate::db::Database;
use crate::models::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const HOST_VAR: &str = "FEATUREVOTE_HOST";
pub const PORT_VAR: &str = "FEATUREVOTE_PORT";
pub const DB_VAR: &str = "FEATUREVOTE_DB";
pub const PAGE_SIZE_VAR: &str = "FEATUREVOTE_PAGE_SIZE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` means the platform data directory.
    pub db_path: Option<PathBuf>,
    pub page_size: u32,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| env::var(key).ok())
    }

    /// Load from the environment, with `overrides` (typically command-line
    /// flags) taking precedence key by key. An overridden variable is never
    /// parsed, so a bad value in the environment cannot fail the load.
    pub fn load_with_overrides(overrides: &[(&str, String)]) -> anyhow::Result<Self> {
        Self::load_with(overlay(overrides, |key| env::var(key).ok()))
    }

    /// Load from an arbitrary key lookup instead of the process environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let page_size: u32 = try_load(&lookup, PAGE_SIZE_VAR, &DEFAULT_PAGE_SIZE.to_string())?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            bail!("{PAGE_SIZE_VAR} must be between 1 and {MAX_PAGE_SIZE}, got {page_size}");
        }

        Ok(Self {
            host: try_load(&lookup, HOST_VAR, "127.0.0.1")?,
            port: try_load(&lookup, PORT_VAR, "3000")?,
            db_path: lookup(DB_VAR).filter(|p| !p.trim().is_empty()).map(PathBuf::from),
            page_size,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open the configured database and bring its schema up to date.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = match &self.db_path {
            Some(path) => Database::open(path)
                .with_context(|| format!("opening database {}", path.display()))?,
            None => Database::open_default()?,
        };
        db.migrate().context("migrating database schema")?;
        Ok(db)
    }
}

fn overlay<'a>(
    overrides: &'a [(&'a str, String)],
    fallback: impl Fn(&str) -> Option<String> + 'a,
) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| {
        overrides
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
            .or_else(|| fallback(key))
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow::anyhow!("invalid {key} value {raw:?}: {e}")
    })
}
