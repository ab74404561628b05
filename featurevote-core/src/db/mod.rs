//! SQLite-backed storage.
//!
//! [`Database`] is a cheap, cloneable handle around a single connection.
//! Each public operation takes the connection lock for its whole duration, so
//! an operation run through [`Database::with_transaction`] is isolated from
//! every other caller.

mod features;
mod ledger;
mod ranking;
mod schema;
mod users;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use directories::ProjectDirs;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

use crate::error::{Error, Result};

pub(crate) use features::author_of;
pub use ledger::VoteLedger;
pub use schema::SCHEMA;

const DB_FILE_NAME: &str = "featurevote.db";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database. Used by tests.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Open the database in the platform data directory, creating the
    /// directory if needed.
    pub fn open_default() -> anyhow::Result<Self> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }
        tracing::debug!("Opening database at {}", path.display());
        Ok(Self::open(&path)?)
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "featurevote", "featurevote")
            .context("could not determine a data directory for this platform")?;
        Ok(dirs.data_dir().join(DB_FILE_NAME))
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create tables and indexes. Safe to run on every start.
    pub fn migrate(&self) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
    }

    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` inside a write transaction. The transaction commits only when
    /// `f` returns `Ok`; any error rolls it back.
    ///
    /// The write lock is taken up front (`BEGIN IMMEDIATE`). Other processes
    /// sharing the file then wait on the busy timeout instead of failing a
    /// read-to-write upgrade with `SQLITE_BUSY`.
    pub fn with_transaction<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        self.run_transaction(TransactionBehavior::Immediate, f)
    }

    /// Run `f` inside a transaction that only reads.
    pub fn with_read_transaction<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        self.run_transaction(TransactionBehavior::Deferred, f)
    }

    fn run_transaction<T>(
        &self,
        behavior: TransactionBehavior,
        f: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(behavior)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }
}

/// Current time at the precision timestamps are stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so that text order matches time order.
pub(crate) fn time_to_sql(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn get_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_times_sort_chronologically() {
        let early = DateTime::parse_from_rfc3339("2024-01-01T09:59:59.5Z")
            .unwrap()
            .with_timezone(&Utc);
        let late = DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(time_to_sql(early) < time_to_sql(late));
    }

    #[test]
    fn migrate_is_repeatable() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        db.migrate().unwrap();
    }
}
