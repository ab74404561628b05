//! The vote ledger: at most one row per (feature, voter).
//!
//! Duplicate prevention rests on the table's composite primary key, so two
//! racing casts for the same pair can never both insert.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{get_time, get_uuid, now, time_to_sql, Database};
use crate::error::Result;
use crate::models::Vote;

/// Ledger operations bound to a connection or an open transaction.
pub struct VoteLedger<'c> {
    conn: &'c Connection,
}

impl<'c> VoteLedger<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Record a vote. Returns `false` when the pair already had one.
    pub fn cast(&self, feature_id: Uuid, voter_id: Uuid) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO votes (feature_id, voter_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                feature_id.to_string(),
                voter_id.to_string(),
                time_to_sql(now())
            ],
        )?;
        Ok(inserted == 1)
    }

    /// Delete a vote. Returns `false` when there was none.
    pub fn revoke(&self, feature_id: Uuid, voter_id: Uuid) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM votes WHERE feature_id = ?1 AND voter_id = ?2",
            params![feature_id.to_string(), voter_id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    pub fn has_voted(&self, feature_id: Uuid, voter_id: Uuid) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM votes WHERE feature_id = ?1 AND voter_id = ?2",
                params![feature_id.to_string(), voter_id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn count(&self, feature_id: Uuid) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM votes WHERE feature_id = ?1",
            params![feature_id.to_string()],
            |row| row.get(0),
        )?)
    }

    /// Votes on a feature, oldest first.
    pub fn votes(&self, feature_id: Uuid) -> Result<Vec<Vote>> {
        let mut stmt = self.conn.prepare(
            "SELECT feature_id, voter_id, created_at FROM votes
             WHERE feature_id = ?1 ORDER BY created_at, voter_id",
        )?;
        let votes = stmt
            .query_map(params![feature_id.to_string()], |row| {
                Ok(Vote {
                    feature_id: get_uuid(row, 0)?,
                    voter_id: get_uuid(row, 1)?,
                    created_at: get_time(row, 2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(votes)
    }
}

impl Database {
    pub fn cast_vote(&self, feature_id: Uuid, voter_id: Uuid) -> Result<bool> {
        self.with_connection(|conn| VoteLedger::new(conn).cast(feature_id, voter_id))
    }

    pub fn revoke_vote(&self, feature_id: Uuid, voter_id: Uuid) -> Result<bool> {
        self.with_connection(|conn| VoteLedger::new(conn).revoke(feature_id, voter_id))
    }

    pub fn has_voted(&self, feature_id: Uuid, voter_id: Uuid) -> Result<bool> {
        self.with_connection(|conn| VoteLedger::new(conn).has_voted(feature_id, voter_id))
    }

    pub fn vote_count(&self, feature_id: Uuid) -> Result<i64> {
        self.with_connection(|conn| VoteLedger::new(conn).count(feature_id))
    }

    pub fn votes(&self, feature_id: Uuid) -> Result<Vec<Vote>> {
        self.with_connection(|conn| VoteLedger::new(conn).votes(feature_id))
    }
}
