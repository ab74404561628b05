//! Vote transitions for a (feature, user) pair.
//!
//! ```text
//! NOT_VOTED --upvote--> VOTED
//! VOTED --remove_vote--> NOT_VOTED
//! ```
//!
//! Every transition runs in one transaction and reports the fresh count.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{author_of, Database, VoteLedger};
use crate::error::{Error, Result};
use crate::models::{VoteState, VoteStatus};

#[derive(Clone)]
pub struct VotingService {
    db: Database,
}

fn require_voter(conn: &Connection, user_id: Uuid) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        [user_id.to_string()],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(Error::user_not_found())
    }
}

impl VotingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// NOT_VOTED -> VOTED.
    ///
    /// Fails with [`Error::SelfVote`] for the feature's author and
    /// [`Error::DuplicateVote`] when the user already holds a vote; neither
    /// touches the ledger.
    pub fn upvote(&self, feature_id: Uuid, user_id: Uuid) -> Result<VoteStatus> {
        let status = self.db.with_transaction(|tx| {
            let author = author_of(tx, feature_id)?.ok_or_else(Error::feature_not_found)?;
            require_voter(tx, user_id)?;
            if author == user_id {
                return Err(Error::SelfVote);
            }

            let ledger = VoteLedger::new(tx);
            if !ledger.cast(feature_id, user_id)? {
                return Err(Error::DuplicateVote);
            }
            Ok(VoteStatus {
                vote_count: ledger.count(feature_id)?,
                has_voted: true,
            })
        });

        match &status {
            Ok(s) => tracing::info!(
                feature_id = %feature_id,
                user_id = %user_id,
                vote_count = s.vote_count,
                "Upvoted feature"
            ),
            Err(e) if e.is_client_error() => {
                tracing::debug!(feature_id = %feature_id, user_id = %user_id, "Upvote rejected: {}", e)
            }
            Err(e) => tracing::error!(feature_id = %feature_id, "Upvote failed: {}", e),
        }
        status
    }

    /// VOTED -> NOT_VOTED. Fails with [`Error::NoVote`] when there is no vote.
    pub fn remove_vote(&self, feature_id: Uuid, user_id: Uuid) -> Result<VoteStatus> {
        let status = self.db.with_transaction(|tx| {
            author_of(tx, feature_id)?.ok_or_else(Error::feature_not_found)?;

            let ledger = VoteLedger::new(tx);
            if !ledger.revoke(feature_id, user_id)? {
                return Err(Error::NoVote);
            }
            Ok(VoteStatus {
                vote_count: ledger.count(feature_id)?,
                has_voted: false,
            })
        });

        match &status {
            Ok(s) => tracing::info!(
                feature_id = %feature_id,
                user_id = %user_id,
                vote_count = s.vote_count,
                "Removed vote"
            ),
            Err(e) if e.is_client_error() => {
                tracing::debug!(feature_id = %feature_id, user_id = %user_id, "Vote removal rejected: {}", e)
            }
            Err(e) => tracing::error!(feature_id = %feature_id, "Vote removal failed: {}", e),
        }
        status
    }

    /// Current count and, for a known user, whether they hold a vote.
    /// Anonymous callers never have a vote.
    pub fn status(&self, feature_id: Uuid, user_id: Option<Uuid>) -> Result<VoteStatus> {
        self.db.with_read_transaction(|tx| {
            author_of(tx, feature_id)?.ok_or_else(Error::feature_not_found)?;
            let ledger = VoteLedger::new(tx);
            let has_voted = match user_id {
                Some(user_id) => ledger.has_voted(feature_id, user_id)?,
                None => false,
            };
            Ok(VoteStatus {
                vote_count: ledger.count(feature_id)?,
                has_voted,
            })
        })
    }

    pub fn state(&self, feature_id: Uuid, user_id: Uuid) -> Result<VoteState> {
        Ok(self.status(feature_id, Some(user_id))?.state())
    }
}
