use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub feature_id: Uuid,
    pub voter_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Whether a user currently holds a vote on a feature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    NotVoted,
    Voted,
}

impl From<bool> for VoteState {
    fn from(has_voted: bool) -> Self {
        if has_voted {
            Self::Voted
        } else {
            Self::NotVoted
        }
    }
}

/// Result of a vote transition, so callers need no second query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteStatus {
    pub vote_count: i64,
    pub has_voted: bool,
}

impl VoteStatus {
    pub fn state(&self) -> VoteState {
        VoteState::from(self.has_voted)
    }
}
