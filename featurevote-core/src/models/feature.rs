use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest title accepted for a feature, in characters.
pub const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feature {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Uuid,
    /// Always derived from the vote ledger at read time.
    pub vote_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} votes)", self.title, self.vote_count)
    }
}

/// A feature as seen by one caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureView {
    #[serde(flatten)]
    pub feature: Feature,
    pub has_voted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeatureInput {
    pub title: String,
    pub description: Option<String>,
}

/// Partial update: only the fields that are present change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFeatureInput {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Full replace: a missing description clears the stored one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceFeatureInput {
    pub title: String,
    pub description: Option<String>,
}
