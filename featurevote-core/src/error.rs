use thiserror::Error;

/// Every expected failure of a core operation.
///
/// None of these are fatal to the process; callers map them to transport
/// responses with [`Error::code`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("You cannot vote for your own feature")]
    SelfVote,

    #[error("You have already voted for this feature")]
    DuplicateVote,

    #[error("You haven't voted for this feature")]
    NoVote,

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn feature_not_found() -> Self {
        Self::NotFound("Feature not found".into())
    }

    pub fn user_not_found() -> Self {
        Self::NotFound("User not found".into())
    }

    /// Machine-readable code for error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Forbidden(_) => "forbidden",
            Self::SelfVote => "self_vote",
            Self::DuplicateVote => "duplicate_vote",
            Self::NoVote => "no_vote",
            Self::NotFound(_) => "not_found",
            Self::Database(_) | Self::LockPoisoned => "internal_error",
        }
    }

    /// True for failures caused by the caller rather than the store.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::LockPoisoned)
    }
}
