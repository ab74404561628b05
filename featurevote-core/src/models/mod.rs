//! Domain models for featurevote.
//!
//! - [`User`]: a registered account; authors features and casts votes.
//! - [`Feature`]: a submitted, votable request. Its `vote_count` is always
//!   derived from the ledger, never stored.
//! - [`Vote`]: one user's endorsement of one feature, keyed by
//!   (feature, voter).

mod feature;
mod page;
mod user;
mod vote;

pub use feature::*;
pub use page::*;
pub use user::*;
pub use vote::*;
