//! Core library for featurevote.
//!
//! This crate provides the domain models, the vote ledger, the ranking query
//! and the voting rules, independent of any transport layer (HTTP, MCP, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use featurevote_core::models::*;
//! use featurevote_core::{Database, VotingService};
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let alice = db.create_user(CreateUserInput { username: "alice".into(), email: None })?;
//! let bob = db.create_user(CreateUserInput { username: "bob".into(), email: None })?;
//! let feature = db.create_feature(alice.id, CreateFeatureInput {
//!     title: "Dark Mode".into(),
//!     description: None,
//! })?;
//!
//! let voting = VotingService::new(db.clone());
//! let status = voting.upvote(feature.id, bob.id)?;
//! assert_eq!(status.vote_count, 1);
//!
//! let ranked = db.ranked_all()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod seed;
pub mod voting;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::{Error, Result};
pub use voting::VotingService;
