//! HTTP API.
//!
//! Thin axum handlers over the core: each one resolves the caller, calls a
//! single core operation and maps its typed outcome to a response.

mod auth;
mod error;
mod features;
mod users;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::models::DEFAULT_PAGE_SIZE;
use featurevote_core::VotingService;

pub use auth::{CurrentUser, MaybeUser, USER_HEADER};
pub use error::{ApiError, ErrorBody};
pub use features::{ListParams, VoteResponse};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub voting: VotingService,
    pub default_page_size: u32,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            voting: VotingService::new(db.clone()),
            db,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }
}

pub fn create_router(db: Database) -> Router {
    router(AppState::new(db))
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/users", post(users::register))
        .route(
            "/users/me",
            get(users::me).put(users::replace_me).patch(users::update_me),
        )
        .route("/users/{id}", get(users::get_user))
        .route("/features", get(features::list).post(features::create))
        .route(
            "/features/{id}",
            get(features::retrieve)
                .put(features::replace)
                .patch(features::update)
                .delete(features::destroy),
        )
        .route("/features/{id}/upvote", post(features::upvote))
        .route("/features/{id}/remove_vote", delete(features::remove_vote));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
