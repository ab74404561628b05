//! Caller identity.
//!
//! Token issuance happens upstream; by the time a request reaches this
//! server the gateway has put the caller's user id in [`USER_HEADER`].

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::{error::ApiError, AppState};
use crate::models::User;

pub const USER_HEADER: &str = "x-user-id";

/// An authenticated caller. Rejects the request when no identity is present.
pub struct CurrentUser(pub User);

/// A caller who may be anonymous.
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|u| u.id)
    }
}

fn identify(parts: &Parts, state: &AppState) -> Result<Option<User>, ApiError> {
    let Some(value) = parts.headers.get(USER_HEADER) else {
        return Ok(None);
    };

    let id = value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or(ApiError::InvalidCredentials)?;

    match state.db.get_user(id)? {
        Some(user) => Ok(Some(user)),
        None => Err(ApiError::InvalidCredentials),
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        identify(parts, state)?
            .map(CurrentUser)
            .ok_or(ApiError::Unauthenticated)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        identify(parts, state).map(MaybeUser)
    }
}
