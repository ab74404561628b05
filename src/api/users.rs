use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::auth::CurrentUser;
use super::error::ApiError;
use super::AppState;
use crate::models::{CreateUserInput, UpdateUserInput, User};
use featurevote_core::Error as CoreError;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(input) = payload?;
    let user = state.db.create_user(input)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdateUserInput>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.db.update_user(user.id, input)?))
}

/// Full replace: username is required and a missing email clears it.
pub async fn replace_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateUserInput>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(input) = payload?;
    let input = UpdateUserInput {
        username: Some(input.username),
        email: Some(input.email.unwrap_or_default()),
    };
    Ok(Json(state.db.update_user(user.id, input)?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = Uuid::parse_str(&id)
        .ok()
        .map(|id| state.db.get_user(id))
        .transpose()?
        .flatten()
        .ok_or_else(CoreError::user_not_found)?;
    Ok(Json(user))
}
