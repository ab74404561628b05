use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::{CurrentUser, MaybeUser};
use super::error::ApiError;
use super::AppState;
use crate::models::*;
use featurevote_core::Error as CoreError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Returned by both vote transitions.
#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    pub message: String,
    pub vote_count: i64,
    pub has_voted: bool,
}

/// A malformed id can never name a feature, so it is reported as missing.
fn parse_feature_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| CoreError::feature_not_found().into())
}

/// Authors cannot vote on their own features, so a feature returned to its
/// author never carries their vote.
fn author_view(feature: Feature) -> FeatureView {
    FeatureView {
        feature,
        has_voted: false,
    }
}

pub async fn list(
    State(state): State<AppState>,
    viewer: MaybeUser,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<FeatureView>>, ApiError> {
    let Query(params) = params?;
    let request = PageRequest::new(params.page, params.page_size, state.default_page_size);
    let page = state.db.ranked_features(request, viewer.id())?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateFeatureInput>, JsonRejection>,
) -> Result<(StatusCode, Json<FeatureView>), ApiError> {
    let Json(input) = payload?;
    let feature = state.db.create_feature(user.id, input)?;
    Ok((StatusCode::CREATED, Json(author_view(feature))))
}

pub async fn retrieve(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<FeatureView>, ApiError> {
    let id = parse_feature_id(&id)?;
    Ok(Json(state.db.get_feature_view(id, viewer.id())?))
}

pub async fn replace(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<ReplaceFeatureInput>, JsonRejection>,
) -> Result<Json<FeatureView>, ApiError> {
    let id = parse_feature_id(&id)?;
    let Json(input) = payload?;
    let feature = state.db.replace_feature(id, user.id, input)?;
    Ok(Json(author_view(feature)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateFeatureInput>, JsonRejection>,
) -> Result<Json<FeatureView>, ApiError> {
    let id = parse_feature_id(&id)?;
    let Json(input) = payload?;
    let feature = state.db.update_feature(id, user.id, input)?;
    Ok(Json(author_view(feature)))
}

pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_feature_id(&id)?;
    state.db.delete_feature(id, user.id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upvote(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<VoteResponse>, ApiError> {
    let id = parse_feature_id(&id)?;
    let status = state.voting.upvote(id, user.id)?;
    Ok(Json(VoteResponse {
        message: "Feature upvoted successfully".into(),
        vote_count: status.vote_count,
        has_voted: status.has_voted,
    }))
}

pub async fn remove_vote(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<VoteResponse>, ApiError> {
    let id = parse_feature_id(&id)?;
    let status = state.voting.remove_vote(id, user.id)?;
    Ok(Json(VoteResponse {
        message: "Vote removed successfully".into(),
        vote_count: status.vote_count,
        has_voted: status.has_voted,
    }))
}
