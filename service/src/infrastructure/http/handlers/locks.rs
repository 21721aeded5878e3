use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{AppState, locks::EditLock},
    infrastructure::http::{
        api::{ApiError, ApiSuccess},
        handlers::dto::{LockBody, OneResponse, ReleaseResponse},
    },
};

pub async fn acquire_lock<S: AppState>(
    State(state): State<S>,
    Json(body): Json<LockBody>,
) -> Result<ApiSuccess<OneResponse<EditLock>>, ApiError> {
    let request = body.into();
    state
        .content()
        .acquire_lock(&request, Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|lock| ApiSuccess::new(StatusCode::OK, OneResponse::new(lock)))
}

pub async fn release_lock<S: AppState>(
    Path((article_id, session_id)): Path<(Uuid, String)>,
    State(state): State<S>,
) -> Result<ApiSuccess<OneResponse<ReleaseResponse>>, ApiError> {
    let released = state
        .content()
        .release_lock(article_id, &session_id, Utc::now())
        .await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        OneResponse::new(ReleaseResponse { released }),
    ))
}

pub async fn lock_holder<S: AppState>(
    Path(article_id): Path<Uuid>,
    State(state): State<S>,
) -> Result<ApiSuccess<OneResponse<EditLock>>, ApiError> {
    state
        .content()
        .lock_holder(article_id, Utc::now())
        .await?
        .map(|lock| ApiSuccess::new(StatusCode::OK, OneResponse::new(lock)))
        .ok_or(ApiError::NotFound)
}
