use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    domain::{AppState, article::Version, resolver::ResolvedView},
    infrastructure::http::{
        api::{ApiError, ApiSuccess},
        handlers::dto::{LanguageParams, ManyResponse, OneResponse, VersionRequest},
        querystring::QueryString,
    },
};

pub async fn create_article<S: AppState>(
    State(state): State<S>,
    Json(request): Json<VersionRequest>,
) -> Result<ApiSuccess<OneResponse<Version>>, ApiError> {
    let editor = request.editor()?;
    let draft = request.into_new_version()?;
    state
        .content()
        .create_article(draft, &editor, Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|version| ApiSuccess::new(StatusCode::CREATED, OneResponse::new(version)))
}

pub async fn create_version<S: AppState>(
    Path(article_number): Path<i32>,
    State(state): State<S>,
    Json(request): Json<VersionRequest>,
) -> Result<ApiSuccess<OneResponse<Version>>, ApiError> {
    let session = request.session();
    let editor = request.editor()?;
    let draft = request.into_new_version()?;
    state
        .content()
        .create_version(article_number, draft, session.as_ref(), &editor, Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|version| ApiSuccess::new(StatusCode::CREATED, OneResponse::new(version)))
}

pub async fn list_versions<S: AppState>(
    Path(article_number): Path<i32>,
    State(state): State<S>,
) -> Result<ApiSuccess<ManyResponse<Version>>, ApiError> {
    let versions = state.content().list_versions(article_number).await?;
    if versions.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(ApiSuccess::new(StatusCode::OK, ManyResponse::from(versions)))
}

/// Renders unsaved content the way the page would look once published.
pub async fn preview<S: AppState>(
    Path(article_number): Path<i32>,
    QueryString(params): QueryString<LanguageParams>,
    State(state): State<S>,
    Json(request): Json<VersionRequest>,
) -> Result<ApiSuccess<OneResponse<ResolvedView>>, ApiError> {
    let language = params.language()?;
    let draft = request.into_new_version()?;
    state
        .content()
        .preview(article_number, &draft, language.as_ref(), Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|view| ApiSuccess::new(StatusCode::OK, OneResponse::new(view)))
}
