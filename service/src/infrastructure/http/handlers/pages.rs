use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    domain::{AppState, article::path::UrlPath},
    infrastructure::http::{
        api::{ApiError, ApiSuccess},
        handlers::dto::{LanguageParams, OneResponse},
        querystring::QueryString,
    },
};

/// Home page.
pub async fn find_root_page<S: AppState>(
    QueryString(params): QueryString<LanguageParams>,
    State(state): State<S>,
) -> Result<impl IntoResponse, ApiError> {
    resolve_page(state, UrlPath::root(), params).await
}

pub async fn find_page<S: AppState>(
    Path(path): Path<String>,
    QueryString(params): QueryString<LanguageParams>,
    State(state): State<S>,
) -> Result<impl IntoResponse, ApiError> {
    resolve_page(state, UrlPath::new(path), params).await
}

async fn resolve_page<S: AppState>(
    state: S,
    url_path: UrlPath,
    params: LanguageParams,
) -> Result<impl IntoResponse, ApiError> {
    let language = params.language()?;
    let view = state
        .content()
        .resolve(&url_path, language.as_ref(), Utc::now())
        .await?
        .ok_or(ApiError::NotFound)?;

    let cache_control = format!("public, max-age={}", view.cache_duration);
    Ok((
        [(header::CACHE_CONTROL, cache_control)],
        ApiSuccess::new(StatusCode::OK, OneResponse::new(view.as_ref().clone())),
    ))
}

/// Latest version at a path, published or not.
pub async fn find_latest<S: AppState>(
    Path(path): Path<String>,
    State(state): State<S>,
) -> Result<impl IntoResponse, ApiError> {
    let url_path = UrlPath::new(path);
    state
        .content()
        .get_latest(&url_path)
        .await?
        .map(|version| ApiSuccess::new(StatusCode::OK, OneResponse::new(version)))
        .ok_or(ApiError::NotFound)
}
