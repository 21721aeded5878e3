use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    domain::{AppState, article::path::PathPrefix, toc::TocItem},
    infrastructure::http::{
        api::{ApiError, ApiSuccess},
        handlers::dto::ManyResponse,
        querystring::QueryString,
    },
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocParams {
    prefix: Option<String>,
    page: Option<u32>,
    size: Option<u32>,
    #[serde(default)]
    order_by_published: bool,
}

pub async fn table_of_contents<S: AppState>(
    QueryString(params): QueryString<TocParams>,
    State(state): State<S>,
) -> Result<ApiSuccess<ManyResponse<TocItem>>, ApiError> {
    let prefix = params
        .prefix
        .as_deref()
        .map(PathPrefix::parse)
        .unwrap_or_else(PathPrefix::root);

    state
        .content()
        .get_children(
            &prefix,
            params.page.unwrap_or_default(),
            params.size.unwrap_or_default(),
            params.order_by_published,
            Utc::now(),
        )
        .await
        .map_err(ApiError::from)
        .map(|toc| ApiSuccess::new(StatusCode::OK, ManyResponse::from(toc)))
}
