use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    domain::{AppState, activity::ActivityEntry},
    infrastructure::http::{
        api::{ApiError, ApiSuccess},
        handlers::dto::ManyResponse,
    },
};

/// Activity trail of one article entity, newest first.
pub async fn article_activity<S: AppState>(
    Path(article_id): Path<Uuid>,
    State(state): State<S>,
) -> Result<ApiSuccess<ManyResponse<ActivityEntry>>, ApiError> {
    let entries = state.content().activity(article_id).await?;
    Ok(ApiSuccess::new(StatusCode::OK, ManyResponse::from(entries)))
}
