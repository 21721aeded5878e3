use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    domain::{
        AppState,
        article::VersionStatus,
        catalog::CatalogEntry,
        repository::query::{CatalogFilter, CatalogQuery, CatalogSortField, SortDirection},
    },
    infrastructure::http::{
        api::{ApiError, ApiSuccess},
        handlers::dto::{CountResponse, ManyResponse, OneResponse},
        querystring::QueryString,
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    title: Option<String>,
    status: Option<String>,
    prefix: Option<String>,
    sort: Option<String>,
    #[serde(default)]
    desc: bool,
    page: Option<u32>,
    size: Option<u32>,
}

impl TryFrom<CatalogParams> for CatalogQuery {
    type Error = ApiError;

    fn try_from(params: CatalogParams) -> Result<Self, Self::Error> {
        let mut query = CatalogQuery::new();

        if let Some(title) = params.title.filter(|t| !t.trim().is_empty()) {
            query = query.and(CatalogFilter::TitleContains(title.trim().to_owned()));
        }
        if let Some(status) = params.status {
            query = query.and(CatalogFilter::StatusIs(status.parse::<VersionStatus>()?));
        }
        if let Some(prefix) = params.prefix.filter(|p| !p.trim().is_empty()) {
            let prefix = prefix.trim_matches('/').to_lowercase();
            query = query.and(CatalogFilter::PathStartsWith(prefix));
        }
        if let Some(sort) = params.sort {
            let direction = if params.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            query = query.add_sort(sort.parse::<CatalogSortField>()?, direction);
        }

        Ok(query.paginate(
            params.page.unwrap_or_default(),
            params.size.unwrap_or_default(),
        ))
    }
}

pub async fn list_catalog<S: AppState>(
    QueryString(params): QueryString<CatalogParams>,
    State(state): State<S>,
) -> Result<ApiSuccess<ManyResponse<CatalogEntry>>, ApiError> {
    let query = CatalogQuery::try_from(params)?;
    state
        .content()
        .list_catalog(&query)
        .await
        .map_err(ApiError::from)
        .map(|page| ApiSuccess::new(StatusCode::OK, ManyResponse::from(page)))
}

pub async fn resync_catalog<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<OneResponse<CountResponse>>, ApiError> {
    let count = state.content().resync_catalog(Utc::now()).await?;
    tracing::info!(count, "catalog resynced on request");
    Ok(ApiSuccess::new(
        StatusCode::OK,
        OneResponse::new(CountResponse { count }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_combine_into_one_filter() {
        let params = CatalogParams {
            title: Some(" News ".into()),
            status: Some("active".into()),
            prefix: Some("/Blog/".into()),
            sort: Some("updated".into()),
            desc: true,
            page: Some(1),
            size: Some(500),
        };
        let query = CatalogQuery::try_from(params).unwrap();

        assert_eq!(
            query.filter,
            CatalogFilter::And(
                Box::new(CatalogFilter::And(
                    Box::new(CatalogFilter::TitleContains("News".into())),
                    Box::new(CatalogFilter::StatusIs(VersionStatus::Active)),
                )),
                Box::new(CatalogFilter::PathStartsWith("blog".into())),
            )
        );
        assert_eq!(
            query.sort,
            vec![(CatalogSortField::Updated, SortDirection::Descending)]
        );
        assert_eq!(query.page_size, 200);
        assert_eq!(query.offset(), 200);
    }

    #[test]
    fn empty_params_list_everything() {
        let query = CatalogQuery::try_from(CatalogParams::default()).unwrap();
        assert_eq!(query.filter, CatalogFilter::All);
        assert!(query.sort.is_empty());
    }

    #[test]
    fn unknown_sort_field_is_unprocessable() {
        let params = CatalogParams {
            sort: Some("colour".into()),
            ..Default::default()
        };
        assert!(matches!(
            CatalogQuery::try_from(params),
            Err(ApiError::UnprocessableEntity(_))
        ));
    }
}
