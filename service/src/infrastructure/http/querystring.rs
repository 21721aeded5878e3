use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;
use serde_querystring::ParseMode;

use crate::infrastructure::http::api::ApiError;

/// Query string extractor. Unlike axum's `Query`, malformed input surfaces
/// as an `ApiError` with a JSON body.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryString<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryString<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        serde_querystring::from_str(query, ParseMode::UrlEncoded)
            .map(QueryString)
            .map_err(|e| ApiError::UnprocessableEntity(format!("invalid query string: {e}")))
    }
}

impl<T> Deref for QueryString<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Params {
        prefix: Option<String>,
        page: Option<u32>,
        order_by_published: Option<bool>,
    }

    async fn extract(uri: &str) -> Result<QueryString<Params>, ApiError> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        QueryString::<Params>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_typed_parameters() {
        let QueryString(params) = extract("/toc?prefix=news%2Flocal&page=2&orderByPublished=true")
            .await
            .unwrap();
        assert_eq!(
            params,
            Params {
                prefix: Some("news/local".into()),
                page: Some(2),
                order_by_published: Some(true),
            }
        );
    }

    #[tokio::test]
    async fn missing_query_gives_defaults() {
        let QueryString(params) = extract("/toc").await.unwrap();
        assert_eq!(params.page, None);
        assert_eq!(params.prefix, None);
    }

    #[tokio::test]
    async fn bad_number_is_unprocessable() {
        assert!(matches!(
            extract("/toc?page=first").await,
            Err(ApiError::UnprocessableEntity(_))
        ));
    }
}
