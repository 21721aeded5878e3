use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        Page,
        article::{
            NewVersion, VersionStatus,
            lifecycle::PublicationWindow,
            path::{LanguageCode, UrlPath},
        },
        locks::LockRequest,
        service::EditorSession,
    },
    infrastructure::http::api::ApiError,
};

#[derive(Debug, Clone, Serialize)]
pub struct OneResponse<T: Serialize> {
    data: T,
}

impl<T: Serialize> OneResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ManyResponse<T: Serialize> {
    data: Vec<T>,
    meta: MetadataResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
}

impl<T: Serialize> From<Vec<T>> for ManyResponse<T> {
    fn from(data: Vec<T>) -> Self {
        let meta = MetadataResponse {
            total: data.len() as u64,
            page: None,
            page_size: None,
        };
        Self { data, meta }
    }
}

impl<T: Serialize> From<Page<T>> for ManyResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            data: page.items,
            meta: MetadataResponse {
                total: page.total_count,
                page: Some(page.page_no),
                page_size: Some(page.page_size),
            },
        }
    }
}

/// `?lang=` on page and preview requests
#[derive(Debug, Default, Deserialize)]
pub struct LanguageParams {
    pub lang: Option<String>,
}

impl LanguageParams {
    /// A blank `lang` reads as no language
    pub fn language(&self) -> Result<Option<LanguageCode>, ApiError> {
        self.lang
            .as_deref()
            .filter(|lang| !lang.trim().is_empty())
            .map(|lang| {
                LanguageCode::try_new(lang).map_err(|e| {
                    ApiError::UnprocessableEntity(format!("invalid language '{lang}': {e}"))
                })
            })
            .transpose()
    }
}

/// Lock the editor claims while saving.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockClaim {
    pub article_id: Uuid,
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRequest {
    #[serde(default)]
    pub url_path: String,
    pub title: String,
    pub content: String,
    pub header_script: Option<String>,
    pub footer_script: Option<String>,
    pub status: Option<String>,
    pub role_list: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub lock: Option<LockClaim>,
    /// Who is saving; required for writes, ignored by previews
    pub user_identity: Option<String>,
}

impl VersionRequest {
    pub fn session(&self) -> Option<EditorSession> {
        self.lock.as_ref().map(|claim| EditorSession {
            article_id: claim.article_id,
            session_id: claim.session_id.clone(),
        })
    }

    pub fn editor(&self) -> Result<String, ApiError> {
        self.user_identity
            .as_deref()
            .map(str::trim)
            .filter(|identity| !identity.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| ApiError::UnprocessableEntity("userIdentity is required".into()))
    }

    pub fn into_new_version(self) -> Result<NewVersion, ApiError> {
        let status = match self.status.as_deref() {
            Some(raw) => raw.parse::<VersionStatus>()?,
            None => VersionStatus::Active,
        };

        Ok(NewVersion {
            url_path: UrlPath::new(self.url_path),
            title: self.title,
            content: self.content,
            header_script: self.header_script,
            footer_script: self.footer_script,
            status,
            role_list: self.role_list.unwrap_or_default(),
            window: PublicationWindow::new(self.published, self.expires),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockBody {
    pub article_id: Uuid,
    pub session_id: String,
    pub user_identity: String,
    pub editor_kind: String,
    pub file_path: Option<String>,
}

impl From<LockBody> for LockRequest {
    fn from(body: LockBody) -> Self {
        LockRequest {
            article_id: body.article_id,
            session_id: body.session_id,
            user_identity: body.user_identity,
            editor_kind: body.editor_kind,
            file_path: body.file_path,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseResponse {
    pub released: bool,
}
