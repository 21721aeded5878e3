pub mod error;
pub mod lifecycle;
pub mod path;

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::article::{error::ContentError, lifecycle::PublicationWindow, path::UrlPath};

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId(pub Uuid);

impl VersionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for VersionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Active,
    Inactive,
    Deleted,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Active => "active",
            VersionStatus::Inactive => "inactive",
            VersionStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionStatus {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(VersionStatus::Active),
            "inactive" | "draft" => Ok(VersionStatus::Inactive),
            "deleted" => Ok(VersionStatus::Deleted),
            other => Err(ContentError::Validation(format!(
                "unknown version status '{other}'"
            ))),
        }
    }
}

/// Fields the resolver reads from anything renderable, stored or not.
pub trait ArticleContent {
    fn title(&self) -> &str;
    fn content(&self) -> &str;
    fn header_script(&self) -> Option<&str>;
    fn footer_script(&self) -> Option<&str>;
    fn role_list(&self) -> &str;
    fn status(&self) -> VersionStatus;
    fn window(&self) -> &PublicationWindow;

    fn is_visible_at(&self, at: DateTime<Utc>) -> bool {
        self.status() == VersionStatus::Active && self.window().is_open_at(at)
    }
}

/// One immutable snapshot of an article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Version {
    pub id: VersionId,
    pub article_number: i32,
    pub version_number: i32,
    pub url_path: UrlPath,
    pub title: String,
    pub content: String,
    pub header_script: Option<String>,
    pub footer_script: Option<String>,
    pub status: VersionStatus,
    /// Comma-delimited role names, empty for public content
    pub role_list: String,
    #[serde(flatten)]
    pub window: PublicationWindow,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Content of a version that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVersion {
    pub url_path: UrlPath,
    pub title: String,
    pub content: String,
    pub header_script: Option<String>,
    pub footer_script: Option<String>,
    pub status: VersionStatus,
    pub role_list: String,
    pub window: PublicationWindow,
}

impl NewVersion {
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.title.trim().is_empty() {
            return Err(ContentError::Validation("title must not be empty".into()));
        }
        if self.content.trim().is_empty() {
            return Err(ContentError::Validation("content must not be empty".into()));
        }
        if !self.window.is_well_formed() {
            return Err(ContentError::Validation(
                "expires must be later than published".into(),
            ));
        }
        Ok(())
    }

    pub fn into_version(
        self,
        article_number: i32,
        version_number: i32,
        now: DateTime<Utc>,
    ) -> Version {
        Version {
            id: VersionId::generate(),
            article_number,
            version_number,
            url_path: self.url_path,
            title: self.title,
            content: self.content,
            header_script: self.header_script,
            footer_script: self.footer_script,
            status: self.status,
            role_list: self.role_list,
            window: self.window,
            created: now,
            updated: now,
        }
    }
}

impl ArticleContent for Version {
    fn title(&self) -> &str {
        &self.title
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn header_script(&self) -> Option<&str> {
        self.header_script.as_deref()
    }

    fn footer_script(&self) -> Option<&str> {
        self.footer_script.as_deref()
    }

    fn role_list(&self) -> &str {
        &self.role_list
    }

    fn status(&self) -> VersionStatus {
        self.status
    }

    fn window(&self) -> &PublicationWindow {
        &self.window
    }
}

impl ArticleContent for NewVersion {
    fn title(&self) -> &str {
        &self.title
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn header_script(&self) -> Option<&str> {
        self.header_script.as_deref()
    }

    fn footer_script(&self) -> Option<&str> {
        self.footer_script.as_deref()
    }

    fn role_list(&self) -> &str {
        &self.role_list
    }

    fn status(&self) -> VersionStatus {
        self.status
    }

    fn window(&self) -> &PublicationWindow {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Duration;

    use super::*;
    use crate::domain::test_utils::draft;

    #[test]
    fn blank_title_is_rejected() {
        let mut new_version = draft("a", "A");
        new_version.title = "  ".into();
        assert_matches!(new_version.validate(), Err(ContentError::Validation(_)));
    }

    #[test]
    fn empty_content_is_rejected() {
        let mut new_version = draft("a", "A");
        new_version.content = String::new();
        assert_matches!(new_version.validate(), Err(ContentError::Validation(_)));
    }

    #[test]
    fn draft_and_version_share_visibility_rules() {
        let now = Utc::now();
        let mut new_version = draft("a", "A");
        new_version.window = PublicationWindow::new(Some(now - Duration::hours(1)), None);
        assert!(new_version.is_visible_at(now));

        let version = new_version.clone().into_version(1, 1, now);
        assert!(version.is_visible_at(now));

        let mut inactive = new_version;
        inactive.status = VersionStatus::Inactive;
        assert!(!inactive.is_visible_at(now));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Active".parse::<VersionStatus>().unwrap(), VersionStatus::Active);
        assert_eq!("draft".parse::<VersionStatus>().unwrap(), VersionStatus::Inactive);
        assert_matches!("gone".parse::<VersionStatus>(), Err(ContentError::Validation(_)));
    }
}
