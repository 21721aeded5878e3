use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use crate::domain::{
    Page,
    article::{ArticleContent, Version, VersionStatus, error::ContentError, path::UrlPath},
    repository::{CatalogRepository, VersionRepository, query::CatalogQuery},
};

/// Articles re-projected at the same time during a full resync.
const RESYNC_CONCURRENCY: usize = 8;

/// One listing row per article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub article_number: i32,
    pub title: String,
    pub status: VersionStatus,
    pub updated: DateTime<Utc>,
    pub published: Option<DateTime<Utc>>,
    pub url_path: UrlPath,
}

impl From<&Version> for CatalogEntry {
    fn from(version: &Version) -> Self {
        Self {
            article_number: version.article_number,
            title: version.title.clone(),
            status: version.status,
            updated: version.updated,
            published: version.window.published,
            url_path: version.url_path.clone(),
        }
    }
}

/// The version an article is listed under: its latest visible one,
/// else its latest one. `versions` must be ascending.
fn select_listed(versions: &[Version], now: DateTime<Utc>) -> Option<&Version> {
    versions
        .iter()
        .rev()
        .find(|version| version.is_visible_at(now))
        .or_else(|| versions.last())
}

/// Keeps the catalog in step with the version history.
///
/// Projection runs right after each write. Entries can still drift when a
/// publication window opens or closes without a write, or when a projection
/// fails; `resync_all` repairs both and is run periodically.
#[derive(Debug, Clone)]
pub struct CatalogProjector<R> {
    repository: R,
}

impl<R> CatalogProjector<R>
where
    R: VersionRepository + CatalogRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn on_version_written(
        &self,
        version: &Version,
        now: DateTime<Utc>,
    ) -> Result<CatalogEntry, ContentError> {
        self.resync_article(version.article_number, now)
            .await?
            .ok_or_else(|| ContentError::not_found("article", version.article_number))
    }

    /// Recomputes one entry from the full history. `None` when the article has no versions.
    pub async fn resync_article(
        &self,
        article_number: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<CatalogEntry>, ContentError> {
        let versions = self.repository.list_by_article(article_number).await?;
        let Some(listed) = select_listed(&versions, now) else {
            return Ok(None);
        };

        let entry = CatalogEntry::from(listed);
        self.repository.upsert(&entry).await?;
        tracing::debug!(
            article_number,
            version_number = listed.version_number,
            "catalog entry projected"
        );
        Ok(Some(entry))
    }

    /// Re-projects every article. Returns how many entries were written.
    pub async fn resync_all(&self, now: DateTime<Utc>) -> Result<usize, ContentError> {
        let numbers = self.repository.article_numbers().await?;

        let mut written = 0;
        for chunk in numbers.chunks(RESYNC_CONCURRENCY) {
            let pending: Vec<_> = chunk
                .iter()
                .map(|&number| self.resync_article(number, now))
                .collect();
            let results = join_all(pending).await;

            for (&article_number, result) in chunk.iter().zip(results) {
                match result {
                    Ok(Some(_)) => written += 1,
                    Ok(None) => {}
                    Err(error) => {
                        tracing::error!(article_number, %error, "catalog resync failed");
                    }
                }
            }
        }
        Ok(written)
    }

    pub async fn list(&self, query: &CatalogQuery) -> Result<Page<CatalogEntry>, ContentError> {
        let (items, total_count) = self.repository.list(query).await?;
        Ok(Page {
            total_count,
            page_no: query.page_no,
            page_size: query.page_size,
            items,
        })
    }
}
