use chrono::{DateTime, Utc};

use crate::domain::{
    article::{NewVersion, Version, error::ContentError, path::UrlPath},
    numbers::{ArticleNumberAllocator, RetryPolicy, version_counter},
    repository::{CounterRepository, VersionRepository},
};

/// Appends and reads immutable versions. Version numbers come from a
/// per-article counter that only moves together with a stored row, so
/// concurrent writers get a contiguous sequence.
#[derive(Debug, Clone)]
pub struct VersionStore<R> {
    repository: R,
    numbers: ArticleNumberAllocator<R>,
    policy: RetryPolicy,
}

impl<R> VersionStore<R>
where
    R: CounterRepository + VersionRepository + Clone,
{
    pub fn new(repository: R, policy: RetryPolicy) -> Self {
        let numbers = ArticleNumberAllocator::new(repository.clone(), policy);
        Self {
            repository,
            numbers,
            policy,
        }
    }

    pub async fn create(
        &self,
        article_number: i32,
        draft: NewVersion,
        now: DateTime<Utc>,
    ) -> Result<Version, ContentError> {
        draft.validate()?;
        if !self.numbers.is_allocated(article_number).await? {
            return Err(ContentError::not_found("article", article_number));
        }

        let counter = version_counter(article_number);
        let mut version = draft.into_version(article_number, 0, now);
        for attempt in 0..self.policy.attempts {
            let current = self.repository.current(&counter).await?;
            version.version_number = current.unwrap_or(0) + 1;
            if self.repository.append(&counter, current, &version).await? {
                tracing::info!(
                    article_number,
                    version_number = version.version_number,
                    url_path = %version.url_path,
                    "version created"
                );
                return Ok(version);
            }
            tracing::debug!(article_number, attempt, "version counter moved, retrying");
            tokio::time::sleep(self.policy.delay(attempt)).await;
        }

        tracing::warn!(article_number, attempts = self.policy.attempts, "version numbering gave up");
        Err(ContentError::AllocationFailed {
            counter,
            attempts: self.policy.attempts,
        })
    }

    pub async fn get_published(
        &self,
        url_path: &UrlPath,
        at: DateTime<Utc>,
    ) -> Result<Option<Version>, ContentError> {
        Ok(self.repository.find_published(url_path, at).await?)
    }

    pub async fn get_latest(&self, url_path: &UrlPath) -> Result<Option<Version>, ContentError> {
        Ok(self.repository.find_latest(url_path).await?)
    }

    pub async fn list_versions(&self, article_number: i32) -> Result<Vec<Version>, ContentError> {
        Ok(self.repository.list_by_article(article_number).await?)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Duration;
    use tokio::task::JoinSet;

    use super::*;
    use crate::domain::{
        article::{ArticleContent, VersionStatus, lifecycle::PublicationWindow},
        repository::RepositoryError,
        test_utils::{InMemoryStore, draft, patient_retry},
    };

    async fn store_with_article() -> (VersionStore<InMemoryStore>, i32) {
        let repository = InMemoryStore::default();
        let number = ArticleNumberAllocator::new(repository.clone(), RetryPolicy::default())
            .allocate()
            .await
            .unwrap();
        (VersionStore::new(repository, patient_retry()), number)
    }

    #[tokio::test]
    async fn unknown_article_is_not_found() {
        let store = VersionStore::new(InMemoryStore::default(), RetryPolicy::default());
        assert_matches!(
            store.create(7, draft("a", "A"), Utc::now()).await,
            Err(ContentError::NotFound { entity: "article", .. })
        );
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_numbering() {
        let (store, number) = store_with_article().await;
        let mut empty = draft("a", "A");
        empty.content = String::new();

        assert_matches!(
            store.create(number, empty, Utc::now()).await,
            Err(ContentError::Validation(_))
        );
        assert_eq!(store.create(number, draft("a", "A"), Utc::now()).await.unwrap().version_number, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_contiguous_numbers() {
        let (store, number) = store_with_article().await;

        let mut tasks = JoinSet::new();
        for i in 0..24 {
            let store = store.clone();
            tasks.spawn(async move {
                store
                    .create(number, draft("a", &format!("A{i}")), Utc::now())
                    .await
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let numbers: Vec<i32> = store
            .list_versions(number)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        assert_eq!(numbers, (1..=24).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn published_skips_invisible_versions() {
        let (store, number) = store_with_article().await;
        let now = Utc::now();

        store.create(number, draft("a", "first"), now).await.unwrap();

        let mut future = draft("a", "scheduled");
        future.window = PublicationWindow::new(Some(now + Duration::hours(1)), None);
        store.create(number, future, now).await.unwrap();

        let mut retired = draft("a", "retired");
        retired.status = VersionStatus::Deleted;
        store.create(number, retired, now).await.unwrap();

        let path = UrlPath::new("/A/");
        let published = store.get_published(&path, now).await.unwrap().unwrap();
        assert_eq!(published.title(), "first");
        assert!(published.is_visible_at(now));

        let later = store
            .get_published(&path, now + Duration::hours(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(later.title(), "scheduled");

        let latest = store.get_latest(&path).await.unwrap().unwrap();
        assert_eq!(latest.version_number, 3);
        assert_eq!(latest.status, VersionStatus::Deleted);
    }

    #[tokio::test]
    async fn failed_write_leaves_no_gap() {
        let repository = InMemoryStore::default();
        let number = ArticleNumberAllocator::new(repository.clone(), RetryPolicy::default())
            .allocate()
            .await
            .unwrap();
        let store = VersionStore::new(repository.clone(), RetryPolicy::default());

        repository.fail_next_appends(1);
        assert_matches!(
            store.create(number, draft("a", "lost"), Utc::now()).await,
            Err(ContentError::Upstream(RepositoryError::DatabaseError(_)))
        );

        let first = store.create(number, draft("a", "A1"), Utc::now()).await.unwrap();
        let second = store.create(number, draft("a", "A2"), Utc::now()).await.unwrap();
        assert_eq!(first.version_number, 1);
        assert_eq!(second.version_number, 2);
        assert_eq!(store.list_versions(number).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_path_is_none() {
        let (store, _) = store_with_article().await;
        assert!(store.get_published(&UrlPath::new("nope"), Utc::now()).await.unwrap().is_none());
        assert!(store.get_latest(&UrlPath::new("nope")).await.unwrap().is_none());
    }
}
