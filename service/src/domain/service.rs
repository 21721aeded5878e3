use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{
    Page,
    activity::{ActivityEntry, ActivityLog},
    article::{
        NewVersion, Version,
        error::ContentError,
        path::{LanguageCode, PathPrefix, UrlPath},
    },
    cache::ViewCache,
    catalog::{CatalogEntry, CatalogProjector},
    locks::{EditLock, EditLockManager, LockRequest},
    numbers::{ArticleNumberAllocator, RetryPolicy},
    repository::{ContentStore, query::CatalogQuery},
    resolver::{PublicationResolver, ResolvedView, ResolverSettings},
    toc::{TableOfContents, TocIndexer},
    translation::Translator,
    versions::VersionStore,
};

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub retry: RetryPolicy,
    pub lock_ttl: Duration,
    pub resolver: ResolverSettings,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            lock_ttl: Duration::minutes(20),
            resolver: ResolverSettings::default(),
        }
    }
}

/// Lock an editor claims to hold while saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    pub article_id: Uuid,
    pub session_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub reaped_locks: usize,
    pub resynced_entries: usize,
    pub purged_views: usize,
}

/// Entry point to the content core: every operation callers may use.
#[derive(Debug)]
pub struct ContentService<S, T> {
    allocator: ArticleNumberAllocator<S>,
    versions: VersionStore<S>,
    resolver: PublicationResolver<S, T>,
    catalog: CatalogProjector<S>,
    toc: TocIndexer<S>,
    locks: EditLockManager<S>,
    activity: ActivityLog<S>,
    cache: Arc<ViewCache>,
}

impl<S: ContentStore, T: Translator> ContentService<S, T> {
    pub fn new(store: S, translator: T, settings: ContentSettings) -> Self {
        let cache = Arc::new(ViewCache::new());
        let versions = VersionStore::new(store.clone(), settings.retry);
        Self {
            allocator: ArticleNumberAllocator::new(store.clone(), settings.retry),
            resolver: PublicationResolver::new(
                versions.clone(),
                store.clone(),
                translator,
                cache.clone(),
                settings.resolver,
            ),
            versions,
            catalog: CatalogProjector::new(store.clone()),
            toc: TocIndexer::new(store.clone()),
            locks: EditLockManager::new(store.clone(), settings.lock_ttl),
            activity: ActivityLog::new(store),
            cache,
        }
    }

    pub async fn allocate_article_number(&self) -> Result<i32, ContentError> {
        self.allocator.allocate().await
    }

    /// Allocates a number and writes the first version of a new article.
    pub async fn create_article(
        &self,
        draft: NewVersion,
        user_identity: &str,
        now: DateTime<Utc>,
    ) -> Result<Version, ContentError> {
        draft.validate()?;
        let article_number = self.allocator.allocate().await?;
        let version = self.write_version(article_number, draft, now).await?;
        self.record(user_identity, &version, "new article created", now)
            .await;
        Ok(version)
    }

    /// Appends a version and projects it into the catalog.
    ///
    /// With `session`, the write is refused while another session holds the
    /// lock, and the locked entity must be a version of this article.
    pub async fn create_version(
        &self,
        article_number: i32,
        draft: NewVersion,
        session: Option<&EditorSession>,
        user_identity: &str,
        now: DateTime<Utc>,
    ) -> Result<Version, ContentError> {
        if let Some(session) = session {
            self.check_session(article_number, session, now).await?;
        }

        let version = self.write_version(article_number, draft, now).await?;
        let notes = format!("version {} created", version.version_number);
        self.record(user_identity, &version, notes, now).await;
        Ok(version)
    }

    async fn check_session(
        &self,
        article_number: i32,
        session: &EditorSession,
        now: DateTime<Utc>,
    ) -> Result<(), ContentError> {
        let versions = self.versions.list_versions(article_number).await?;
        if !versions.iter().any(|v| v.id.0 == session.article_id) {
            return Err(ContentError::Validation(format!(
                "lock on {} does not belong to article {article_number}",
                session.article_id
            )));
        }

        match self.locks.holder(session.article_id, now).await? {
            Some(holder) if holder.session_id != session.session_id => {
                Err(ContentError::Conflict {
                    held_by: holder.user_identity,
                    since: holder.acquired_at,
                })
            }
            _ => Ok(()),
        }
    }

    // A failed projection is logged only; the periodic resync repairs it.
    async fn write_version(
        &self,
        article_number: i32,
        draft: NewVersion,
        now: DateTime<Utc>,
    ) -> Result<Version, ContentError> {
        let version = self.versions.create(article_number, draft, now).await?;
        if let Err(error) = self.catalog.on_version_written(&version, now).await {
            tracing::error!(article_number, %error, "catalog projection failed");
        }
        Ok(version)
    }

    async fn record(
        &self,
        user_identity: &str,
        version: &Version,
        notes: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        let entry =
            ActivityEntry::new(user_identity, version.id.0, Some(&version.title), notes, now);
        self.activity.record(entry).await;
    }

    pub async fn list_versions(&self, article_number: i32) -> Result<Vec<Version>, ContentError> {
        self.versions.list_versions(article_number).await
    }

    pub async fn get_latest(&self, url_path: &UrlPath) -> Result<Option<Version>, ContentError> {
        self.versions.get_latest(url_path).await
    }

    pub async fn resolve(
        &self,
        url_path: &UrlPath,
        language: Option<&LanguageCode>,
        now: DateTime<Utc>,
    ) -> Result<Option<Arc<ResolvedView>>, ContentError> {
        self.resolver.resolve(url_path, language, now).await
    }

    pub async fn preview(
        &self,
        article_number: i32,
        draft: &NewVersion,
        language: Option<&LanguageCode>,
        now: DateTime<Utc>,
    ) -> Result<ResolvedView, ContentError> {
        self.resolver
            .preview(article_number, draft, language, now)
            .await
    }

    pub async fn get_children(
        &self,
        prefix: &PathPrefix,
        page_no: u32,
        page_size: u32,
        order_by_published: bool,
        now: DateTime<Utc>,
    ) -> Result<TableOfContents, ContentError> {
        self.toc
            .get_children(prefix, page_no, page_size, order_by_published, now)
            .await
    }

    /// Grants the lock and records who took it. Same-session refreshes are not recorded.
    pub async fn acquire_lock(
        &self,
        request: &LockRequest,
        now: DateTime<Utc>,
    ) -> Result<EditLock, ContentError> {
        let previous = self.locks.holder(request.article_id, now).await?;
        let lock = self.locks.acquire(request, now).await?;

        let refreshed = previous.is_some_and(|p| p.session_id == request.session_id);
        if !refreshed {
            let notes = format!("edit lock acquired ({})", lock.editor_kind);
            let entry = ActivityEntry::new(&lock.user_identity, lock.article_id, None, notes, now);
            self.activity.record(entry).await;
        }
        Ok(lock)
    }

    pub async fn release_lock(
        &self,
        article_id: Uuid,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, ContentError> {
        let owned = self.locks.owned_by(article_id, session_id).await?;
        let released = self.locks.release(article_id, session_id).await?;
        if let (true, Some(lock)) = (released, owned) {
            let entry =
                ActivityEntry::new(&lock.user_identity, article_id, None, "edit lock released", now);
            self.activity.record(entry).await;
        }
        Ok(released)
    }

    pub async fn lock_holder(
        &self,
        article_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<EditLock>, ContentError> {
        self.locks.holder(article_id, now).await
    }

    /// What editors did to an article entity, newest first.
    pub async fn activity(&self, article_id: Uuid) -> Result<Vec<ActivityEntry>, ContentError> {
        self.activity.history(article_id).await
    }

    pub async fn list_catalog(
        &self,
        query: &CatalogQuery,
    ) -> Result<Page<CatalogEntry>, ContentError> {
        self.catalog.list(query).await
    }

    pub async fn resync_catalog(&self, now: DateTime<Utc>) -> Result<usize, ContentError> {
        self.catalog.resync_all(now).await
    }

    /// Periodic housekeeping: stale locks, catalog drift and expired cache entries.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, ContentError> {
        let reaped_locks = self.locks.reap(now, self.locks.ttl()).await?;
        let resynced_entries = self.catalog.resync_all(now).await?;
        let purged_views = self.cache.purge_expired().await;
        Ok(SweepReport {
            reaped_locks,
            resynced_entries,
            purged_views,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::{
        repository::CatalogRepository,
        test_utils::{InMemoryStore, draft},
        translation::NoTranslator,
    };

    fn service() -> (ContentService<InMemoryStore, NoTranslator>, InMemoryStore) {
        let store = InMemoryStore::default();
        (
            ContentService::new(store.clone(), NoTranslator, ContentSettings::default()),
            store,
        )
    }

    #[tokio::test]
    async fn new_article_is_resolvable_and_listed() {
        let (service, store) = service();
        let now = Utc::now();

        let version = service.create_article(draft("hello", "Hello"), "ann", now).await.unwrap();
        assert_eq!(version.article_number, 1);
        assert_eq!(version.version_number, 1);

        let view = service
            .resolve(&UrlPath::new("Hello"), None, now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.title, "Hello");

        let entry = store.find(1).await.unwrap().unwrap();
        assert_eq!(entry.title, "Hello");

        let toc = service
            .get_children(&PathPrefix::root(), 0, 10, false, now)
            .await
            .unwrap();
        assert_eq!(toc.total_count, 1);
    }

    #[tokio::test]
    async fn invalid_article_does_not_burn_a_number() {
        let (service, _) = service();
        let mut empty = draft("x", "X");
        empty.title = String::new();

        assert_matches!(
            service.create_article(empty, "ann", Utc::now()).await,
            Err(ContentError::Validation(_))
        );
        assert_eq!(service.allocate_article_number().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn foreign_lock_blocks_version_write() {
        let (service, _) = service();
        let now = Utc::now();
        let first = service.create_article(draft("a", "A"), "ann", now).await.unwrap();

        let request = LockRequest {
            article_id: first.id.0,
            session_id: "owner".into(),
            user_identity: "owner@example.com".into(),
            editor_kind: "html".into(),
            file_path: None,
        };
        service.acquire_lock(&request, now).await.unwrap();

        let intruder = EditorSession {
            article_id: first.id.0,
            session_id: "other".into(),
        };
        assert_matches!(
            service
                .create_version(first.article_number, draft("a", "A2"), Some(&intruder), "eve", now)
                .await,
            Err(ContentError::Conflict { .. })
        );

        let owner = EditorSession {
            article_id: first.id.0,
            session_id: "owner".into(),
        };
        let second = service
            .create_version(first.article_number, draft("a", "A2"), Some(&owner), "owner@example.com", now)
            .await
            .unwrap();
        assert_eq!(second.version_number, 2);
        assert_eq!(service.list_versions(first.article_number).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn sweep_reaps_and_resyncs() {
        let (service, _) = service();
        let now = Utc::now();
        service.create_article(draft("a", "A"), "ann", now).await.unwrap();

        let request = LockRequest {
            article_id: Uuid::new_v4(),
            session_id: "gone".into(),
            user_identity: "gone@example.com".into(),
            editor_kind: "html".into(),
            file_path: None,
        };
        service
            .acquire_lock(&request, now - Duration::hours(2))
            .await
            .unwrap();

        let report = service.sweep(now).await.unwrap();
        assert_eq!(report.reaped_locks, 1);
        assert_eq!(report.resynced_entries, 1);
    }

    #[tokio::test]
    async fn lock_on_another_article_is_rejected() {
        let (service, _) = service();
        let now = Utc::now();
        let first = service.create_article(draft("a", "A"), "ann", now).await.unwrap();
        let other = service.create_article(draft("b", "B"), "ann", now).await.unwrap();

        let mismatched = EditorSession {
            article_id: other.id.0,
            session_id: "s1".into(),
        };
        assert_matches!(
            service
                .create_version(first.article_number, draft("a", "A2"), Some(&mismatched), "ann", now)
                .await,
            Err(ContentError::Validation(_))
        );
        assert_eq!(service.list_versions(first.article_number).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn edits_and_locks_leave_an_activity_trail() {
        let (service, _) = service();
        let now = Utc::now();
        let first = service.create_article(draft("a", "A"), "ann", now).await.unwrap();

        let request = LockRequest {
            article_id: first.id.0,
            session_id: "s1".into(),
            user_identity: "bob".into(),
            editor_kind: "html".into(),
            file_path: None,
        };
        service.acquire_lock(&request, now).await.unwrap();
        service
            .acquire_lock(&request, now + Duration::seconds(1))
            .await
            .unwrap();
        assert!(
            service
                .release_lock(first.id.0, "s1", now + Duration::seconds(2))
                .await
                .unwrap()
        );
        assert!(
            !service
                .release_lock(first.id.0, "s1", now + Duration::seconds(3))
                .await
                .unwrap()
        );

        let trail = service.activity(first.id.0).await.unwrap();
        let notes: Vec<(&str, &str)> = trail
            .iter()
            .map(|e| (e.user_identity.as_str(), e.notes.as_str()))
            .collect();
        assert_eq!(
            notes,
            vec![
                ("bob", "edit lock released"),
                ("bob", "edit lock acquired (html)"),
                ("ann", "new article created"),
            ]
        );
        assert_eq!(trail[2].article_title.as_deref(), Some("A"));

        let second = service
            .create_version(first.article_number, draft("a", "A2"), None, "ann", now)
            .await
            .unwrap();
        let trail = service.activity(second.id.0).await.unwrap();
        assert_eq!(trail[0].notes, "version 2 created");
    }
}
