use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    activity::ActivityEntry,
    article::{
        Version,
        path::{PathPrefix, UrlPath},
    },
    catalog::CatalogEntry,
    locks::EditLock,
    repository::query::CatalogQuery,
    resolver::ResolvedLayout,
};

pub mod query;

/// Named integer counters with conditional writes.
pub trait CounterRepository: Send + Sync + 'static {
    /// Current value, `None` when the counter was never written
    fn current(&self, key: &str)
    -> impl Future<Output = Result<Option<i32>, RepositoryError>> + Send;

    /// Store `value` only if the counter still holds `expected` (`None` = absent).
    /// Returns false when another writer got there first.
    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<i32>,
        value: i32,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Append-only version history.
pub trait VersionRepository: Send + Sync + 'static {
    /// Moves `counter` from `expected` to `version.version_number` and stores
    /// the version in one transaction. Returns false, writing nothing, when the
    /// counter no longer holds `expected`.
    fn append(
        &self,
        counter: &str,
        expected: Option<i32>,
        version: &Version,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Highest version number visible at `at` for the path
    fn find_published(
        &self,
        url_path: &UrlPath,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Version>, RepositoryError>> + Send;

    /// Highest version number for the path, whatever its visibility
    fn find_latest(
        &self,
        url_path: &UrlPath,
    ) -> impl Future<Output = Result<Option<Version>, RepositoryError>> + Send;

    /// All versions of an article, ascending by version number
    fn list_by_article(
        &self,
        article_number: i32,
    ) -> impl Future<Output = Result<Vec<Version>, RepositoryError>> + Send;

    /// Every article number that has at least one version
    fn article_numbers(&self) -> impl Future<Output = Result<Vec<i32>, RepositoryError>> + Send;

    /// Newest visible version of each article at `at`, kept only when its
    /// path lies below `prefix`
    fn visible_under(
        &self,
        prefix: &PathPrefix,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<PublishedPath>, RepositoryError>> + Send;
}

pub trait CatalogRepository: Send + Sync + 'static {
    fn upsert(&self, entry: &CatalogEntry)
    -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn find(
        &self,
        article_number: i32,
    ) -> impl Future<Output = Result<Option<CatalogEntry>, RepositoryError>> + Send;

    /// Matching page and the total count before pagination
    fn list(
        &self,
        query: &CatalogQuery,
    ) -> impl Future<Output = Result<(Vec<CatalogEntry>, u64), RepositoryError>> + Send;
}

/// Edit lock rows. Every write is conditional on what the caller last observed.
pub trait LockRepository: Send + Sync + 'static {
    fn find(
        &self,
        article_id: Uuid,
    ) -> impl Future<Output = Result<Option<EditLock>, RepositoryError>> + Send;

    /// Returns false when a lock row for the article already exists
    fn insert_if_absent(
        &self,
        lock: &EditLock,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Overwrite `observed` with `lock` unless it changed in the meantime
    fn replace_if(
        &self,
        observed: &EditLock,
        lock: &EditLock,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn delete_owned(
        &self,
        article_id: Uuid,
        session_id: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete only while `acquired_at` still equals the observed value
    fn delete_if_unchanged(
        &self,
        article_id: Uuid,
        observed_acquired_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn list_acquired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<EditLock>, RepositoryError>> + Send;
}

pub trait LayoutRepository: Send + Sync + 'static {
    fn default_layout(
        &self,
    ) -> impl Future<Output = Result<Option<ResolvedLayout>, RepositoryError>> + Send;
}

/// Editor activity trail, append only.
pub trait LogRepository: Send + Sync + 'static {
    fn append_log(
        &self,
        entry: &ActivityEntry,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Entries for one article, newest first
    fn list_for_article(
        &self,
        article_id: Uuid,
    ) -> impl Future<Output = Result<Vec<ActivityEntry>, RepositoryError>> + Send;
}

/// Every port the content core needs from one store.
pub trait ContentStore:
    CounterRepository
    + VersionRepository
    + CatalogRepository
    + LockRepository
    + LayoutRepository
    + LogRepository
    + Clone
{
}

impl<T> ContentStore for T where
    T: CounterRepository
        + VersionRepository
        + CatalogRepository
        + LockRepository
        + LayoutRepository
        + LogRepository
        + Clone
{
}

/// Slim projection of a visible version used by the table of contents.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedPath {
    pub article_number: i32,
    pub version_number: i32,
    pub url_path: UrlPath,
    pub title: String,
    pub published: Option<DateTime<Utc>>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    DatabaseError(String),
}
