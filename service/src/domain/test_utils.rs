use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    activity::ActivityEntry,
    article::{
        ArticleContent, NewVersion, Version, VersionStatus,
        lifecycle::PublicationWindow,
        path::{PathPrefix, UrlPath},
    },
    catalog::CatalogEntry,
    locks::EditLock,
    numbers::RetryPolicy,
    repository::{
        CatalogRepository, CounterRepository, LayoutRepository, LockRepository, LogRepository,
        PublishedPath, RepositoryError, VersionRepository,
        query::{CatalogFilter, CatalogQuery, CatalogSortField, SortDirection},
    },
    resolver::{CACHE_DURATION_SECONDS, ResolvedLayout, ResolvedView},
    translation::{SupportedLanguage, TranslationError, Translator},
};

#[derive(Debug, Default)]
struct Tables {
    counters: HashMap<String, i32>,
    versions: Vec<Version>,
    catalog: HashMap<i32, CatalogEntry>,
    locks: HashMap<Uuid, EditLock>,
    layout: Option<ResolvedLayout>,
    logs: Vec<ActivityEntry>,
    failing_appends: u32,
    failing_log_writes: u32,
}

/// Store keeping everything in memory, with the same conditional write
/// semantics as the database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    fn with<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        let mut tables = self.tables.lock().unwrap();
        f(&mut tables)
    }

    pub fn put_layout(&self, layout: ResolvedLayout) {
        self.with(|tables| tables.layout = Some(layout));
    }

    /// The next `count` version appends fail as a database error would.
    pub fn fail_next_appends(&self, count: u32) {
        self.with(|tables| tables.failing_appends = count);
    }

    pub fn fail_next_log_writes(&self, count: u32) {
        self.with(|tables| tables.failing_log_writes = count);
    }
}

impl CounterRepository for InMemoryStore {
    async fn current(&self, key: &str) -> Result<Option<i32>, RepositoryError> {
        Ok(self.with(|tables| tables.counters.get(key).copied()))
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<i32>,
        value: i32,
    ) -> Result<bool, RepositoryError> {
        // yield so that concurrent callers actually interleave
        tokio::task::yield_now().await;
        Ok(self.with(|tables| {
            if tables.counters.get(key).copied() != expected {
                return false;
            }
            tables.counters.insert(key.to_owned(), value);
            true
        }))
    }
}

impl VersionRepository for InMemoryStore {
    async fn append(
        &self,
        counter: &str,
        expected: Option<i32>,
        version: &Version,
    ) -> Result<bool, RepositoryError> {
        tokio::task::yield_now().await;
        self.with(|tables| {
            if tables.counters.get(counter).copied() != expected {
                return Ok(false);
            }
            let taken = tables.versions.iter().any(|v| {
                v.article_number == version.article_number
                    && v.version_number == version.version_number
            });
            if taken {
                return Err(RepositoryError::UniqueViolation(format!(
                    "{}/{}",
                    version.article_number, version.version_number
                )));
            }
            if tables.failing_appends > 0 {
                tables.failing_appends -= 1;
                return Err(RepositoryError::DatabaseError("connection reset".into()));
            }
            tables.counters.insert(counter.to_owned(), version.version_number);
            tables.versions.push(version.clone());
            Ok(true)
        })
    }

    async fn find_published(
        &self,
        url_path: &UrlPath,
        at: DateTime<Utc>,
    ) -> Result<Option<Version>, RepositoryError> {
        Ok(self.with(|tables| {
            tables
                .versions
                .iter()
                .filter(|v| &v.url_path == url_path && v.is_visible_at(at))
                .max_by_key(|v| (v.version_number, v.article_number))
                .cloned()
        }))
    }

    async fn find_latest(&self, url_path: &UrlPath) -> Result<Option<Version>, RepositoryError> {
        Ok(self.with(|tables| {
            tables
                .versions
                .iter()
                .filter(|v| &v.url_path == url_path)
                .max_by_key(|v| (v.version_number, v.article_number))
                .cloned()
        }))
    }

    async fn list_by_article(&self, article_number: i32) -> Result<Vec<Version>, RepositoryError> {
        Ok(self.with(|tables| {
            let mut versions: Vec<Version> = tables
                .versions
                .iter()
                .filter(|v| v.article_number == article_number)
                .cloned()
                .collect();
            versions.sort_by_key(|v| v.version_number);
            versions
        }))
    }

    async fn article_numbers(&self) -> Result<Vec<i32>, RepositoryError> {
        Ok(self.with(|tables| {
            let mut numbers: Vec<i32> = tables.versions.iter().map(|v| v.article_number).collect();
            numbers.sort_unstable();
            numbers.dedup();
            numbers
        }))
    }

    async fn visible_under(
        &self,
        prefix: &PathPrefix,
        at: DateTime<Utc>,
    ) -> Result<Vec<PublishedPath>, RepositoryError> {
        let start = prefix.descendant_start();
        Ok(self.with(|tables| {
            let mut current: HashMap<i32, &Version> = HashMap::new();
            for version in tables.versions.iter().filter(|v| v.is_visible_at(at)) {
                current
                    .entry(version.article_number)
                    .and_modify(|newest| {
                        if version.version_number > newest.version_number {
                            *newest = version;
                        }
                    })
                    .or_insert(version);
            }
            current
                .into_values()
                .filter(|v| v.url_path.as_ref().starts_with(&start))
                .map(|v| PublishedPath {
                    article_number: v.article_number,
                    version_number: v.version_number,
                    url_path: v.url_path.clone(),
                    title: v.title.clone(),
                    published: v.window.published,
                    updated: v.updated,
                })
                .collect()
        }))
    }
}

fn matches(filter: &CatalogFilter, entry: &CatalogEntry) -> bool {
    match filter {
        CatalogFilter::All => true,
        CatalogFilter::TitleContains(text) => entry
            .title
            .to_lowercase()
            .contains(&text.to_lowercase()),
        CatalogFilter::StatusIs(status) => entry.status == *status,
        CatalogFilter::PathStartsWith(start) => entry.url_path.as_ref().starts_with(start.as_str()),
        CatalogFilter::And(left, right) => matches(left, entry) && matches(right, entry),
    }
}

impl CatalogRepository for InMemoryStore {
    async fn upsert(&self, entry: &CatalogEntry) -> Result<(), RepositoryError> {
        self.with(|tables| tables.catalog.insert(entry.article_number, entry.clone()));
        Ok(())
    }

    async fn find(&self, article_number: i32) -> Result<Option<CatalogEntry>, RepositoryError> {
        Ok(self.with(|tables| tables.catalog.get(&article_number).cloned()))
    }

    async fn list(
        &self,
        query: &CatalogQuery,
    ) -> Result<(Vec<CatalogEntry>, u64), RepositoryError> {
        let mut entries: Vec<CatalogEntry> = self.with(|tables| {
            tables
                .catalog
                .values()
                .filter(|entry| matches(&query.filter, entry))
                .cloned()
                .collect()
        });

        entries.sort_by(|a, b| {
            query
                .sort
                .iter()
                .map(|(field, direction)| {
                    let ordering = match field {
                        CatalogSortField::Title => a.title.cmp(&b.title),
                        CatalogSortField::Updated => a.updated.cmp(&b.updated),
                        CatalogSortField::Published => a.published.cmp(&b.published),
                        CatalogSortField::ArticleNumber => a.article_number.cmp(&b.article_number),
                    };
                    match direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                })
                .fold(std::cmp::Ordering::Equal, std::cmp::Ordering::then)
                .then(a.article_number.cmp(&b.article_number))
        });

        let total = entries.len() as u64;
        let page = entries
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();
        Ok((page, total))
    }
}

impl LockRepository for InMemoryStore {
    async fn find(&self, article_id: Uuid) -> Result<Option<EditLock>, RepositoryError> {
        Ok(self.with(|tables| tables.locks.get(&article_id).cloned()))
    }

    async fn insert_if_absent(&self, lock: &EditLock) -> Result<bool, RepositoryError> {
        tokio::task::yield_now().await;
        Ok(self.with(|tables| {
            if tables.locks.contains_key(&lock.article_id) {
                return false;
            }
            tables.locks.insert(lock.article_id, lock.clone());
            true
        }))
    }

    async fn replace_if(
        &self,
        observed: &EditLock,
        lock: &EditLock,
    ) -> Result<bool, RepositoryError> {
        tokio::task::yield_now().await;
        Ok(self.with(|tables| match tables.locks.get(&observed.article_id) {
            Some(current)
                if current.id == observed.id && current.acquired_at == observed.acquired_at =>
            {
                tables.locks.insert(lock.article_id, lock.clone());
                true
            }
            _ => false,
        }))
    }

    async fn delete_owned(&self, article_id: Uuid, session_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.with(|tables| {
            let owned = tables
                .locks
                .get(&article_id)
                .is_some_and(|lock| lock.session_id == session_id);
            owned && tables.locks.remove(&article_id).is_some()
        }))
    }

    async fn delete_if_unchanged(
        &self,
        article_id: Uuid,
        observed_acquired_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        Ok(self.with(|tables| {
            let unchanged = tables
                .locks
                .get(&article_id)
                .is_some_and(|lock| lock.acquired_at == observed_acquired_at);
            unchanged && tables.locks.remove(&article_id).is_some()
        }))
    }

    async fn list_acquired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<EditLock>, RepositoryError> {
        Ok(self.with(|tables| {
            tables
                .locks
                .values()
                .filter(|lock| lock.acquired_at < cutoff)
                .cloned()
                .collect()
        }))
    }
}

impl LayoutRepository for InMemoryStore {
    async fn default_layout(&self) -> Result<Option<ResolvedLayout>, RepositoryError> {
        Ok(self.with(|tables| tables.layout.clone()))
    }
}

impl LogRepository for InMemoryStore {
    async fn append_log(&self, entry: &ActivityEntry) -> Result<(), RepositoryError> {
        self.with(|tables| {
            if tables.failing_log_writes > 0 {
                tables.failing_log_writes -= 1;
                return Err(RepositoryError::DatabaseError("connection reset".into()));
            }
            tables.logs.push(entry.clone());
            Ok(())
        })
    }

    async fn list_for_article(&self, article_id: Uuid) -> Result<Vec<ActivityEntry>, RepositoryError> {
        Ok(self.with(|tables| {
            let mut entries: Vec<ActivityEntry> = tables
                .logs
                .iter()
                .rev()
                .filter(|entry| entry.article_id == article_id)
                .cloned()
                .collect();
            entries.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
            entries
        }))
    }
}

/// Counters where every conditional write loses.
#[derive(Debug, Clone, Copy)]
pub struct ContendedCounters;

impl CounterRepository for ContendedCounters {
    async fn current(&self, _key: &str) -> Result<Option<i32>, RepositoryError> {
        Ok(Some(1))
    }

    async fn compare_and_set(
        &self,
        _key: &str,
        _expected: Option<i32>,
        _value: i32,
    ) -> Result<bool, RepositoryError> {
        Ok(false)
    }
}

/// Enough retries for heavily contended tests.
pub fn patient_retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 1_000,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
    }
}

/// Active content published an hour ago.
pub fn draft(path: &str, title: &str) -> NewVersion {
    NewVersion {
        url_path: UrlPath::new(path),
        title: title.to_owned(),
        content: format!("<p>{title}</p>"),
        header_script: None,
        footer_script: None,
        status: VersionStatus::Active,
        role_list: String::new(),
        window: PublicationWindow::new(Some(Utc::now() - chrono::Duration::hours(1)), None),
    }
}

pub fn view(path: &str, title: &str) -> ResolvedView {
    ResolvedView {
        article_number: 1,
        version_number: Some(1),
        language_code: "en-US".into(),
        language_name: "US English".into(),
        url_path: UrlPath::new(path),
        title: title.to_owned(),
        content: format!("<p>{title}</p>"),
        head_script: None,
        foot_script: None,
        layout: None,
        role_list: String::new(),
        status: VersionStatus::Active,
        published: Some(Utc::now()),
        expires: None,
        updated: Utc::now(),
        cache_duration: CACHE_DURATION_SECONDS,
    }
}

pub fn layout(name: &str) -> ResolvedLayout {
    ResolvedLayout {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        head: Some("<meta charset=\"utf-8\">".into()),
        body_html_attributes: None,
        html_header: None,
        footer_html_content: None,
    }
}

/// Prefixes every text with the target language and knows a few language names.
#[derive(Debug, Clone)]
pub struct StaticTranslator {
    languages: Vec<SupportedLanguage>,
}

impl Default for StaticTranslator {
    fn default() -> Self {
        let languages = [("fr", "French"), ("de", "German"), ("en-US", "US English")]
            .into_iter()
            .map(|(code, name)| SupportedLanguage {
                code: code.into(),
                display_name: name.into(),
            })
            .collect();
        Self { languages }
    }
}

impl Translator for StaticTranslator {
    fn is_configured(&self) -> bool {
        true
    }

    async fn translate(
        &self,
        target: &str,
        _source: &str,
        texts: &[String],
    ) -> Result<Vec<String>, TranslationError> {
        Ok(texts.iter().map(|text| format!("[{target}] {text}")).collect())
    }

    async fn supported_languages(
        &self,
        _display_language: &str,
    ) -> Result<Vec<SupportedLanguage>, TranslationError> {
        Ok(self.languages.clone())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FailingTranslator;

impl Translator for FailingTranslator {
    fn is_configured(&self) -> bool {
        true
    }

    async fn translate(
        &self,
        _target: &str,
        _source: &str,
        _texts: &[String],
    ) -> Result<Vec<String>, TranslationError> {
        Err(TranslationError::Request("service unavailable".into()))
    }

    async fn supported_languages(
        &self,
        _display_language: &str,
    ) -> Result<Vec<SupportedLanguage>, TranslationError> {
        Err(TranslationError::Request("service unavailable".into()))
    }
}

/// Answers long after any sensible timeout.
#[derive(Debug, Clone, Copy)]
pub struct SlowTranslator;

impl Translator for SlowTranslator {
    fn is_configured(&self) -> bool {
        true
    }

    async fn translate(
        &self,
        _target: &str,
        _source: &str,
        texts: &[String],
    ) -> Result<Vec<String>, TranslationError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(texts.to_vec())
    }

    async fn supported_languages(
        &self,
        _display_language: &str,
    ) -> Result<Vec<SupportedLanguage>, TranslationError> {
        Ok(Vec::new())
    }
}
