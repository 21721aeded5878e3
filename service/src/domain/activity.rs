use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{article::error::ContentError, repository::LogRepository};

/// Something an editor did to an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_identity: String,
    pub article_id: Uuid,
    pub article_title: Option<String>,
    pub notes: String,
    pub logged_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        user_identity: &str,
        article_id: Uuid,
        article_title: Option<&str>,
        notes: impl Into<String>,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_identity: user_identity.to_owned(),
            article_id,
            article_title: article_title.map(str::to_owned),
            notes: notes.into(),
            logged_at,
        }
    }
}

/// Audit trail of editor actions.
///
/// Recording never fails the action it describes; a lost entry is logged.
#[derive(Debug, Clone)]
pub struct ActivityLog<R> {
    repository: R,
}

impl<R: LogRepository> ActivityLog<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn record(&self, entry: ActivityEntry) {
        if let Err(error) = self.repository.append_log(&entry).await {
            tracing::error!(
                article_id = %entry.article_id,
                notes = entry.notes,
                %error,
                "activity entry lost"
            );
        }
    }

    /// Newest first
    pub async fn history(&self, article_id: Uuid) -> Result<Vec<ActivityEntry>, ContentError> {
        Ok(self.repository.list_for_article(article_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::test_utils::InMemoryStore;

    #[tokio::test]
    async fn history_is_newest_first_and_per_article() {
        let log = ActivityLog::new(InMemoryStore::default());
        let article = Uuid::new_v4();
        let now = Utc::now();

        log.record(ActivityEntry::new("ann", article, Some("A"), "first", now - Duration::minutes(5)))
            .await;
        log.record(ActivityEntry::new("bob", article, None, "second", now)).await;
        log.record(ActivityEntry::new("ann", Uuid::new_v4(), None, "elsewhere", now))
            .await;

        let history = log.history(article).await.unwrap();
        let notes: Vec<&str> = history.iter().map(|e| e.notes.as_str()).collect();
        assert_eq!(notes, vec!["second", "first"]);
        assert_eq!(history[1].article_title.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn failed_write_is_swallowed() {
        let store = InMemoryStore::default();
        store.fail_next_log_writes(1);
        let log = ActivityLog::new(store);
        let article = Uuid::new_v4();

        log.record(ActivityEntry::new("ann", article, None, "lost", Utc::now()))
            .await;
        log.record(ActivityEntry::new("ann", article, None, "kept", Utc::now()))
            .await;

        let history = log.history(article).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].notes, "kept");
    }
}
