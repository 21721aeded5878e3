use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::domain::{repository::ContentStore, service::ContentService, translation::Translator};

/// Housekeeping loop: reaps stale edit locks, repairs catalog drift and drops
/// expired cache entries. Runs until `cancel` is triggered.
pub async fn run<S: ContentStore, T: Translator>(
    content: Arc<ContentService<S, T>>,
    every: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = every.as_secs(), "content sweeper started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("content sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                match content.sweep(Utc::now()).await {
                    Ok(report) => {
                        tracing::debug!(
                            reaped_locks = report.reaped_locks,
                            resynced = report.resynced_entries,
                            purged_views = report.purged_views,
                            "sweep finished"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "sweep failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        locks::LockRequest,
        service::ContentSettings,
        test_utils::InMemoryStore,
        translation::NoTranslator,
    };

    #[tokio::test]
    async fn sweeps_until_cancelled() {
        let store = InMemoryStore::default();
        let content = Arc::new(ContentService::new(
            store,
            NoTranslator,
            ContentSettings::default(),
        ));
        let article_id = uuid::Uuid::new_v4();
        let request = LockRequest {
            article_id,
            session_id: "gone".into(),
            user_identity: "gone@example.com".into(),
            editor_kind: "html".into(),
            file_path: None,
        };
        content
            .acquire_lock(&request, Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(content.clone(), Duration::from_millis(10), cancel.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        task.await.unwrap();

        assert!(content.lock_holder(article_id, Utc::now()).await.unwrap().is_none());
        assert!(!content.release_lock(article_id, "gone", Utc::now()).await.unwrap());
    }
}
