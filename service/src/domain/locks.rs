use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{article::error::ContentError, repository::LockRepository};

/// Rounds of read-then-conditional-write before `acquire` gives up.
const ACQUIRE_ATTEMPTS: u32 = 5;

/// Advisory edit lock on one article entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditLock {
    pub id: Uuid,
    pub article_id: Uuid,
    pub session_id: String,
    pub user_identity: String,
    pub acquired_at: DateTime<Utc>,
    pub editor_kind: String,
    pub file_path: Option<String>,
}

impl EditLock {
    pub fn is_live_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.acquired_at < ttl
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRequest {
    pub article_id: Uuid,
    pub session_id: String,
    pub user_identity: String,
    pub editor_kind: String,
    pub file_path: Option<String>,
}

impl LockRequest {
    fn grant(&self, id: Uuid, acquired_at: DateTime<Utc>) -> EditLock {
        EditLock {
            id,
            article_id: self.article_id,
            session_id: self.session_id.clone(),
            user_identity: self.user_identity.clone(),
            acquired_at,
            editor_kind: self.editor_kind.clone(),
            file_path: self.file_path.clone(),
        }
    }
}

/// Grants one live lock per article.
///
/// Locks are cooperative: nothing stops a version write without one.
/// Editing flows are expected to check `holder` before saving.
#[derive(Debug, Clone)]
pub struct EditLockManager<R> {
    repository: R,
    ttl: Duration,
}

impl<R: LockRepository> EditLockManager<R> {
    pub fn new(repository: R, ttl: Duration) -> Self {
        Self { repository, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Grants the lock when it is free, expired or already held by the same
    /// session. A same-session acquire refreshes `acquired_at`.
    pub async fn acquire(
        &self,
        request: &LockRequest,
        now: DateTime<Utc>,
    ) -> Result<EditLock, ContentError> {
        // the store keeps microseconds; conditional writes compare exact values
        let now = now.trunc_subsecs(6);
        let mut last_seen = None;

        for _ in 0..ACQUIRE_ATTEMPTS {
            match self.repository.find(request.article_id).await? {
                None => {
                    let lock = request.grant(Uuid::new_v4(), now);
                    if self.repository.insert_if_absent(&lock).await? {
                        tracing::info!(article_id = %lock.article_id, session_id = %lock.session_id, "edit lock acquired");
                        return Ok(lock);
                    }
                }
                Some(existing) => {
                    let same_session = existing.session_id == request.session_id;
                    if !same_session && existing.is_live_at(now, self.ttl) {
                        return Err(ContentError::Conflict {
                            held_by: existing.user_identity,
                            since: existing.acquired_at,
                        });
                    }

                    let id = if same_session {
                        existing.id
                    } else {
                        Uuid::new_v4()
                    };
                    let lock = request.grant(id, now);
                    if self.repository.replace_if(&existing, &lock).await? {
                        if !same_session {
                            tracing::info!(
                                article_id = %lock.article_id,
                                session_id = %lock.session_id,
                                previous = %existing.session_id,
                                "took over expired edit lock"
                            );
                        }
                        return Ok(lock);
                    }
                    last_seen = Some(existing);
                }
            }
        }

        match last_seen {
            Some(holder) => Err(ContentError::Conflict {
                held_by: holder.user_identity,
                since: holder.acquired_at,
            }),
            None => Err(ContentError::AllocationFailed {
                counter: format!("lock:{}", request.article_id),
                attempts: ACQUIRE_ATTEMPTS,
            }),
        }
    }

    /// Removes the lock if `session_id` owns it. Releasing twice is fine.
    pub async fn release(&self, article_id: Uuid, session_id: &str) -> Result<bool, ContentError> {
        let released = self.repository.delete_owned(article_id, session_id).await?;
        if released {
            tracing::info!(%article_id, session_id, "edit lock released");
        }
        Ok(released)
    }

    /// Removes locks older than `ttl`. A lock refreshed after it was read
    /// here survives, because the delete is keyed on the observed `acquired_at`.
    pub async fn reap(&self, now: DateTime<Utc>, ttl: Duration) -> Result<usize, ContentError> {
        let stale = self.repository.list_acquired_before(now - ttl).await?;

        let mut removed = 0;
        for lock in stale {
            if self
                .repository
                .delete_if_unchanged(lock.article_id, lock.acquired_at)
                .await?
            {
                tracing::debug!(article_id = %lock.article_id, session_id = %lock.session_id, "reaped stale edit lock");
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// The lock row `session_id` holds on an article, live or not.
    pub async fn owned_by(
        &self,
        article_id: Uuid,
        session_id: &str,
    ) -> Result<Option<EditLock>, ContentError> {
        Ok(self
            .repository
            .find(article_id)
            .await?
            .filter(|lock| lock.session_id == session_id))
    }

    /// The live lock on an article, if any.
    pub async fn holder(
        &self,
        article_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<EditLock>, ContentError> {
        Ok(self
            .repository
            .find(article_id)
            .await?
            .filter(|lock| lock.is_live_at(now, self.ttl)))
    }
}
