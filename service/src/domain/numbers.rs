use std::time::Duration;

use crate::domain::{article::error::ContentError, repository::CounterRepository};

pub const ARTICLE_NUMBER_COUNTER: &str = "article_number";

/// Counter holding the last version number issued for an article.
pub fn version_counter(article_number: i32) -> String {
    format!("article:{article_number}:version")
}

/// Bounded optimistic retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 8,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
            ..Self::default()
        }
    }

    pub(crate) fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Reads the counter and writes its successor conditionally, retrying lost races.
pub(crate) async fn increment<R: CounterRepository>(
    repository: &R,
    key: &str,
    policy: &RetryPolicy,
) -> Result<i32, ContentError> {
    for attempt in 0..policy.attempts {
        let current = repository.current(key).await?;
        let next = current.unwrap_or(0) + 1;
        if repository.compare_and_set(key, current, next).await? {
            return Ok(next);
        }
        tracing::debug!(key, attempt, "counter changed underneath, retrying");
        tokio::time::sleep(policy.delay(attempt)).await;
    }

    tracing::warn!(key, attempts = policy.attempts, "counter allocation gave up");
    Err(ContentError::AllocationFailed {
        counter: key.to_owned(),
        attempts: policy.attempts,
    })
}

/// Issues article numbers from a counter kept in the store, so every
/// service instance draws from the same sequence.
#[derive(Debug, Clone)]
pub struct ArticleNumberAllocator<R> {
    repository: R,
    policy: RetryPolicy,
}

impl<R: CounterRepository> ArticleNumberAllocator<R> {
    pub fn new(repository: R, policy: RetryPolicy) -> Self {
        Self { repository, policy }
    }

    pub async fn allocate(&self) -> Result<i32, ContentError> {
        let number = increment(&self.repository, ARTICLE_NUMBER_COUNTER, &self.policy).await?;
        tracing::info!(article_number = number, "allocated article number");
        Ok(number)
    }

    pub async fn is_allocated(&self, article_number: i32) -> Result<bool, ContentError> {
        let last = self.repository.current(ARTICLE_NUMBER_COUNTER).await?;
        Ok(article_number >= 1 && last.is_some_and(|last| article_number <= last))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assert_matches::assert_matches;
    use tokio::task::JoinSet;

    use super::*;
    use crate::domain::test_utils::{ContendedCounters, InMemoryStore, patient_retry};

    #[tokio::test]
    async fn numbers_start_at_one_and_increase() {
        let allocator = ArticleNumberAllocator::new(InMemoryStore::default(), RetryPolicy::default());
        assert_eq!(allocator.allocate().await.unwrap(), 1);
        assert_eq!(allocator.allocate().await.unwrap(), 2);
        assert!(allocator.is_allocated(2).await.unwrap());
        assert!(!allocator.is_allocated(3).await.unwrap());
        assert!(!allocator.is_allocated(0).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_never_share_a_number() {
        let allocator = ArticleNumberAllocator::new(InMemoryStore::default(), patient_retry());

        let mut tasks = JoinSet::new();
        for _ in 0..32 {
            let allocator = allocator.clone();
            tasks.spawn(async move { allocator.allocate().await });
        }

        let mut issued = HashSet::new();
        while let Some(result) = tasks.join_next().await {
            assert!(issued.insert(result.unwrap().unwrap()));
        }
        assert_eq!(issued, (1..=32).collect::<HashSet<_>>());
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let allocator = ArticleNumberAllocator::new(
            ContendedCounters,
            RetryPolicy {
                attempts: 3,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
            },
        );

        assert_matches!(
            allocator.allocate().await,
            Err(ContentError::AllocationFailed { attempts: 3, .. })
        );
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_millis(5));
        assert_eq!(policy.delay(2), Duration::from_millis(20));
        assert_eq!(policy.delay(40), Duration::from_millis(200));
    }
}
