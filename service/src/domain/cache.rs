use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::RwLock, time::Instant};

use crate::domain::{
    article::path::UrlPath,
    resolver::{ResolvedLayout, ResolvedView},
};

/// Cache key of a resolved page. An empty language code means untranslated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub url_path: UrlPath,
    pub language_code: String,
}

impl ViewKey {
    pub fn new(url_path: UrlPath, language_code: Option<&str>) -> Self {
        Self {
            url_path,
            language_code: language_code.unwrap_or_default().to_owned(),
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V: Clone> Entry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn live(&self, now: Instant) -> Option<V> {
        (self.expires_at > now).then(|| self.value.clone())
    }
}

/// TTL cache of resolved pages and the default layout.
///
/// Entries are only ever replaced whole, so a reader sees either the old
/// or the new snapshot. Writes to content do not invalidate anything: an
/// edited page keeps being served until its entry expires.
#[derive(Debug, Default)]
pub struct ViewCache {
    views: RwLock<HashMap<ViewKey, Entry<Arc<ResolvedView>>>>,
    layout: RwLock<Option<Entry<Arc<ResolvedLayout>>>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_view(&self, key: &ViewKey) -> Option<Arc<ResolvedView>> {
        let views = self.views.read().await;
        let view = views.get(key).and_then(|entry| entry.live(Instant::now()));
        if view.is_some() {
            tracing::debug!(url_path = %key.url_path, lang = %key.language_code, "view cache hit");
        }
        view
    }

    pub async fn set_view(&self, key: ViewKey, view: Arc<ResolvedView>, ttl: Duration) {
        self.views.write().await.insert(key, Entry::new(view, ttl));
    }

    pub async fn get_layout(&self) -> Option<Arc<ResolvedLayout>> {
        self.layout
            .read()
            .await
            .as_ref()
            .and_then(|entry| entry.live(Instant::now()))
    }

    pub async fn set_layout(&self, layout: Arc<ResolvedLayout>, ttl: Duration) {
        *self.layout.write().await = Some(Entry::new(layout, ttl));
    }

    /// Drops expired entries. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut views = self.views.write().await;
        let before = views.len();
        views.retain(|_, entry| entry.expires_at > now);
        let mut removed = before - views.len();
        drop(views);

        let mut layout = self.layout.write().await;
        if layout.as_ref().is_some_and(|entry| entry.expires_at <= now) {
            *layout = None;
            removed += 1;
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.views.read().await.len()
    }
}
