use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    article::{
        ArticleContent, NewVersion, VersionStatus,
        error::ContentError,
        lifecycle::PublicationWindow,
        path::{LanguageCode, UrlPath},
    },
    cache::{ViewCache, ViewKey},
    repository::{CounterRepository, LayoutRepository, VersionRepository},
    translation::Translator,
    versions::VersionStore,
};

/// Seconds a client may cache a resolved page.
pub const CACHE_DURATION_SECONDS: u32 = 10;

/// The site's default layout document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLayout {
    pub id: Uuid,
    pub name: String,
    pub head: Option<String>,
    pub body_html_attributes: Option<String>,
    pub html_header: Option<String>,
    pub footer_html_content: Option<String>,
}

/// A page ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedView {
    pub article_number: i32,
    /// `None` for previews of unsaved content
    pub version_number: Option<i32>,
    pub language_code: String,
    pub language_name: String,
    pub url_path: UrlPath,
    pub title: String,
    pub content: String,
    pub head_script: Option<String>,
    pub foot_script: Option<String>,
    pub layout: Option<ResolvedLayout>,
    pub role_list: String,
    pub status: VersionStatus,
    pub published: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub updated: DateTime<Utc>,
    pub cache_duration: u32,
}

impl ResolvedView {
    pub fn is_visible_at(&self, at: DateTime<Utc>) -> bool {
        self.status == VersionStatus::Active
            && PublicationWindow::new(self.published, self.expires).is_open_at(at)
    }
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub primary_language: String,
    pub primary_language_name: String,
    pub translation_timeout: Duration,
    pub view_ttl: Duration,
    pub layout_ttl: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            primary_language: "en-US".into(),
            primary_language_name: "US English".into(),
            translation_timeout: Duration::from_secs(5),
            view_ttl: Duration::from_secs(CACHE_DURATION_SECONDS as u64),
            layout_ttl: Duration::from_secs(60),
        }
    }
}

struct Translated {
    title: String,
    content: String,
    language_code: String,
    language_name: String,
}

/// Where a view came from, beyond its renderable content.
struct Origin<'a> {
    article_number: i32,
    version_number: Option<i32>,
    url_path: &'a UrlPath,
    updated: DateTime<Utc>,
}

/// Turns a url path into the page visible right now, going through the view cache.
#[derive(Debug, Clone)]
pub struct PublicationResolver<R, T> {
    versions: VersionStore<R>,
    layouts: R,
    translator: T,
    cache: Arc<ViewCache>,
    settings: ResolverSettings,
}

impl<R, T> PublicationResolver<R, T>
where
    R: CounterRepository + VersionRepository + LayoutRepository + Clone,
    T: Translator,
{
    pub fn new(
        versions: VersionStore<R>,
        layouts: R,
        translator: T,
        cache: Arc<ViewCache>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            versions,
            layouts,
            translator,
            cache,
            settings,
        }
    }

    /// The published page at `url_path`, translated when `language` asks for it.
    /// `None` when nothing is visible there.
    pub async fn resolve(
        &self,
        url_path: &UrlPath,
        language: Option<&LanguageCode>,
        now: DateTime<Utc>,
    ) -> Result<Option<Arc<ResolvedView>>, ContentError> {
        let key = ViewKey::new(url_path.clone(), language.map(|code| code.as_ref()));
        if let Some(view) = self.cache.get_view(&key).await {
            if view.is_visible_at(now) {
                return Ok(Some(view));
            }
        }

        let Some(version) = self.versions.get_published(url_path, now).await? else {
            tracing::debug!(%url_path, "no published version");
            return Ok(None);
        };

        let origin = Origin {
            article_number: version.article_number,
            version_number: Some(version.version_number),
            url_path: &version.url_path,
            updated: version.updated,
        };
        let view = Arc::new(self.assemble(&version, origin, language).await?);
        let ttl = self.view_ttl(&view, now);
        if !ttl.is_zero() {
            self.cache.set_view(key, view.clone(), ttl).await;
        }
        Ok(Some(view))
    }

    /// A cached view must not outlive its publication window.
    fn view_ttl(&self, view: &ResolvedView, now: DateTime<Utc>) -> Duration {
        match view.expires.map(|expires| (expires - now).to_std()) {
            None => self.settings.view_ttl,
            Some(Ok(remaining)) => remaining.min(self.settings.view_ttl),
            Some(Err(_)) => Duration::ZERO,
        }
    }

    /// Renders unsaved content exactly as a stored version would be. Never cached.
    pub async fn preview(
        &self,
        article_number: i32,
        draft: &NewVersion,
        language: Option<&LanguageCode>,
        now: DateTime<Utc>,
    ) -> Result<ResolvedView, ContentError> {
        draft.validate()?;
        let origin = Origin {
            article_number,
            version_number: None,
            url_path: &draft.url_path,
            updated: now,
        };
        self.assemble(draft, origin, language).await
    }

    async fn assemble(
        &self,
        article: &impl ArticleContent,
        origin: Origin<'_>,
        language: Option<&LanguageCode>,
    ) -> Result<ResolvedView, ContentError> {
        let translated = self
            .translate(article.title(), article.content(), language)
            .await;
        let layout = self.default_layout().await?;
        let window = article.window();

        Ok(ResolvedView {
            article_number: origin.article_number,
            version_number: origin.version_number,
            language_code: translated.language_code,
            language_name: translated.language_name,
            url_path: origin.url_path.clone(),
            title: translated.title,
            content: translated.content,
            head_script: article.header_script().map(str::to_owned),
            foot_script: article.footer_script().map(str::to_owned),
            layout: layout.as_deref().cloned(),
            role_list: article.role_list().to_owned(),
            status: article.status(),
            published: window.published,
            expires: window.expires,
            updated: origin.updated,
            cache_duration: CACHE_DURATION_SECONDS,
        })
    }

    // Translation problems only ever cost the translation, never the page.
    async fn translate(
        &self,
        title: &str,
        content: &str,
        language: Option<&LanguageCode>,
    ) -> Translated {
        let untranslated = Translated {
            title: title.to_owned(),
            content: content.to_owned(),
            language_code: self.settings.primary_language.clone(),
            language_name: self.settings.primary_language_name.clone(),
        };

        let Some(target) = language else {
            return untranslated;
        };
        if target.same_language(&self.settings.primary_language) || !self.translator.is_configured()
        {
            return untranslated;
        }

        let texts = [title.to_owned(), content.to_owned()];
        let translated = tokio::time::timeout(
            self.settings.translation_timeout,
            self.translator
                .translate(target.as_ref(), &self.settings.primary_language, &texts),
        )
        .await;

        let [title, content] = match translated {
            Ok(Ok(texts)) => match <[String; 2]>::try_from(texts) {
                Ok(pair) => pair,
                Err(texts) => {
                    tracing::warn!(lang = %target, returned = texts.len(), "translator returned unexpected text count");
                    return untranslated;
                }
            },
            Ok(Err(error)) => {
                tracing::warn!(lang = %target, %error, "translation failed, serving original");
                return untranslated;
            }
            Err(_) => {
                tracing::warn!(lang = %target, "translation timed out, serving original");
                return untranslated;
            }
        };

        Translated {
            title,
            content,
            language_code: target.to_string(),
            language_name: self.language_name(target).await,
        }
    }

    async fn language_name(&self, code: &LanguageCode) -> String {
        let languages = tokio::time::timeout(
            self.settings.translation_timeout,
            self.translator.supported_languages(code.as_ref()),
        )
        .await;

        match languages {
            Ok(Ok(languages)) => languages
                .into_iter()
                .find(|language| code.same_language(&language.code))
                .map(|language| language.display_name)
                .unwrap_or_else(|| code.to_string()),
            _ => code.to_string(),
        }
    }

    async fn default_layout(&self) -> Result<Option<Arc<ResolvedLayout>>, ContentError> {
        if let Some(layout) = self.cache.get_layout().await {
            return Ok(Some(layout));
        }

        let Some(layout) = self.layouts.default_layout().await? else {
            return Ok(None);
        };
        let layout = Arc::new(layout);
        self.cache
            .set_layout(layout.clone(), self.settings.layout_ttl)
            .await;
        Ok(Some(layout))
    }
}
