use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLanguage {
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Request(String),
    #[error("translator returned {returned} texts for {requested}")]
    Mismatch { requested: usize, returned: usize },
}

/// Machine translation of page text.
pub trait Translator: Send + Sync + 'static {
    /// False for the null translator, which the resolver then skips
    fn is_configured(&self) -> bool;

    /// Translate `texts` from `source` into `target`, preserving order
    fn translate(
        &self,
        target: &str,
        source: &str,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<String>, TranslationError>> + Send;

    /// Languages the translator accepts, named in `display_language`
    fn supported_languages(
        &self,
        display_language: &str,
    ) -> impl Future<Output = Result<Vec<SupportedLanguage>, TranslationError>> + Send;
}

/// Translator used when none is configured. Returns text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslator;

impl Translator for NoTranslator {
    fn is_configured(&self) -> bool {
        false
    }

    async fn translate(
        &self,
        _target: &str,
        _source: &str,
        texts: &[String],
    ) -> Result<Vec<String>, TranslationError> {
        Ok(texts.to_vec())
    }

    async fn supported_languages(
        &self,
        _display_language: &str,
    ) -> Result<Vec<SupportedLanguage>, TranslationError> {
        Ok(Vec::new())
    }
}

impl<T: Translator> Translator for Option<T> {
    fn is_configured(&self) -> bool {
        self.as_ref().is_some_and(Translator::is_configured)
    }

    async fn translate(
        &self,
        target: &str,
        source: &str,
        texts: &[String],
    ) -> Result<Vec<String>, TranslationError> {
        match self {
            Some(translator) => translator.translate(target, source, texts).await,
            None => NoTranslator.translate(target, source, texts).await,
        }
    }

    async fn supported_languages(
        &self,
        display_language: &str,
    ) -> Result<Vec<SupportedLanguage>, TranslationError> {
        match self {
            Some(translator) => translator.supported_languages(display_language).await,
            None => NoTranslator.supported_languages(display_language).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_utils::StaticTranslator;

    #[tokio::test]
    async fn absent_translator_echoes_text() {
        let translator: Option<StaticTranslator> = None;
        assert!(!translator.is_configured());
        let texts = vec!["Hello".to_owned()];
        assert_eq!(translator.translate("fr", "en-US", &texts).await.unwrap(), texts);
        assert!(translator.supported_languages("fr").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn present_translator_is_used() {
        let translator = Some(StaticTranslator::default());
        assert!(translator.is_configured());
        let texts = vec!["Hello".to_owned()];
        assert_eq!(
            translator.translate("fr", "en-US", &texts).await.unwrap(),
            vec!["[fr] Hello".to_owned()]
        );
    }
}
