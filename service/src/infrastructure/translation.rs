use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    domain::translation::{SupportedLanguage, TranslationError, Translator},
    infrastructure::settings::TranslatorSettings,
};

const US_ENGLISH_CODE: &str = "en-US";
const US_ENGLISH_NAME: &str = "US English";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

/// Every v2 response wraps its payload in `data`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Translations {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct Languages {
    #[serde(default)]
    languages: Vec<Language>,
}

#[derive(Debug, Deserialize)]
struct Language {
    language: String,
    #[serde(default)]
    name: Option<String>,
}

/// Google Translate over its v2 REST interface.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: reqwest::Client,
    translate_url: Url,
    languages_url: Url,
    api_key: String,
}

impl HttpTranslator {
    pub fn new(settings: &TranslatorSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .context("failed to build translation client")?;

        let base = Url::parse(&settings.endpoint)
            .with_context(|| format!("invalid translator endpoint {}", settings.endpoint))?;
        let translate_url = base
            .join("language/translate/v2")
            .context("invalid translate url")?;
        let languages_url = base
            .join("language/translate/v2/languages")
            .context("invalid languages url")?;

        Ok(Self {
            client,
            translate_url,
            languages_url,
            api_key: settings.api_key.clone(),
        })
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TranslationError> {
        let response = request
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Request(format!("{status}: {body}")));
        }

        response
            .json::<Envelope<T>>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|e| TranslationError::Request(e.to_string()))
    }
}

/// US English leads the list whenever names are given in another language.
fn with_us_english_first(display_language: &str, languages: Vec<Language>) -> Vec<SupportedLanguage> {
    let mut supported: Vec<SupportedLanguage> = languages
        .into_iter()
        .map(|language| SupportedLanguage {
            display_name: language.name.unwrap_or_else(|| language.language.clone()),
            code: language.language,
        })
        .collect();

    if !display_language.to_ascii_lowercase().starts_with("en") {
        supported.insert(
            0,
            SupportedLanguage {
                code: US_ENGLISH_CODE.into(),
                display_name: US_ENGLISH_NAME.into(),
            },
        );
    }
    supported
}

impl Translator for HttpTranslator {
    fn is_configured(&self) -> bool {
        true
    }

    async fn translate(
        &self,
        target: &str,
        source: &str,
        texts: &[String],
    ) -> Result<Vec<String>, TranslationError> {
        let body = TranslateRequest {
            q: texts,
            source,
            target,
            format: "html",
        };
        let request = self.client.post(self.translate_url.clone()).json(&body);
        let response: Translations = self.send(request).await?;

        if response.translations.len() != texts.len() {
            return Err(TranslationError::Mismatch {
                requested: texts.len(),
                returned: response.translations.len(),
            });
        }
        tracing::debug!(target, count = texts.len(), "translated");
        Ok(response
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }

    async fn supported_languages(
        &self,
        display_language: &str,
    ) -> Result<Vec<SupportedLanguage>, TranslationError> {
        let request = self
            .client
            .get(self.languages_url.clone())
            .query(&[("target", display_language)]);
        let response: Languages = self.send(request).await?;
        Ok(with_us_english_first(display_language, response.languages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages() -> Vec<Language> {
        vec![
            Language {
                language: "fr".into(),
                name: Some("Französisch".into()),
            },
            Language {
                language: "haw".into(),
                name: None,
            },
        ]
    }

    fn settings(endpoint: &str) -> TranslatorSettings {
        TranslatorSettings {
            endpoint: endpoint.into(),
            api_key: "key".into(),
            timeout_ms: 1_000,
        }
    }

    #[test]
    fn us_english_leads_foreign_listings() {
        let listed = with_us_english_first("de", languages());
        assert_eq!(listed[0].code, "en-US");
        assert_eq!(listed[0].display_name, "US English");
        assert_eq!(listed[1].display_name, "Französisch");
        assert_eq!(listed[2].display_name, "haw");
    }

    #[test]
    fn english_listing_is_left_alone() {
        let listed = with_us_english_first("en-GB", languages());
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].code, "fr");
    }

    #[test]
    fn urls_hang_off_the_endpoint() {
        let translator = HttpTranslator::new(&settings("https://translation.example.com/")).unwrap();
        assert_eq!(
            translator.translate_url.as_str(),
            "https://translation.example.com/language/translate/v2"
        );
        assert_eq!(
            translator.languages_url.as_str(),
            "https://translation.example.com/language/translate/v2/languages"
        );
    }

    #[test]
    fn translation_response_unwraps_data() {
        let json = r#"{"data":{"translations":[{"translatedText":"Bonjour"}]}}"#;
        let parsed: Envelope<Translations> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data.translations[0].translated_text, "Bonjour");
    }

    #[test]
    fn malformed_endpoint_is_rejected() {
        assert!(HttpTranslator::new(&settings("not a url")).is_err());
    }
}
