use std::{env, time::Duration};

use anyhow::Context;
use config::{Config, Environment, File};
use dotenvy::dotenv;
use folio_common::DatabaseSettings;
use serde::Deserialize;

use crate::domain::{numbers::RetryPolicy, resolver::ResolverSettings, service::ContentSettings};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_port: String,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub content: ContentConfig,
    /// Translation stays off when this section is missing
    #[serde(default)]
    pub translator: Option<TranslatorSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub primary_language: String,
    pub primary_language_name: String,
    pub view_cache_seconds: u64,
    pub layout_cache_seconds: u64,
    pub lock_ttl_seconds: i64,
    pub sweep_interval_seconds: u64,
    pub allocation_attempts: u32,
    pub request_timeout_seconds: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        let resolver = ResolverSettings::default();
        Self {
            primary_language: resolver.primary_language,
            primary_language_name: resolver.primary_language_name,
            view_cache_seconds: resolver.view_ttl.as_secs(),
            layout_cache_seconds: resolver.layout_ttl.as_secs(),
            lock_ttl_seconds: 20 * 60,
            sweep_interval_seconds: 60,
            allocation_attempts: RetryPolicy::default().attempts,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslatorSettings {
    /// Base url, ending with `/`
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_translator_timeout")]
    pub timeout_ms: u64,
}

fn default_translator_timeout() -> u64 {
    5_000
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        let run_mode = load_env("RUN_MODE", "development");

        let s = Config::builder()
            .add_source(File::with_name("./config/default"))
            .add_source(File::with_name(&format!("./config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("app").separator("__"))
            .build()?;

        s.try_deserialize().with_context(|| "failed to read config")
    }

    pub fn content_settings(&self) -> ContentSettings {
        let content = &self.content;
        let translation_timeout = self
            .translator
            .as_ref()
            .map(|translator| Duration::from_millis(translator.timeout_ms))
            .unwrap_or_else(|| ResolverSettings::default().translation_timeout);

        ContentSettings {
            retry: RetryPolicy::with_attempts(content.allocation_attempts),
            lock_ttl: chrono::Duration::seconds(content.lock_ttl_seconds),
            resolver: ResolverSettings {
                primary_language: content.primary_language.clone(),
                primary_language_name: content.primary_language_name.clone(),
                translation_timeout,
                view_ttl: Duration::from_secs(content.view_cache_seconds),
                layout_ttl: Duration::from_secs(content.layout_cache_seconds),
            },
        }
    }
}

fn load_env(key: &str, default_value: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
server_port: "3000"
database:
  host: localhost
  db: folio
  schema: content
  credentials:
    username: folio
    password: secret
  connection:
    min_connections: 1
    max_connections: 5
    acquire_timeout_seconds: 3
content:
  lock_ttl_seconds: 600
  allocation_attempts: 3
"#;

    fn parse(yaml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn missing_content_keys_fall_back_to_defaults() {
        let settings = parse(YAML);
        assert_eq!(settings.database.port, 5432);
        assert!(settings.translator.is_none());

        let content = settings.content_settings();
        assert_eq!(content.lock_ttl, chrono::Duration::minutes(10));
        assert_eq!(content.retry.attempts, 3);
        assert_eq!(content.resolver.primary_language, "en-US");
        assert_eq!(content.resolver.view_ttl, Duration::from_secs(10));
    }

    #[test]
    fn translator_timeout_drives_resolver_timeout() {
        let yaml = format!(
            "{YAML}translator:\n  endpoint: https://translation.example.com/\n  api_key: key\n  timeout_ms: 250\n"
        );
        let settings = parse(&yaml);
        assert_eq!(
            settings.content_settings().resolver.translation_timeout,
            Duration::from_millis(250)
        );
    }
}
