use std::{sync::Arc, time::Duration};

use folio_common::connect_to_database;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::service::ContentService;
use crate::infrastructure::http::{HttpServer, HttpServerConfig};
use crate::infrastructure::persistence::PostgresRepository;
use crate::infrastructure::settings::Settings;
use crate::infrastructure::translation::HttpTranslator;
use crate::infrastructure::{AppStateImpl, sweeper};

mod domain;
mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database = connect_to_database(&settings.database).await?;
    tracing::info!("connected to database");

    let translator = settings
        .translator
        .as_ref()
        .map(HttpTranslator::new)
        .transpose()?;
    if translator.is_none() {
        tracing::info!("no translator configured, pages are served untranslated");
    }

    let content = Arc::new(ContentService::new(
        PostgresRepository::new(database),
        translator,
        settings.content_settings(),
    ));

    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(sweeper::run(
        content.clone(),
        Duration::from_secs(settings.content.sweep_interval_seconds),
        shutdown.child_token(),
    ));

    let server_config = HttpServerConfig {
        port: &settings.server_port,
        request_timeout: Duration::from_secs(settings.content.request_timeout_seconds),
    };
    let http_server = HttpServer::new(AppStateImpl::new(content), server_config).await?;

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
        }
        signal.cancel();
    });

    let served = http_server.run(shutdown.clone()).await;
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::error!(error = %e, "sweeper task failed");
    }
    served
}
