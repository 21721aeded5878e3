use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::routing::{delete, get, post};
use axum_prometheus::PrometheusMetricLayer;
use tokio::net;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;

use crate::domain::AppState;
use handlers::{activity, articles, catalog, health_check, locks, pages, toc};

mod api;
mod handlers;
mod querystring;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
    pub request_timeout: Duration,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: axum::Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(state: impl AppState, config: HttpServerConfig<'_>) -> anyhow::Result<Self> {
        let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        );
        // see: https://github.com/metrics-rs/metrics
        // see: https://github.com/Ptrskay3/axum-prometheus
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let router = Router::new()
            .route("/health", get(health_check))
            .nest("/api", api_routes())
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(TimeoutLayer::new(config.request_timeout))
            .layer(trace_layer)
            .layer(prometheus_layer)
            .with_state(state);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let address = self
            .listener
            .local_addr()
            .context("listener has no local address")?;
        tracing::info!("listening on {}", address);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

fn api_routes<S: AppState>() -> Router<S> {
    Router::new()
        .route("/pages", get(pages::find_root_page::<S>))
        .route("/pages/{*path}", get(pages::find_page::<S>))
        .route("/latest/{*path}", get(pages::find_latest::<S>))
        .route("/toc", get(toc::table_of_contents::<S>))
        .route("/articles", post(articles::create_article::<S>))
        .route(
            "/articles/{number}/versions",
            get(articles::list_versions::<S>).post(articles::create_version::<S>),
        )
        .route("/articles/{number}/preview", post(articles::preview::<S>))
        .route("/catalog", get(catalog::list_catalog::<S>))
        .route("/catalog/resync", post(catalog::resync_catalog::<S>))
        .route("/locks", post(locks::acquire_lock::<S>))
        .route("/locks/{article_id}", get(locks::lock_holder::<S>))
        .route(
            "/locks/{article_id}/{session_id}",
            delete(locks::release_lock::<S>),
        )
        .route(
            "/activity/{article_id}",
            get(activity::article_activity::<S>),
        )
}
