use axum::http::StatusCode;

pub mod activity;
pub mod articles;
pub mod catalog;
pub mod dto;
pub mod locks;
pub mod pages;
pub mod toc;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
