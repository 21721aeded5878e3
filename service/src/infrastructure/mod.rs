use std::sync::Arc;

use crate::{
    domain::{AppState, service::ContentService},
    infrastructure::{persistence::PostgresRepository, translation::HttpTranslator},
};

pub mod http;
pub mod persistence;
pub mod settings;
pub mod sweeper;
pub mod translation;

/// Content core wired to Postgres, with translation when configured.
pub type Content = ContentService<PostgresRepository, Option<HttpTranslator>>;

#[derive(Clone)]
pub struct AppStateImpl {
    content: Arc<Content>,
}

impl AppStateImpl {
    pub fn new(content: Arc<Content>) -> Self {
        Self { content }
    }
}

impl AppState for AppStateImpl {
    type S = PostgresRepository;
    type T = Option<HttpTranslator>;

    fn content(&self) -> &Content {
        &self.content
    }
}
