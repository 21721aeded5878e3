use serde::Serialize;

use crate::domain::{repository::ContentStore, service::ContentService, translation::Translator};

pub mod activity;
pub mod article;
pub mod cache;
pub mod catalog;
pub mod locks;
pub mod numbers;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod toc;
pub mod translation;
pub mod versions;

#[cfg(test)]
pub mod test_utils;

/// One page of a listing together with the size of the whole result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub total_count: u64,
    pub page_no: u32,
    pub page_size: u32,
    pub items: Vec<T>,
}

//// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type S: ContentStore;
    type T: Translator;
    fn content(&self) -> &ContentService<Self::S, Self::T>;
}
