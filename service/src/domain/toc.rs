use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::domain::{
    Page,
    article::{
        error::ContentError,
        path::{PathPrefix, UrlPath},
    },
    repository::{
        PublishedPath, VersionRepository,
        query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocItem {
    pub title: String,
    pub url_path: UrlPath,
    pub published: Option<DateTime<Utc>>,
    pub updated: DateTime<Utc>,
}

pub type TableOfContents = Page<TocItem>;

/// Lists the published pages one level below a path.
#[derive(Debug, Clone)]
pub struct TocIndexer<R> {
    repository: R,
}

impl<R: VersionRepository> TocIndexer<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Titles sort byte-wise and ascending, or by publication date newest
    /// first when `order_by_published` is set. Ties go by url path.
    pub async fn get_children(
        &self,
        prefix: &PathPrefix,
        page_no: u32,
        page_size: u32,
        order_by_published: bool,
        now: DateTime<Utc>,
    ) -> Result<TableOfContents, ContentError> {
        let page_size = match page_size {
            0 => DEFAULT_PAGE_SIZE,
            size => size.min(MAX_PAGE_SIZE),
        };
        let rows = self.repository.visible_under(prefix, now).await?;

        let mut items = children(prefix, rows);
        items.sort_by(|a, b| {
            let primary = if order_by_published {
                b.published.cmp(&a.published)
            } else {
                a.title.cmp(&b.title)
            };
            primary.then_with(|| a.url_path.cmp(&b.url_path))
        });

        let total_count = items.len() as u64;
        let skip = (page_no as usize).saturating_mul(page_size as usize);
        let items = items
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .collect();

        Ok(Page {
            total_count,
            page_no,
            page_size,
            items,
        })
    }
}

/// Direct children of `prefix`, one item per distinct title and path.
fn children(prefix: &PathPrefix, rows: Vec<PublishedPath>) -> Vec<TocItem> {
    // only the newest visible version of each article counts
    let current = rows
        .into_iter()
        .into_grouping_map_by(|row| row.article_number)
        .max_by_key(|_, row| row.version_number);

    current
        .into_values()
        .filter(|row| prefix.is_parent_of(&row.url_path))
        .into_grouping_map_by(|row| (row.title.clone(), row.url_path.clone()))
        .aggregate(|merged: Option<TocItem>, _, row| {
            Some(match merged {
                None => TocItem {
                    title: row.title,
                    url_path: row.url_path,
                    published: row.published,
                    updated: row.updated,
                },
                Some(item) => TocItem {
                    published: item.published.max(row.published),
                    updated: item.updated.max(row.updated),
                    ..item
                },
            })
        })
        .into_values()
        .collect()
}
