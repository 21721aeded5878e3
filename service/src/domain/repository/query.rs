use std::str::FromStr;

use crate::domain::article::{VersionStatus, error::ContentError};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Query for listing catalog entries
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub filter: CatalogFilter,
    pub sort: Vec<(CatalogSortField, SortDirection)>,
    pub page_no: u32,
    pub page_size: u32,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self {
            filter: CatalogFilter::All,
            sort: Vec::new(),
            page_no: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the filter expression
    pub fn with_filter(mut self, filter: CatalogFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Combine current filter with AND operator
    pub fn and(mut self, other: CatalogFilter) -> Self {
        let current = std::mem::replace(&mut self.filter, CatalogFilter::All);
        self.filter = match current {
            CatalogFilter::All => other,
            current => CatalogFilter::And(Box::new(current), Box::new(other)),
        };
        self
    }

    /// Add sort order: (field, direction)
    pub fn add_sort(mut self, field: CatalogSortField, direction: SortDirection) -> Self {
        self.sort.push((field, direction));
        self
    }

    /// Zero-based pagination. Page size is capped at 200, zero means the default.
    pub fn paginate(mut self, page_no: u32, page_size: u32) -> Self {
        self.page_no = page_no;
        self.page_size = match page_size {
            0 => DEFAULT_PAGE_SIZE,
            size => size.min(MAX_PAGE_SIZE),
        };
        self
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn offset(&self) -> i64 {
        self.page_no as i64 * self.page_size as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogFilter {
    /// No filter
    All,

    /// Case-insensitive substring of the title
    TitleContains(String),

    StatusIs(VersionStatus),

    /// Url path starts with the given text
    PathStartsWith(String),

    And(Box<CatalogFilter>, Box<CatalogFilter>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSortField {
    Title,
    Updated,
    Published,
    ArticleNumber,
}

impl FromStr for CatalogSortField {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "updated" => Ok(Self::Updated),
            "published" => Ok(Self::Published),
            "article" | "articlenumber" | "article_number" => Ok(Self::ArticleNumber),
            other => Err(ContentError::Validation(format!(
                "cannot sort catalog by '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}
