//! Paginated, filterable, sortable game list.

mod controller;
mod sort;

pub use controller::ListController;
pub use sort::{SortOption, UnknownSortOption};

use std::collections::BTreeSet;

use crate::catalog::{CatalogItem, SearchRequest};

/// Lifecycle of the list's most recent fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// Everything that determines which items the list shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Free-text search; empty lists everything.
    pub text: String,
    /// Selected genre identifiers.
    pub genres: BTreeSet<String>,
    pub sort: SortOption,
    /// Last page successfully loaded for this query (0 before the first).
    pub page: u32,
}

impl Query {
    /// The request for `page` of this query.
    pub fn request(&self, page: u32) -> SearchRequest {
        SearchRequest::first_page()
            .with_text(self.text.clone())
            .with_genres(&self.genres)
            .with_page(page)
    }
}

/// Point-in-time view of the list for rendering.
#[derive(Debug, Clone, Default)]
pub struct ListSnapshot {
    pub items: Vec<CatalogItem>,
    pub phase: LoadPhase,
    /// User-facing message of the last failure; cleared by the next fetch.
    pub error: Option<String>,
    pub query: Query,
    /// False once a page came back empty.
    pub has_more: bool,
}
