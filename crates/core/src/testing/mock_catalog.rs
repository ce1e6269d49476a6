//! Mock catalog client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::catalog::{CatalogClient, CatalogError, CatalogItem, CatalogItemDetail, SearchRequest};

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone)]
pub enum RecordedCatalogQuery {
    Search { request: SearchRequest, at: Instant },
    Detail { id: u64, at: Instant },
}

type QueryKey = (Option<String>, Option<String>);

/// Mock implementation of the CatalogClient trait.
///
/// Provides controllable behavior for testing:
/// - Return configured pages per (search text, genre filter)
/// - Delay responses per search text to simulate out-of-order completion
/// - Track queries (including failed ones) for assertions
/// - Simulate failures
#[derive(Debug, Default)]
pub struct MockCatalogClient {
    /// Pages by (text, genres); page N is `pages[N - 1]`.
    pages: Arc<RwLock<HashMap<QueryKey, Vec<Vec<CatalogItem>>>>>,
    /// Detail records by id.
    details: Arc<RwLock<HashMap<u64, CatalogItemDetail>>>,
    /// Response delay by search text.
    delays: Arc<RwLock<HashMap<Option<String>, Duration>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedCatalogQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockCatalogClient {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the pages returned for a text/genre combination.
    pub async fn set_pages(
        &self,
        text: Option<&str>,
        genres: Option<&str>,
        pages: Vec<Vec<CatalogItem>>,
    ) {
        self.pages.write().await.insert(
            (text.map(str::to_string), genres.map(str::to_string)),
            pages,
        );
    }

    /// Add a detail record.
    pub async fn add_detail(&self, detail: CatalogItemDetail) {
        self.details.write().await.insert(detail.id, detail);
    }

    /// Delay every search for `text` by `delay`.
    pub async fn set_search_delay(&self, text: &str, delay: Duration) {
        self.delays
            .write()
            .await
            .insert(Some(text.to_string()), delay);
    }

    /// Delay every search without text by `delay`.
    pub async fn set_catalog_delay(&self, delay: Duration) {
        self.delays.write().await.insert(None, delay);
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.queries.read().await.clone()
    }

    /// Get the recorded search requests in issue order.
    pub async fn search_requests(&self) -> Vec<SearchRequest> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedCatalogQuery::Search { request, .. } => Some(request.clone()),
                RecordedCatalogQuery::Detail { .. } => None,
            })
            .collect()
    }

    /// Get the number of queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Highest number of searches observed running at the same time.
    pub fn max_concurrent_searches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, query: RecordedCatalogQuery) {
        self.queries.write().await.push(query);
    }

    async fn take_error(&self) -> Option<CatalogError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogItem>, CatalogError> {
        self.record(RecordedCatalogQuery::Search {
            request: request.clone(),
            at: Instant::now(),
        })
        .await;

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = self.delays.read().await.get(&request.text).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let key = (request.text.clone(), request.genres.clone());
        let pages = self.pages.read().await;
        let page = pages
            .get(&key)
            .and_then(|p| p.get(request.page.saturating_sub(1) as usize))
            .cloned()
            .unwrap_or_default();

        Ok(page)
    }

    async fn fetch_detail(&self, id: u64) -> Result<CatalogItemDetail, CatalogError> {
        self.record(RecordedCatalogQuery::Detail {
            id,
            at: Instant::now(),
        })
        .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.details
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::from_status(404))
    }
}
