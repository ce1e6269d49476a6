//! List controller: paging, filtering and sorting over a `CatalogClient`.
//!
//! At most one page request is outstanding per controller. A query change
//! that arrives while a request is running bumps the generation, which
//! turns the running response stale, and leaves a pending reload that the
//! running fetch task issues as soon as the stale response resolves.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use super::{ListSnapshot, LoadPhase, Query, SortOption};
use crate::catalog::{CatalogClient, CatalogError, CatalogItem, SearchRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    /// Page 1 of the current query, replacing the list.
    Reset,
    /// The page after the last loaded one, appended.
    Next,
}

/// A claimed fetch: what to request and which generation it belongs to.
struct Ticket {
    request: SearchRequest,
    generation: u64,
}

#[derive(Debug, Default)]
struct ListState {
    query: Query,
    items: Vec<CatalogItem>,
    phase: LoadPhase,
    error: Option<String>,
    has_more: bool,
    generation: u64,
    in_flight: bool,
    reload_pending: bool,
}

impl ListState {
    fn new() -> Self {
        Self {
            has_more: true,
            ..Default::default()
        }
    }

    fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            items: self.items.clone(),
            phase: self.phase,
            error: self.error.clone(),
            query: self.query.clone(),
            has_more: self.has_more,
        }
    }

    /// Drop loaded pages and invalidate any running request.
    fn reset(&mut self) {
        self.generation += 1;
        self.query.page = 0;
        self.items.clear();
        self.has_more = true;
        self.error = None;
    }

    /// Start a fetch unless one is already running.
    fn claim(&mut self, kind: FetchKind) -> Option<Ticket> {
        if self.in_flight {
            if kind == FetchKind::Reset {
                self.reload_pending = true;
                self.phase = LoadPhase::Loading;
            }
            return None;
        }

        let page = match kind {
            FetchKind::Reset => 1,
            FetchKind::Next if !self.has_more => return None,
            FetchKind::Next => self.query.page + 1,
        };

        self.in_flight = true;
        self.phase = LoadPhase::Loading;
        self.error = None;

        Some(Ticket {
            request: self.query.request(page),
            generation: self.generation,
        })
    }

    fn apply(&mut self, page: u32, result: Result<Vec<CatalogItem>, CatalogError>) {
        match result {
            Ok(items) => {
                self.has_more = !items.is_empty();
                if page == 1 {
                    self.items = items;
                } else {
                    self.items.extend(items);
                }
                self.query.page = page;
                self.query.sort.apply(&mut self.items);
                self.phase = LoadPhase::Loaded;
                debug!(
                    "Loaded page {} ({} items total, has_more={})",
                    page,
                    self.items.len(),
                    self.has_more
                );
            }
            Err(e) => {
                warn!("Failed to load page {}: {}", page, e);
                self.phase = LoadPhase::Errored;
                self.error = Some(format!("Failed to load games. {}", e.user_message()));
            }
        }
    }
}

struct Inner {
    client: Arc<dyn CatalogClient>,
    state: RwLock<ListState>,
    updates: watch::Sender<ListSnapshot>,
}

impl Inner {
    fn publish(&self, state: &ListState) {
        self.updates.send_replace(state.snapshot());
    }

    /// Run claimed fetches until no reload is pending.
    async fn run(self: Arc<Self>, first: Ticket) {
        let mut next = Some(first);

        while let Some(ticket) = next {
            let result = self.client.search(&ticket.request).await;

            let mut state = self.state.write().await;
            state.in_flight = false;

            if ticket.generation == state.generation {
                state.apply(ticket.request.page, result);
            } else {
                debug!(
                    "Discarding stale page {} for text={:?}",
                    ticket.request.page, ticket.request.text
                );
                if !state.reload_pending && state.phase == LoadPhase::Loading {
                    state.phase = if state.items.is_empty() {
                        LoadPhase::Idle
                    } else {
                        LoadPhase::Loaded
                    };
                }
            }

            next = if std::mem::take(&mut state.reload_pending) {
                state.claim(FetchKind::Reset)
            } else {
                None
            };
            self.publish(&state);
        }
    }
}

/// Drives paging, filtering and sorting of the game list.
///
/// Cheap to clone; clones share the same list.
#[derive(Clone)]
pub struct ListController {
    inner: Arc<Inner>,
}

impl ListController {
    /// Create a controller with an empty, idle list.
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        let state = ListState::new();
        let (updates, _) = watch::channel(state.snapshot());
        Self {
            inner: Arc::new(Inner {
                client,
                state: RwLock::new(state),
                updates,
            }),
        }
    }

    /// Current state of the list.
    pub async fn snapshot(&self) -> ListSnapshot {
        self.inner.state.read().await.snapshot()
    }

    /// Currently loaded items.
    pub async fn items(&self) -> Vec<CatalogItem> {
        self.inner.state.read().await.items.clone()
    }

    pub async fn phase(&self) -> LoadPhase {
        self.inner.state.read().await.phase
    }

    /// Receive a new snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.inner.updates.subscribe()
    }

    /// Replace the search text and reload from page 1.
    pub async fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.reset_and_fetch(|query| query.text = text).await;
    }

    /// Replace the genre filter and reload from page 1.
    pub async fn set_genre_filter(&self, genres: BTreeSet<String>) {
        self.reset_and_fetch(|query| query.genres = genres).await;
    }

    /// Add `genre` to the filter if absent, remove it otherwise, then reload from page 1.
    pub async fn toggle_genre(&self, genre: impl Into<String>) {
        let genre = genre.into();
        self.reset_and_fetch(|query| {
            if !query.genres.remove(&genre) {
                query.genres.insert(genre);
            }
        })
        .await;
    }

    /// Change the ordering.
    ///
    /// Local orderings re-sort the loaded items without a request. Switching
    /// to `SortOption::Default` reloads, since the server order cannot be
    /// recovered from a sorted list.
    pub async fn set_sort(&self, sort: SortOption) {
        if !sort.is_local() {
            self.reset_and_fetch(|query| query.sort = sort).await;
            return;
        }

        let mut state = self.inner.state.write().await;
        state.query.sort = sort;
        sort.apply(&mut state.items);
        self.inner.publish(&state);
    }

    /// Load and append the next page.
    ///
    /// No-op while a request is running or after an empty page. After a
    /// failed attempt the same page is requested again.
    pub async fn load_next(&self) {
        self.fetch(FetchKind::Next).await;
    }

    /// Drop loaded pages and reload the current query from page 1.
    pub async fn refresh(&self) {
        self.reset_and_fetch(|_| {}).await;
    }

    /// Load page 1 if nothing is loaded or loading yet.
    pub async fn ensure_loaded(&self) {
        {
            let state = self.inner.state.read().await;
            if !state.items.is_empty() || state.in_flight {
                return;
            }
        }
        self.refresh().await;
    }

    /// Clear the search text and loaded items without contacting the server.
    ///
    /// A running request becomes stale and its response is discarded.
    pub async fn clear_results(&self) {
        let mut state = self.inner.state.write().await;
        state.query.text.clear();
        state.reset();
        state.reload_pending = false;
        state.phase = LoadPhase::Idle;
        self.inner.publish(&state);
    }

    /// Replace search text and genre filter together and reload from page 1.
    ///
    /// Issues a single request where separate setters would issue one each.
    pub async fn set_filters(&self, text: impl Into<String>, genres: BTreeSet<String>) {
        let text = text.into();
        self.reset_and_fetch(|query| {
            query.text = text;
            query.genres = genres;
        })
        .await;
    }

    /// Mark the running request stale while keeping the loaded items.
    ///
    /// Its response is dropped on arrival. Used when newer input is about to
    /// replace the query.
    pub async fn discard_in_flight(&self) {
        let mut state = self.inner.state.write().await;
        if state.in_flight {
            state.generation += 1;
            debug!("Running request for text={:?} superseded", state.query.text);
        }
    }

    async fn reset_and_fetch(&self, update: impl FnOnce(&mut Query)) {
        {
            let mut state = self.inner.state.write().await;
            update(&mut state.query);
            state.reset();
        }
        self.fetch(FetchKind::Reset).await;
    }

    async fn fetch(&self, kind: FetchKind) {
        let ticket = {
            let mut state = self.inner.state.write().await;
            let ticket = state.claim(kind);
            self.inner.publish(&state);
            ticket
        };

        let Some(ticket) = ticket else {
            return;
        };

        // Run on a task so a caller dropping this future cannot leave the
        // controller marked as in flight.
        let handle = tokio::spawn(self.inner.clone().run(ticket));
        if let Err(e) = handle.await {
            warn!("List fetch task failed: {}", e);
        }
    }
}
