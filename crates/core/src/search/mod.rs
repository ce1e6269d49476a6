//! Search-as-you-type on top of a `ListController`.
//!
//! Every keystroke restarts a trailing debounce window. Only the input that
//! survives a full quiet window is searched; earlier timers wake, see a
//! newer generation and exit. Requests that already started are never
//! aborted: new input marks the list's running request stale, so its
//! response is dropped on arrival instead of flashing outdated results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::config::SearchConfig;
use crate::list::ListController;

struct SearchInner {
    list: ListController,
    debounce: Duration,
    min_query_len: usize,
    generation: AtomicU64,
    text: Mutex<String>,
}

impl SearchInner {
    async fn execute(&self, text: String) {
        if text.trim().chars().count() < self.min_query_len {
            debug!("Search text {:?} below minimum length, clearing", text);
            self.list.clear_results().await;
            return;
        }
        debug!("Searching for {:?}", text);
        self.list.set_search_text(text).await;
    }
}

/// Debounced search input.
#[derive(Clone)]
pub struct SearchController {
    inner: Arc<SearchInner>,
}

impl SearchController {
    /// Create a controller using the configured window and minimum length.
    pub fn new(list: ListController, config: &SearchConfig) -> Self {
        Self::with_settings(list, config.debounce(), config.min_query_len)
    }

    pub fn with_settings(list: ListController, debounce: Duration, min_query_len: usize) -> Self {
        Self {
            inner: Arc::new(SearchInner {
                list,
                debounce,
                min_query_len,
                generation: AtomicU64::new(0),
                text: Mutex::new(String::new()),
            }),
        }
    }

    /// The list this controller feeds.
    pub fn list(&self) -> &ListController {
        &self.inner.list
    }

    /// The latest input text.
    pub fn text(&self) -> String {
        self.inner
            .text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Handle a change of the input text.
    ///
    /// Empty text clears the results right away. Anything else is searched
    /// once no further input arrives within the debounce window.
    pub async fn input(&self, text: impl Into<String>) {
        let text = text.into();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self
            .inner
            .text
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = text.clone();

        if text.is_empty() {
            self.inner.list.clear_results().await;
            return;
        }
        self.inner.list.discard_in_flight().await;

        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            inner.execute(text).await;
        });
    }

    /// Clear the input and results immediately.
    pub async fn clear(&self) {
        self.input(String::new()).await;
    }
}
