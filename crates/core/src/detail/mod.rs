//! Single-game detail session.
//!
//! Loads one detail record and mirrors its membership in the shared
//! collection for as long as the session lives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

use crate::catalog::{CatalogClient, CatalogItemDetail};
use crate::collection::{CollectionStore, Subscription};
use crate::list::LoadPhase;

#[derive(Debug, Error)]
pub enum DetailError {
    #[error("Game {0} has not been loaded")]
    NotLoaded(u64),
}

/// Point-in-time view of a detail session.
#[derive(Debug, Clone, Default)]
pub struct DetailSnapshot {
    pub detail: Option<CatalogItemDetail>,
    pub phase: LoadPhase,
    pub error: Option<String>,
    pub is_saved: bool,
}

#[derive(Debug, Default)]
struct DetailState {
    detail: Option<CatalogItemDetail>,
    phase: LoadPhase,
    error: Option<String>,
}

struct DetailInner {
    id: u64,
    client: Arc<dyn CatalogClient>,
    state: RwLock<DetailState>,
    saved: Arc<AtomicBool>,
    membership: Mutex<Option<Subscription>>,
}

impl DetailInner {
    async fn load(self: Arc<Self>) {
        let result = self.client.fetch_detail(self.id).await;

        let mut state = self.state.write().await;
        match result {
            Ok(detail) => {
                state.detail = Some(detail);
                state.phase = LoadPhase::Loaded;
            }
            Err(e) => {
                warn!("Failed to load game {}: {}", self.id, e);
                state.phase = LoadPhase::Errored;
                state.error = Some(e.user_message());
            }
        }
    }
}

/// Detail view state for one game id.
#[derive(Clone)]
pub struct DetailController {
    inner: Arc<DetailInner>,
}

impl DetailController {
    pub fn new(id: u64, client: Arc<dyn CatalogClient>) -> Self {
        Self {
            inner: Arc::new(DetailInner {
                id,
                client,
                state: RwLock::new(DetailState::default()),
                saved: Arc::new(AtomicBool::new(false)),
                membership: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Load the record. A failed reload keeps the previously loaded record.
    pub async fn fetch_detail(&self) {
        {
            let mut state = self.inner.state.write().await;
            if state.phase == LoadPhase::Loading {
                return;
            }
            state.phase = LoadPhase::Loading;
            state.error = None;
        }

        let handle = tokio::spawn(self.inner.clone().load());
        if let Err(e) = handle.await {
            warn!("Detail fetch task failed: {}", e);
        }
    }

    pub async fn snapshot(&self) -> DetailSnapshot {
        let state = self.inner.state.read().await;
        DetailSnapshot {
            detail: state.detail.clone(),
            phase: state.phase,
            error: state.error.clone(),
            is_saved: self.is_saved(),
        }
    }

    pub async fn detail(&self) -> Option<CatalogItemDetail> {
        self.inner.state.read().await.detail.clone()
    }

    /// Whether this game is in the collection, as last reported by the store.
    pub fn is_saved(&self) -> bool {
        self.inner.saved.load(Ordering::SeqCst)
    }

    /// Track this game's membership in `store` until the session ends.
    ///
    /// Calling again replaces the previous subscription.
    pub fn observe_collection_membership(&self, store: &CollectionStore) {
        let id = self.inner.id;
        self.inner.saved.store(store.is_saved(id), Ordering::SeqCst);

        let saved = self.inner.saved.clone();
        let subscription = store.subscribe(move |snapshot| {
            saved.store(snapshot.iter().any(|e| e.id == id), Ordering::SeqCst);
        });

        *self
            .inner
            .membership
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(subscription);
    }

    /// Stop tracking collection membership.
    pub fn stop_observing(&self) {
        self.inner
            .membership
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Save or unsave the loaded game. Returns whether it is saved afterwards.
    pub async fn toggle_saved(&self, store: &CollectionStore) -> Result<bool, DetailError> {
        let detail = self
            .detail()
            .await
            .ok_or(DetailError::NotLoaded(self.inner.id))?;

        let saved = store.toggle(&detail);
        self.inner.saved.store(saved, Ordering::SeqCst);
        Ok(saved)
    }
}
