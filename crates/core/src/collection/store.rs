//! Process-wide collection store with snapshot subscriptions.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use tracing::{debug, info, warn};

use super::{CollectionEntry, CollectionStorage};
use crate::catalog::CatalogItemDetail;

type Callback = Arc<dyn Fn(&[CollectionEntry]) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

/// Handle for a registered observer. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Stop receiving snapshots.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .callbacks
                .remove(&self.id);
        }
    }
}

/// The saved-games collection.
///
/// Mutations are serialized: each one updates the in-memory set, writes the
/// full set to storage, then hands the new snapshot to every subscriber
/// before the next mutation may start. Callbacks may read the store but must
/// not mutate it.
pub struct CollectionStore {
    storage: Arc<dyn CollectionStorage>,
    key: String,
    entries: RwLock<Vec<CollectionEntry>>,
    mutation: Mutex<()>,
    subscribers: Arc<Mutex<Registry>>,
}

impl CollectionStore {
    /// Load the persisted collection stored under `key`.
    ///
    /// Missing, unreadable or corrupt payloads start an empty collection.
    pub fn open(storage: Arc<dyn CollectionStorage>, key: impl Into<String>) -> Self {
        let key = key.into();

        let entries = match storage.load(&key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<CollectionEntry>>(&bytes) {
                Ok(entries) => unique_by_id(entries),
                Err(e) => {
                    warn!("Ignoring corrupt collection payload '{}': {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read collection '{}': {}", key, e);
                Vec::new()
            }
        };

        info!("Collection '{}' loaded with {} entries", key, entries.len());

        Self {
            storage,
            key,
            entries: RwLock::new(entries),
            mutation: Mutex::new(()),
            subscribers: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Whether a game is saved.
    pub fn is_saved(&self, id: u64) -> bool {
        self.read().iter().any(|e| e.id == id)
    }

    /// Current snapshot in insertion order.
    pub fn entries(&self) -> Vec<CollectionEntry> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Save `detail` if absent, otherwise remove the entry with its id.
    ///
    /// Returns whether the game is saved afterwards.
    pub fn toggle(&self, detail: &CatalogItemDetail) -> bool {
        let _guard = self.mutation.lock().unwrap_or_else(PoisonError::into_inner);

        let (saved, snapshot) = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let saved = match entries.iter().position(|e| e.id == detail.id) {
                Some(index) => {
                    entries.remove(index);
                    false
                }
                None => {
                    entries.push(detail.clone());
                    true
                }
            };
            (saved, entries.clone())
        };

        debug!("Collection toggle: id={}, saved={}", detail.id, saved);
        self.commit(&snapshot);
        saved
    }

    /// Remove the entry with `id`. Returns whether an entry was removed.
    pub fn remove(&self, id: u64) -> bool {
        let _guard = self.mutation.lock().unwrap_or_else(PoisonError::into_inner);

        let (removed, snapshot) = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let before = entries.len();
            entries.retain(|e| e.id != id);
            (entries.len() != before, entries.clone())
        };

        debug!("Collection remove: id={}, removed={}", id, removed);
        self.commit(&snapshot);
        removed
    }

    /// Register an observer that receives the full snapshot after every mutation.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[CollectionEntry]) + Send + Sync + 'static,
    {
        let mut registry = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.callbacks.insert(id, Arc::new(callback));

        Subscription {
            id,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<CollectionEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist `snapshot` and notify observers. Write failures are logged;
    /// the in-memory set stays authoritative for this session.
    fn commit(&self, snapshot: &[CollectionEntry]) {
        match serde_json::to_vec(snapshot) {
            Ok(bytes) => {
                if let Err(e) = self.storage.save(&self.key, &bytes) {
                    warn!("Failed to persist collection '{}': {}", self.key, e);
                }
            }
            Err(e) => warn!("Failed to encode collection '{}': {}", self.key, e),
        }

        let callbacks: Vec<Callback> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .values()
            .cloned()
            .collect();

        for callback in callbacks {
            callback(snapshot);
        }
    }
}

fn unique_by_id(entries: Vec<CollectionEntry>) -> Vec<CollectionEntry> {
    let mut seen = HashSet::new();
    entries.into_iter().filter(|e| seen.insert(e.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockStorage};

    const KEY: &str = "test_collection";

    fn open(storage: &Arc<MockStorage>) -> CollectionStore {
        CollectionStore::open(storage.clone(), KEY)
    }

    #[test]
    fn test_starts_empty_without_payload() {
        let storage = Arc::new(MockStorage::new());
        let store = open(&storage);
        assert!(store.is_empty());
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_corrupt_payload_is_empty() {
        let storage = Arc::new(MockStorage::new());
        storage.seed(KEY, b"{not json");
        let store = open(&storage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_read_failure_is_empty() {
        let storage = Arc::new(MockStorage::new());
        storage.fail_loads(true);
        assert!(open(&storage).is_empty());
    }

    #[test]
    fn test_loads_persisted_entries_without_duplicates() {
        let storage = Arc::new(MockStorage::new());
        let a = fixtures::detail(1, "Portal");
        let b = fixtures::detail(2, "Portal 2");
        let payload = serde_json::to_vec(&vec![a.clone(), b.clone(), a.clone()]).unwrap();
        storage.seed(KEY, &payload);

        let store = open(&storage);
        assert_eq!(store.entries(), vec![a, b]);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let storage = Arc::new(MockStorage::new());
        let store = open(&storage);
        let original = serde_json::to_vec(&store.entries()).unwrap();
        let game = fixtures::detail(3498, "Grand Theft Auto V");

        assert!(store.toggle(&game));
        assert!(store.is_saved(3498));
        assert!(!store.toggle(&game));
        assert!(!store.is_saved(3498));

        assert_eq!(storage.save_count(), 2);
        assert_eq!(storage.stored(KEY).unwrap(), original);
    }

    #[test]
    fn test_toggle_keeps_insertion_order() {
        let storage = Arc::new(MockStorage::new());
        let store = open(&storage);
        store.toggle(&fixtures::detail(5, "E"));
        store.toggle(&fixtures::detail(1, "A"));
        store.toggle(&fixtures::detail(3, "C"));

        let ids: Vec<u64> = store.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 1, 3]);
    }

    #[test]
    fn test_remove_persists_and_reports() {
        let storage = Arc::new(MockStorage::new());
        let store = open(&storage);
        store.toggle(&fixtures::detail(7, "Celeste"));

        assert!(store.remove(7));
        assert!(!store.remove(7));
        assert!(store.is_empty());
        assert_eq!(storage.save_count(), 3);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let storage = Arc::new(MockStorage::new());
        let store = open(&storage);
        storage.fail_saves(true);

        assert!(store.toggle(&fixtures::detail(9, "Hades")));
        assert!(store.is_saved(9));
        assert!(storage.stored(KEY).is_none());
    }

    #[test]
    fn test_subscribers_receive_full_snapshots() {
        let storage = Arc::new(MockStorage::new());
        let store = open(&storage);

        let seen: Arc<Mutex<Vec<Vec<u64>>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_a = seen.clone();
        let _sub_a = store.subscribe(move |snapshot| {
            seen_a
                .lock()
                .unwrap()
                .push(snapshot.iter().map(|e| e.id).collect());
        });
        let count_b = Arc::new(Mutex::new(0));
        let count_b_cb = count_b.clone();
        let _sub_b = store.subscribe(move |_| *count_b_cb.lock().unwrap() += 1);

        store.toggle(&fixtures::detail(1, "A"));
        store.toggle(&fixtures::detail(2, "B"));
        store.remove(1);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![vec![1], vec![1, 2], vec![2]]
        );
        assert_eq!(*count_b.lock().unwrap(), 3);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let storage = Arc::new(MockStorage::new());
        let store = open(&storage);
        let count = Arc::new(Mutex::new(0));
        let count_cb = count.clone();

        let sub = store.subscribe(move |_| *count_cb.lock().unwrap() += 1);
        assert_eq!(store.subscriber_count(), 1);
        store.toggle(&fixtures::detail(1, "A"));
        sub.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);
        store.toggle(&fixtures::detail(1, "A"));

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_callback_can_read_store() {
        let storage = Arc::new(MockStorage::new());
        let store = Arc::new(open(&storage));
        let observed = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&store);
        let observed_cb = observed.clone();
        let _sub = store.subscribe(move |_| {
            if let Some(store) = weak.upgrade() {
                *observed_cb.lock().unwrap() = Some(store.is_saved(42));
            }
        });

        store.toggle(&fixtures::detail(42, "Answer"));
        assert_eq!(*observed.lock().unwrap(), Some(true));
    }

    #[test]
    fn test_concurrent_toggles_never_duplicate() {
        let storage = Arc::new(MockStorage::new());
        let store = Arc::new(open(&storage));
        let game = fixtures::detail(11, "Tetris");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let game = game.clone();
                std::thread::spawn(move || {
                    store.toggle(&game);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Even number of toggles: back to absent, never two copies.
        assert!(!store.is_saved(11));
        assert_eq!(storage.save_count(), 8);
    }
}
