//! In-memory storage for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::collection::{CollectionStorage, StorageError};

/// Mock implementation of the CollectionStorage trait.
///
/// Counts successful saves and can simulate read or write failures.
#[derive(Debug, Default)]
pub struct MockStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    saves: AtomicUsize,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a raw payload in place, bypassing the save counter.
    pub fn seed(&self, key: &str, value: &[u8]) {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_vec());
    }

    /// Current payload stored under `key`.
    pub fn stored(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl CollectionStorage for MockStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("simulated read failure".to_string()));
        }
        Ok(self.stored(key))
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("simulated write failure".to_string()));
        }
        self.seed(key, value);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
