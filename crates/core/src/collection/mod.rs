//! Saved-games collection.
//!
//! The collection is a set of detail records keyed by id, persisted as a
//! single JSON blob and shared by every controller in the process. Each
//! mutation writes the whole set and pushes the new snapshot to all
//! subscribers.

mod sqlite;
mod store;

pub use sqlite::SqliteStorage;
pub use store::{CollectionStore, Subscription};

use crate::catalog::CatalogItemDetail;

/// A saved game. Stored exactly as fetched.
pub type CollectionEntry = CatalogItemDetail;

/// Error type for storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Backend failure.
    #[error("Storage error: {0}")]
    Backend(String),
}

/// Trait for durable key/value blob storage.
pub trait CollectionStorage: Send + Sync {
    /// Read the blob stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the blob stored under `key`.
    fn save(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}
