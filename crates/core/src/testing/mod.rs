//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the catalog and storage
//! traits, allowing controller tests without network or disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use gamedex_core::testing::{fixtures, MockCatalogClient};
//!
//! let client = MockCatalogClient::new();
//! client.set_pages(None, None, vec![fixtures::page(1, 20)]).await;
//! client.set_search_delay("gta", Duration::from_millis(50)).await;
//! ```

mod mock_catalog;
mod mock_storage;

pub use mock_catalog::{MockCatalogClient, RecordedCatalogQuery};
pub use mock_storage::MockStorage;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{CatalogItem, CatalogItemDetail, Tag};

    /// Create a list item with reasonable defaults.
    pub fn item(id: u64, name: &str) -> CatalogItem {
        CatalogItem {
            id,
            name: name.to_string(),
            cover_image: Some(format!("http://media.example/{}.jpg", id)),
            rating: 3.0,
            released: Some("2020-01-01".to_string()),
            genres: vec![genre("action")],
        }
    }

    /// Create a list item with an explicit rating and release date.
    pub fn rated_item(id: u64, name: &str, rating: f64, released: Option<&str>) -> CatalogItem {
        CatalogItem {
            rating,
            released: released.map(str::to_string),
            ..item(id, name)
        }
    }

    /// Create a page of `count` items with consecutive ids starting at `first_id`.
    pub fn page(first_id: u64, count: u64) -> Vec<CatalogItem> {
        (first_id..first_id + count)
            .map(|id| item(id, &format!("Game {}", id)))
            .collect()
    }

    /// Create a genre tag whose slug is `slug`.
    pub fn genre(slug: &str) -> Tag {
        Tag {
            id: slug.len() as u64,
            name: slug.to_string(),
            slug: Some(slug.to_string()),
        }
    }

    /// Create a detail record.
    pub fn detail(id: u64, name: &str) -> CatalogItemDetail {
        CatalogItemDetail {
            id,
            name: name.to_string(),
            cover_image: None,
            rating: 4.0,
            released: Some("2019-05-05".to_string()),
            genres: vec![genre("indie")],
            description: Some(format!("<p>About {}.</p>", name)),
            metacritic: Some(80),
            platforms: vec![Tag {
                id: 4,
                name: "PC".to_string(),
                slug: Some("pc".to_string()),
            }],
        }
    }
}
