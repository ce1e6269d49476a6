//! Domain types for catalog records.

use serde::{Deserialize, Serialize};

use super::markup::{secure_image_url, strip_markup};

/// A genre or platform tag (id + display name).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    /// URL-friendly identifier, used when building genre filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl Tag {
    /// Identifier to use in a genre filter: the slug when known, else the numeric id.
    pub fn filter_key(&self) -> String {
        self.slug.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// A game as it appears in a list page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Catalog-wide unique id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Average rating, usually 0.0-5.0 (not clamped).
    pub rating: f64,
    /// Release date as sent by the server (YYYY-MM-DD, possibly partial or malformed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    /// Genre tags in server order.
    #[serde(default)]
    pub genres: Vec<Tag>,
}

impl CatalogItem {
    /// Cover image URL upgraded to https.
    pub fn cover_image_url(&self) -> Option<String> {
        self.cover_image.as_deref().map(secure_image_url)
    }
}

/// Full detail record for a single game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItemDetail {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(default)]
    pub genres: Vec<Tag>,
    /// Description; may embed HTML markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Metacritic score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metacritic: Option<i32>,
    /// Platform tags in server order.
    #[serde(default)]
    pub platforms: Vec<Tag>,
}

impl CatalogItemDetail {
    /// Cover image URL upgraded to https.
    pub fn cover_image_url(&self) -> Option<String> {
        self.cover_image.as_deref().map(secure_image_url)
    }

    /// Description with markup removed. `None` when absent or blank after cleaning.
    pub fn plain_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(strip_markup)
            .filter(|d| !d.is_empty())
    }

    /// The list-level view of this record.
    pub fn summary(&self) -> CatalogItem {
        CatalogItem {
            id: self.id,
            name: self.name.clone(),
            cover_image: self.cover_image.clone(),
            rating: self.rating,
            released: self.released.clone(),
            genres: self.genres.clone(),
        }
    }
}
