//! RAWG video game database client.
//!
//! RAWG requires an API key passed as the `key` query parameter on every
//! request. Only `200 OK` is treated as success.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::types::{CatalogItem, CatalogItemDetail, Tag};
use super::{CatalogClient, CatalogError, SearchRequest};
use crate::config::ApiConfig;

/// RAWG API client.
pub struct RawgClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RawgClient {
    /// Create a new RAWG client.
    pub fn new(config: &ApiConfig) -> Result<Self, CatalogError> {
        if config.api_key.is_empty() {
            return Err(CatalogError::InvalidRequest(
                "RAWG API key is required".to_string(),
            ));
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            CatalogError::InvalidRequest(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidRequest(format!(
                "Base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::InvalidRequest(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Build `<base>/<segments..>?key=<k>`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidRequest("Base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// URL for a list-page request.
    pub(crate) fn search_url(&self, request: &SearchRequest) -> Result<Url, CatalogError> {
        if request.page == 0 {
            return Err(CatalogError::InvalidRequest(
                "Page numbers start at 1".to_string(),
            ));
        }

        let mut url = self.endpoint(&["games"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &request.page.to_string());
            if let Some(text) = request.text.as_deref().filter(|t| !t.is_empty()) {
                query.append_pair("search", text);
            }
            if let Some(genres) = request.genres.as_deref().filter(|g| !g.is_empty()) {
                query.append_pair("genres", genres);
            }
        }
        Ok(url)
    }

    /// URL for a detail request.
    pub(crate) fn detail_url(&self, id: u64) -> Result<Url, CatalogError> {
        self.endpoint(&["games", &id.to_string()])
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        // The query string carries the API key; only the path is logged.
        debug!("RAWG request: path={}", url.path());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::NoResponse(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CatalogError::from_status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::NoResponse(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| CatalogError::DecodingError(e.to_string()))
    }
}

#[async_trait]
impl CatalogClient for RawgClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogItem>, CatalogError> {
        let url = self.search_url(request)?;

        debug!(
            "RAWG search: text={:?}, genres={:?}, page={}",
            request.text, request.genres, request.page
        );

        let page: RawgPage = self.get_json(url).await?;
        Ok(page.results.into_iter().map(Into::into).collect())
    }

    async fn fetch_detail(&self, id: u64) -> Result<CatalogItemDetail, CatalogError> {
        let url = self.detail_url(id)?;

        debug!("RAWG get game: id={}", id);

        let details: RawgGameDetails = self.get_json(url).await?;
        Ok(details.into())
    }
}

// ============================================================================
// RAWG API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawgPage {
    results: Vec<RawgGame>,
}

#[derive(Debug, Deserialize)]
struct RawgGame {
    id: u64,
    name: String,
    background_image: Option<String>,
    rating: f64,
    released: Option<String>,
    genres: Option<Vec<RawgTag>>,
}

#[derive(Debug, Deserialize)]
struct RawgTag {
    id: u64,
    name: String,
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawgPlatformEntry {
    platform: RawgTag,
}

#[derive(Debug, Deserialize)]
struct RawgGameDetails {
    id: u64,
    name: String,
    description: Option<String>,
    background_image: Option<String>,
    rating: f64,
    released: Option<String>,
    metacritic: Option<i32>,
    genres: Option<Vec<RawgTag>>,
    platforms: Option<Vec<RawgPlatformEntry>>,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<RawgTag> for Tag {
    fn from(t: RawgTag) -> Self {
        Self {
            id: t.id,
            name: t.name,
            slug: t.slug,
        }
    }
}

fn tags(raw: Option<Vec<RawgTag>>) -> Vec<Tag> {
    raw.unwrap_or_default().into_iter().map(Into::into).collect()
}

impl From<RawgGame> for CatalogItem {
    fn from(g: RawgGame) -> Self {
        Self {
            id: g.id,
            name: g.name,
            cover_image: g.background_image,
            rating: g.rating,
            released: g.released,
            genres: tags(g.genres),
        }
    }
}

impl From<RawgGameDetails> for CatalogItemDetail {
    fn from(d: RawgGameDetails) -> Self {
        Self {
            id: d.id,
            name: d.name,
            cover_image: d.background_image,
            rating: d.rating,
            released: d.released,
            genres: tags(d.genres),
            description: d.description,
            metacritic: d.metacritic,
            platforms: d
                .platforms
                .unwrap_or_default()
                .into_iter()
                .map(|p| p.platform.into())
                .collect(),
        }
    }
}
