//! Remote game catalog access.
//!
//! This module provides the `CatalogClient` trait used by the controllers,
//! a RAWG-backed implementation, and the domain types it returns.

pub mod markup;
mod rawg;
mod types;

pub use rawg::RawgClient;
pub use types::*;

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The request URL could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transport failed before any status was received (includes timeouts).
    #[error("No response from server: {0}")]
    NoResponse(String),

    /// Server answered with a non-200 status.
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    DecodingError(String),
}

impl CatalogError {
    /// Build a `ServerError` with the message templated for `status`.
    pub fn from_status(status: u16) -> Self {
        let message = match status {
            400 => "Bad or invalid request from the client (400)".to_string(),
            401 => "Authentication is required to access the resource (401)".to_string(),
            403 => "The server refuses to fulfil the request (forbidden) (403)".to_string(),
            404 => "The server cannot find the requested resource (404)".to_string(),
            500 => "Internal server error (500)".to_string(),
            other => format!("Unknown server error: {}", other),
        };
        CatalogError::ServerError { status, message }
    }

    /// Text suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::InvalidRequest(_) => "The request could not be built".to_string(),
            CatalogError::NoResponse(_) => "No response from the server".to_string(),
            CatalogError::ServerError { message, .. } => message.clone(),
            CatalogError::DecodingError(_) => {
                "The server sent data in an unexpected format".to_string()
            }
        }
    }
}

/// Parameters of a single list-page query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text search; `None` lists the catalog unfiltered.
    pub text: Option<String>,
    /// Comma-joined, sorted genre identifiers.
    pub genres: Option<String>,
    /// 1-based page number.
    pub page: u32,
}

impl SearchRequest {
    /// Request for the first page of the whole catalog.
    pub fn first_page() -> Self {
        Self {
            text: None,
            genres: None,
            page: 1,
        }
    }

    /// Set the search text. Blank text is treated as no search.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.trim().is_empty() { None } else { Some(text) };
        self
    }

    /// Set the genre filter.
    pub fn with_genres(mut self, genres: &BTreeSet<String>) -> Self {
        self.genres = genre_filter_param(genres);
        self
    }

    /// Set the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// Join a genre selection into the query parameter form.
///
/// The set is ordered, so identical selections always produce the same
/// string regardless of the order genres were picked in.
pub fn genre_filter_param(genres: &BTreeSet<String>) -> Option<String> {
    if genres.is_empty() {
        return None;
    }
    Some(genres.iter().map(String::as_str).collect::<Vec<_>>().join(","))
}

/// Trait for catalog backends.
///
/// Implementations never retry; every failure is surfaced to the caller.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one page of list items.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Fetch the detail record for a single game.
    async fn fetch_detail(&self, id: u64) -> Result<CatalogItemDetail, CatalogError>;
}
