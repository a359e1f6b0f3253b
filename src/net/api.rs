//! HTTP access to the grid backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session only ever makes two calls: the icon search and the
//! full-snapshot grid save. Both go through the [`GridApi`] trait so the
//! session, the search client and the save worker can run against
//! [`HttpGridApi`] in production and an in-memory double in tests.
//!
//! ERROR HANDLING
//! ==============
//! Callers get a typed [`ApiError`]; nothing here retries. Retry is a user
//! action surfaced by the session.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};

use super::types::{Grid, IconResponse};
use crate::config::StartpageConfig;

pub const SEARCH_ICON_PATH: &str = "/grid/search_icon";
pub const UPDATE_GRID_PATH: &str = "/grid/update";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
    #[error("invalid cookie header: {0}")]
    InvalidCookie(#[from] reqwest::header::InvalidHeaderValue),
    #[error("{endpoint} failed: HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
}

/// The backend calls the grid session depends on.
#[async_trait]
pub trait GridApi: Send + Sync {
    /// `GET /grid/search_icon?q=<query>&l=<limit>`.
    async fn search_icons(&self, query: &str, limit: u32) -> Result<IconResponse, ApiError>;

    /// `PUT /grid/update` with the full grid snapshot. The response body is ignored.
    async fn update_grid(&self, grid: &Grid) -> Result<(), ApiError>;
}

/// [`GridApi`] over `reqwest`, authenticated by a forwarded session cookie.
#[derive(Clone, Debug)]
pub struct HttpGridApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGridApi {
    /// Build a client from config.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie is not a valid header value or the
    /// underlying client cannot be constructed.
    pub fn new(config: &StartpageConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl GridApi for HttpGridApi {
    async fn search_icons(&self, query: &str, limit: u32) -> Result<IconResponse, ApiError> {
        let url = search_url(&self.base_url, query, limit)?;
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint: SEARCH_ICON_PATH, status: status.as_u16() });
        }
        Ok(resp.json::<IconResponse>().await?)
    }

    async fn update_grid(&self, grid: &Grid) -> Result<(), ApiError> {
        let url = update_url(&self.base_url)?;
        let resp = self.client.put(url).json(grid).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint: UPDATE_GRID_PATH, status: status.as_u16() });
        }
        Ok(())
    }
}

fn search_url(base_url: &str, query: &str, limit: u32) -> Result<Url, ApiError> {
    let raw = format!("{base_url}{SEARCH_ICON_PATH}");
    let limit = limit.to_string();
    Url::parse_with_params(&raw, &[("q", query), ("l", limit.as_str())])
        .map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}

fn update_url(base_url: &str) -> Result<Url, ApiError> {
    let raw = format!("{base_url}{UPDATE_GRID_PATH}");
    Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}
