//! Session configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_SEARCH_LIMIT: u32 = 15;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartpageConfig {
    /// Backend origin, without a trailing slash.
    pub base_url: String,
    /// Raw `Cookie` header forwarded on every request.
    pub cookie: Option<String>,
    /// Quiet period before an icon search is issued.
    pub search_debounce_ms: u64,
    /// `l` parameter of the icon search.
    pub search_limit: u32,
    pub request_timeout_secs: u64,
}

impl Default for StartpageConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            cookie: None,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            search_limit: DEFAULT_SEARCH_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl StartpageConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `STARTPAGE_BASE_URL`: default `http://127.0.0.1:3000`
    /// - `STARTPAGE_COOKIE`: session cookie header, unset by default
    /// - `STARTPAGE_SEARCH_DEBOUNCE_MS`: default 500
    /// - `STARTPAGE_SEARCH_LIMIT`: default 15
    /// - `STARTPAGE_REQUEST_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("STARTPAGE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let cookie = std::env::var("STARTPAGE_COOKIE")
            .into_iter()
            .find(|v| !v.trim().is_empty());

        Self {
            base_url,
            cookie,
            search_debounce_ms: env_parse("STARTPAGE_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS),
            search_limit: env_parse("STARTPAGE_SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT),
            request_timeout_secs: env_parse("STARTPAGE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key).map(|v| v.parse::<T>()) {
        Ok(Ok(value)) => value,
        _ => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
