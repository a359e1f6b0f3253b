//! Debounced icon search.
//!
//! DESIGN
//! ======
//! Each keystroke reschedules a single [`Debouncer`] timer; only when input
//! pauses for the configured delay is `GET /grid/search_icon` issued. The
//! sequence number is allocated when the timer fires, so it orders requests
//! by issue time rather than by keystroke.
//!
//! Replies come back over a channel and are applied on the owner's side.
//! A reply whose sequence is not the most recently issued one is stale and is
//! discarded, so a slow early query can never overwrite a later result.
//!
//! ERROR HANDLING
//! ==============
//! A failed search leaves the previous results in place and is reported as
//! [`SearchEvent::Failed`]; the next keystroke simply tries again.

#[cfg(test)]
#[path = "icon_search_test.rs"]
mod icon_search_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::StartpageConfig;
use crate::net::api::{ApiError, GridApi};
use crate::net::types::{BrandIcon, GenericIcon, IconResponse};
use crate::util::color::{self, DEFAULT_CELL_COLOR};
use crate::util::debounce::Debouncer;

/// Brand icon artwork, keyed by slug.
pub const BRAND_ICON_CDN: &str = "https://cdn.jsdelivr.net/npm/simple-icons@v7/icons";
/// Generic icon artwork, keyed by name. Version-pinned.
pub const GENERIC_ICON_CDN: &str = "https://cdn.jsdelivr.net/gh/FortAwesome/Font-Awesome@6.1.1/svgs/solid";

pub type SearchSeq = u64;

#[must_use]
pub fn brand_icon_url(slug: &str) -> String {
    format!("{BRAND_ICON_CDN}/{slug}.svg")
}

#[must_use]
pub fn generic_icon_url(name: &str) -> String {
    format!("{GENERIC_ICON_CDN}/{name}.svg")
}

/// A rendered search result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FriendlyIcon {
    pub title: String,
    pub url: String,
    /// Suggested tile color as `#rrggbb`.
    pub hex: String,
}

impl FriendlyIcon {
    #[must_use]
    pub fn from_brand(icon: &BrandIcon) -> Self {
        let title = icon
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&icon.slug)
            .to_owned();
        // Malformed backend colors fall back so the suggestion always applies.
        let hex = color::normalize_hex_color(&color::with_hash(&icon.hex), DEFAULT_CELL_COLOR);
        Self { title, url: brand_icon_url(&icon.slug), hex }
    }

    #[must_use]
    pub fn from_generic(icon: &GenericIcon) -> Self {
        Self {
            title: icon.name.clone(),
            url: generic_icon_url(&icon.name),
            hex: DEFAULT_CELL_COLOR.to_owned(),
        }
    }

    /// Whether artwork over this icon's color should render light.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        color::is_dark(&self.hex)
    }
}

/// The two result categories of the latest applied response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IconResults {
    pub brand: Vec<FriendlyIcon>,
    pub generic: Vec<FriendlyIcon>,
}

impl IconResults {
    #[must_use]
    pub fn from_response(response: &IconResponse) -> Self {
        Self {
            brand: response.si.iter().map(FriendlyIcon::from_brand).collect(),
            generic: response.fa.iter().map(FriendlyIcon::from_generic).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.brand.len() + self.generic.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Result at `index`, counting brand icons first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FriendlyIcon> {
        self.brand.iter().chain(&self.generic).nth(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FriendlyIcon> {
        self.brand.iter().chain(&self.generic)
    }
}

#[derive(Debug)]
pub enum SearchEvent {
    /// Results were replaced with the response to `query`.
    Applied { seq: SearchSeq, query: String },
    /// A newer search was issued before this reply arrived.
    Stale { seq: SearchSeq },
    Failed { seq: SearchSeq, error: ApiError },
}

struct SearchReply {
    seq: SearchSeq,
    query: String,
    result: Result<IconResponse, ApiError>,
}

pub struct IconSearchClient {
    api: Arc<dyn GridApi>,
    limit: u32,
    debouncer: Debouncer,
    issued: Arc<AtomicU64>,
    in_flight: Arc<AtomicUsize>,
    applied: Option<SearchSeq>,
    tx: mpsc::UnboundedSender<SearchReply>,
    rx: mpsc::UnboundedReceiver<SearchReply>,
    query: String,
    results: IconResults,
}

impl IconSearchClient {
    #[must_use]
    pub fn new(api: Arc<dyn GridApi>, config: &StartpageConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            limit: config.search_limit,
            debouncer: Debouncer::new(config.search_debounce()),
            issued: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            applied: None,
            tx,
            rx,
            query: String::new(),
            results: IconResults::default(),
        }
    }

    /// Record a keystroke and reschedule the search. Blank text is searched
    /// like any other query.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_input(&mut self, text: &str) {
        text.clone_into(&mut self.query);
        let api = Arc::clone(&self.api);
        let issued = Arc::clone(&self.issued);
        let in_flight = Arc::clone(&self.in_flight);
        let tx = self.tx.clone();
        let query = text.to_owned();
        let limit = self.limit;
        self.debouncer.schedule(move || {
            let seq = issued.fetch_add(1, Ordering::SeqCst) + 1;
            in_flight.fetch_add(1, Ordering::SeqCst);
            async move {
                debug!(seq, query = %query, "icon search issued");
                let result = api.search_icons(&query, limit).await;
                if tx.send(SearchReply { seq, query, result }).is_err() {
                    debug!(seq, "icon search reply has no listener");
                }
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        });
    }

    /// Apply every reply that has already arrived.
    pub fn poll(&mut self) -> Vec<SearchEvent> {
        let mut events = Vec::new();
        while let Ok(reply) = self.rx.try_recv() {
            events.push(self.apply(reply));
        }
        events
    }

    /// Wait for the next reply. Returns `None` when no search is scheduled or
    /// in flight.
    pub async fn next_event(&mut self) -> Option<SearchEvent> {
        let idle = !self.debouncer.is_pending() && self.in_flight.load(Ordering::SeqCst) == 0;
        match self.rx.try_recv() {
            Ok(reply) => return Some(self.apply(reply)),
            Err(_) if idle => return None,
            Err(_) => {}
        }
        let reply = self.rx.recv().await?;
        Some(self.apply(reply))
    }

    /// Clear the query and results. Replies still in flight become stale.
    pub fn reset(&mut self) {
        self.debouncer.cancel();
        self.invalidate_in_flight();
        self.query.clear();
        self.results = IconResults::default();
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn results(&self) -> &IconResults {
        &self.results
    }

    /// Sequence of the reply currently rendered, if any.
    #[must_use]
    pub fn applied_seq(&self) -> Option<SearchSeq> {
        self.applied
    }

    /// Whether a search is scheduled or awaiting its reply.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.debouncer.is_pending() || self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn invalidate_in_flight(&mut self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
        self.applied = None;
    }

    fn apply(&mut self, reply: SearchReply) -> SearchEvent {
        let latest = self.issued.load(Ordering::SeqCst);
        if reply.seq != latest {
            warn!(seq = reply.seq, latest, query = %reply.query, "discarding stale icon search reply");
            return SearchEvent::Stale { seq: reply.seq };
        }
        match reply.result {
            Ok(response) => {
                // Prior results are replaced wholesale, never merged.
                self.results = IconResults::from_response(&response);
                self.applied = Some(reply.seq);
                debug!(seq = reply.seq, results = self.results.len(), "icon search applied");
                SearchEvent::Applied { seq: reply.seq, query: reply.query }
            }
            Err(error) => {
                warn!(seq = reply.seq, error = %error, "icon search failed");
                SearchEvent::Failed { seq: reply.seq, error }
            }
        }
    }
}
