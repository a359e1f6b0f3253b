//! Grid-authoring core for the personal start page.
//!
//! Each account owns one persisted grid of widgets ("cells"). This crate owns
//! the editing workflow around that grid: the Viewing/Editing state machine,
//! the link and dynamic cell drafts, the debounced icon search and the
//! ordered full-snapshot saves. Dragging and placement are delegated to an
//! external layout engine behind [`engine::LayoutEngine`]; the backend is
//! reached through [`net::api::GridApi`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`state`] | [`state::session::GridSession`] and the creation drafts |
//! | [`services`] | Serializer, placeholders and the save worker |
//! | [`engine`] | Layout-engine seam and the headless [`engine::memory::MemoryEngine`] |
//! | [`net`] | Wire types and the HTTP client |
//! | [`util`] | Color math, link validation, debounce timer |
//! | [`config`] | Environment-driven [`config::StartpageConfig`] |

pub mod config;
pub mod engine;
pub mod net;
pub mod services;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_helpers;
