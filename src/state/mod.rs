//! Authoring state for the grid session.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` owns the edit-mode state machine and composes the rest:
//! `icon_search` (debounced lookups), `color_picker` (the picker seam),
//! `link_cell` and `dynamic_cell` (the two creation drafts).
//!
//! All state here is owned by a single [`session::GridSession`]; nothing is
//! module-global.

pub mod color_picker;
pub mod dynamic_cell;
pub mod icon_search;
pub mod link_cell;
pub mod session;

/// A creation form field that blocks Finish.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("not a valid link: {link}")]
    InvalidLink { link: String },
    #[error("choose a built-in widget or enter a custom URL")]
    EmptyDynamicSource,
}
