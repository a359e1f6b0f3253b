//! Networking for the grid backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` performs the icon-search and grid-save calls, and `types` defines
//! the JSON wire schema shared with the backend.

pub mod api;
pub mod types;
