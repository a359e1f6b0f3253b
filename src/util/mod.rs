//! Small helpers shared across the session modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pure functions (`color`, `url`) and the cancellable timer (`debounce`)
//! live here so the state modules stay focused on workflow.

pub mod color;
pub mod debounce;
pub mod url;
