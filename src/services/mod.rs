//! Grid services used by the editing session.
//!
//! SYSTEM CONTEXT
//! ==============
//! `serializer` converts engine items to and from the wire grid,
//! `placeholders` manages the transient filler items shown while viewing, and
//! `persistence` runs the ordered save worker.

pub mod persistence;
pub mod placeholders;
pub mod serializer;
