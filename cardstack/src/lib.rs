//! Observer coordination core for a scrollable list of cards.
//!
//! This crate keeps an append-only list of panel records in sync with
//! host-driven signals: viewport visibility, content size, scroll-triggered
//! growth, in-place title edits and drag-to-resize gestures. It is
//! intentionally independent of any widget toolkit: the host delivers
//! observer events and draws snapshots, everything else lives here so it
//! can be tested in isolation.

pub mod config;
pub mod drag;
pub mod echo;
pub mod error;
pub mod geometry;
pub mod growth;
pub mod host;
pub mod layout;
pub mod panel;
pub mod size;
pub mod stack;
pub mod store;
pub mod subscription;
pub mod title_edit;
pub mod visibility;
