//! Client core for the Blue's Book fan-reference backend.
//!
//! Every backend endpoint returns a JSON envelope `{success, data?, error?}`;
//! this crate owns the fetch/cache/debounce/view-state coordination on top of
//! that contract and stops at display-ready records. Rendering belongs to a
//! separate adapter.

pub mod api;
pub mod cache;
pub mod debounce;
pub mod error;
pub mod models;
pub mod prefs;
pub mod search;
pub mod suggest;
pub mod view;
