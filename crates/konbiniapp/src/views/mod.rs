//! # Derived Views
//!
//! Pure functions over an in-memory snapshot of the collections. Nothing in here
//! touches the store: callers load a snapshot through the repository, then ask
//! these functions for presentation data.
//!
//! - [`ranking`]: hot score, per-type top lists, spotlight pick
//! - [`search`]: query / type / tag filtering and the tag list for the filter UI
//! - [`author`]: works and totals for one author name
//! - [`library`]: per-user joins (favorites, history, own works)
//!
//! References that point at deleted items (favorites, history entries) are
//! dropped silently wherever they are joined.

pub mod author;
pub mod library;
pub mod ranking;
pub mod search;
