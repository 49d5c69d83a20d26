//! # Konbini Architecture
//!
//! Konbini is the **local-first core** of a publishing platform for novels, comics and
//! short videos. Creators publish items made of chapters; readers browse, like, comment,
//! favorite and resume where they left off. Everything lives in a per-device store; there
//! is no server.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade, the entry point for every screen            │
//! │  - Permission checks against the current session user       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!            ┌─────────────────┼──────────────────┐
//!            ▼                 ▼                  ▼
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────┐
//! │ session.rs       │ │ studio/          │ │ views/           │
//! │ guest / identity │ │ drafts, publish  │ │ ranking, search, │
//! │ theme            │ │ novel rendering  │ │ author, library  │
//! └──────────────────┘ └──────────────────┘ └──────────────────┘
//!            │                 │          (pure, no store access)
//!            ▼                 ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Repository: read-modify-write of whole collections       │
//! │  - StorageBackend: FsBackend (production), MemBackend (tests)│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! External integrations (text completion, image uploads) sit in [`services`] behind
//! traits and plain functions, so the core never depends on a network client.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Nothing in this crate prints, reads a terminal, or installs a log subscriber. Logging
//! goes through `tracing` macros; embedding applications pick the subscriber.
//!
//! ## Testing Strategy
//!
//! 1. **Store** (`store/`): repository semantics on [`store::MemBackend`], atomic file
//!    writes on [`store::FsBackend`] with temp dirs.
//! 2. **Views** (`views/`): pure functions over hand-built item lists.
//! 3. **API** (`api.rs`): permission gates and dispatch.
//! 4. **Integration** (`tests/`): end-to-end scenarios, including the documented
//!    lost-update race between two handles on one store.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`store`]: Storage abstraction, repository and implementations
//! - [`session`]: Guest and identified sessions, login merge, theme
//! - [`studio`]: Drafts, publishing, chapter editing
//! - [`views`]: Ranking, search, author and library views
//! - [`services`]: Writing assistant and image uploads
//! - [`model`]: Core data types (`ContentItem`, `Chapter`, `Comment`, `User`)
//! - [`seed`]: Bootstrap dataset
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod seed;
pub mod services;
pub mod session;
pub mod store;
pub mod studio;
pub mod views;

pub use api::KonbiniApi;
pub use config::KonbiniConfig;
pub use error::{KonbiniError, Result};
