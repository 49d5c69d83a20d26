//! # Storage Layer
//!
//! The device store is a flat key-value map of JSON strings. The [`StorageBackend`]
//! trait covers the raw I/O; [`Repository`] is the only code that reads or writes
//! it and owns the serialized form of every collection.
//!
//! ## Keys
//!
//! ```text
//! items      Vec<ContentItem>   newest first, seeded on first read
//! comments   Vec<Comment>       append-only
//! settings   SiteSettings       singleton, full replace
//! users      Vec<User>          accounts shown to admins
//! profile    User               identity of whoever uses this device
//! theme      Theme              per-device preference
//! ```
//!
//! ## Absent vs Corrupt
//!
//! An absent key means "never written" and is the only case where defaults or
//! the bootstrap dataset are used. A present value that fails to parse is
//! [`crate::error::KonbiniError::StorageCorrupt`] and is left untouched, since
//! replacing it would destroy user data.
//!
//! ## Read-Modify-Write
//!
//! Mutations load a whole collection, change one record and write the whole
//! collection back. Two handles on the same device (two tabs, or two calls
//! whose reads both happen before either write) can therefore lose an update:
//! the later write is computed from a snapshot that predates the earlier one.
//! A networked backend must replace this with per-record conditional writes
//! or transactions. `tests/lost_update.rs` pins the current behavior.
//!
//! ## Implementations
//!
//! - [`fs::FileRepository`]: One JSON file per key, atomic tmp-file + rename writes.
//! - [`memory::InMemoryRepository`]: For tests, and for simulating several tabs
//!   on one device (clones of [`MemBackend`] share their map).
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── items.json
//! ├── comments.json
//! ├── settings.json
//! ├── users.json
//! ├── profile.json
//! └── theme.json
//! ```

pub mod backend;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
pub mod repository;

pub use backend::{StorageBackend, StoreKey};
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
pub use repository::{LikeToggle, Repository};
