use crate::error::Result;
use std::fmt;
use std::path::PathBuf;

/// The logical keys of one device store.
///
/// The first four hold shared collections; `Profile`, `Theme` and
/// `ReaderSettings` belong to whoever is using this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Items,
    Comments,
    Settings,
    Users,
    Profile,
    Theme,
    ReaderSettings,
}

impl StoreKey {
    pub const ALL: [StoreKey; 7] = [
        StoreKey::Items,
        StoreKey::Comments,
        StoreKey::Settings,
        StoreKey::Users,
        StoreKey::Profile,
        StoreKey::Theme,
        StoreKey::ReaderSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Items => "items",
            StoreKey::Comments => "comments",
            StoreKey::Settings => "settings",
            StoreKey::Users => "users",
            StoreKey::Profile => "profile",
            StoreKey::Theme => "theme",
            StoreKey::ReaderSettings => "reader_settings",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract interface for raw key-value I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while [`super::Repository`] handles the "what" (records, invariants, seeding).
pub trait StorageBackend {
    /// Read the raw value stored under `key`.
    /// Returns Ok(None) if nothing was ever written (the only case that may trigger seeding).
    /// Returns Err only on actual I/O errors.
    fn read(&self, key: StoreKey) -> Result<Option<String>>;

    /// Replace the value under `key`.
    /// MUST be atomic: a failed write leaves the previous value intact.
    fn write(&self, key: StoreKey, value: &str) -> Result<()>;

    /// Remove the value under `key`. Removing an absent key is not an error.
    fn remove(&self, key: StoreKey) -> Result<()>;

    /// Where the value lives. For FsBackend a real path, for MemBackend a virtual one.
    fn location(&self, key: StoreKey) -> PathBuf;
}
