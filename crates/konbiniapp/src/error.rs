use thiserror::Error;

use crate::services::UploadError;
use crate::store::StoreKey;

#[derive(Error, Debug)]
pub enum KonbiniError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend could not durably save a value (quota, disk full, I/O).
    #[error("Failed to write '{key}': {reason}")]
    StorageWriteFailed { key: StoreKey, reason: String },

    /// A persisted value exists but cannot be parsed. Never reinitialized.
    #[error("Stored value for '{key}' is corrupted: {details}")]
    StorageCorrupt { key: StoreKey, details: String },

    #[error("Failed to read '{key}': {reason}")]
    StorageReadFailed { key: StoreKey, reason: String },

    #[error("Invalid data: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("You need to log in to do that")]
    LoginRequired,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Configuration error: {0}")]
    Config(#[from] confique::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KonbiniError {
    /// Whether retrying the same action may succeed.
    ///
    /// Corruption is reported distinctly and is not retryable: the stored
    /// value has to be repaired or removed by hand.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            KonbiniError::StorageWriteFailed { .. } | KonbiniError::StorageReadFailed { .. }
        )
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, KonbiniError::StorageCorrupt { .. })
    }
}

pub type Result<T> = std::result::Result<T, KonbiniError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_failures_are_recoverable() {
        let err = KonbiniError::StorageWriteFailed {
            key: StoreKey::Items,
            reason: "quota exceeded".to_string(),
        };
        assert!(err.is_recoverable());
        assert!(!err.is_corrupt());
        assert!(err.to_string().contains("items"));
    }

    #[test]
    fn corruption_is_not_recoverable() {
        let err = KonbiniError::StorageCorrupt {
            key: StoreKey::Comments,
            details: "expected value at line 1".to_string(),
        };
        assert!(!err.is_recoverable());
        assert!(err.is_corrupt());
        assert!(err.to_string().contains("corrupted"));
    }
}
