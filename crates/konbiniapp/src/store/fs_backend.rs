use super::backend::{StorageBackend, StoreKey};
use crate::error::{KonbiniError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One JSON file per key under a data directory.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, key: StoreKey) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn ensure_dir(&self, key: StoreKey) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|e| write_failed(key, &self.root, e))?;
        }
        Ok(())
    }
}

fn write_failed(key: StoreKey, path: &Path, error: io::Error) -> KonbiniError {
    let reason = if is_disk_full_error(&error) {
        format!(
            "disk full or quota exceeded while writing '{}'",
            path.display()
        )
    } else {
        format!("{}: {}", path.display(), error)
    };
    KonbiniError::StorageWriteFailed { key, reason }
}

fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

impl StorageBackend for FsBackend {
    fn read(&self, key: StoreKey) -> Result<Option<String>> {
        let path = self.file_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Err(KonbiniError::StorageCorrupt {
                    key,
                    details: format!("{} is not valid UTF-8", path.display()),
                })
            }
            Err(e) => Err(KonbiniError::StorageReadFailed {
                key,
                reason: format!("{}: {}", path.display(), e),
            }),
        }
    }

    fn write(&self, key: StoreKey, value: &str) -> Result<()> {
        self.ensure_dir(key)?;
        let target = self.file_for(key);

        // Atomic write
        let tmp = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, value) {
            let _ = fs::remove_file(&tmp);
            return Err(write_failed(key, &tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(write_failed(key, &target, e));
        }
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<()> {
        let path = self.file_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(write_failed(key, &path, e)),
        }
    }

    fn location(&self, key: StoreKey) -> PathBuf {
        self.file_for(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_full_messages_are_classified() {
        let err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        assert!(is_disk_full_error(&err));

        let wrapped = write_failed(StoreKey::Items, Path::new("/data/items.json"), err);
        assert!(wrapped.to_string().contains("disk full"));
        assert!(wrapped.is_recoverable());
    }

    #[test]
    fn other_io_errors_keep_their_message() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        assert!(!is_disk_full_error(&err));
        let wrapped = write_failed(StoreKey::Users, Path::new("/data/users.json"), err);
        assert!(wrapped.to_string().contains("access denied"));
    }
}
