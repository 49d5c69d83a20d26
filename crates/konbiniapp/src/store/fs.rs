use super::fs_backend::FsBackend;
use super::repository::Repository;
use crate::config::KonbiniConfig;
use crate::error::Result;
use std::path::PathBuf;
use tracing::debug;

pub type FileRepository = Repository<FsBackend>;

impl FileRepository {
    pub fn new(root: PathBuf) -> Self {
        Repository::with_backend(FsBackend::new(root))
    }

    /// Opens the device store described by `config`.
    pub fn open(config: &KonbiniConfig) -> Result<Self> {
        let root = config.data_dir()?;
        debug!(root = %root.display(), "opening file store");
        Ok(Repository::with_backend(FsBackend::new(root)).with_latency(config.latency()))
    }
}
