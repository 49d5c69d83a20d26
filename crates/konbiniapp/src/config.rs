//! # Configuration
//!
//! Konbini configuration is managed by [`confique`], which handles layered loading
//! from environment variables, a TOML file, and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `KONBINI_DATA_DIR`, `KONBINI_LATENCY_MS`,
//!    `KONBINI_OWNER_EMAIL`, `KONBINI_COMPLETION_API_KEY`.
//! 2. **Config file**: `konbini.toml` in the OS config directory (via `directories`).
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Where the device store files live |
//! | `simulated_latency_ms` | `0` | Artificial delay on item reads/writes |
//! | `hot_list_size` | `5` | Length of each per-type ranking |
//! | `max_upload_bytes` | `2097152` | Cover/page upload cap |
//! | `owner_email` | `couleuryou@gmail.com` | Login email that becomes admin |
//! | `completion_api_key` | unset | Credential for the text-completion service |

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{KonbiniError, Result};

pub const CONFIG_FILE: &str = "konbini.toml";
pub const DEFAULT_OWNER_EMAIL: &str = "couleuryou@gmail.com";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KonbiniConfig {
    /// Directory holding the device store. Falls back to the OS data directory.
    #[config(env = "KONBINI_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Delay added to item reads and writes so loading states are visible.
    #[config(env = "KONBINI_LATENCY_MS", default = 0)]
    pub simulated_latency_ms: u64,

    /// Number of entries in each per-type hot list.
    #[config(default = 5)]
    pub hot_list_size: usize,

    /// Largest accepted image upload, in bytes.
    #[config(default = 2097152)]
    pub max_upload_bytes: usize,

    /// The simulated login with this email is granted the admin role.
    #[config(env = "KONBINI_OWNER_EMAIL", default = "couleuryou@gmail.com")]
    pub owner_email: String,

    #[config(env = "KONBINI_COMPLETION_API_KEY")]
    pub completion_api_key: Option<String>,
}

impl Default for KonbiniConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            simulated_latency_ms: 0,
            hot_list_size: 5,
            max_upload_bytes: 2 * 1024 * 1024,
            owner_email: DEFAULT_OWNER_EMAIL.to_string(),
            completion_api_key: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "konbini")
}

impl KonbiniConfig {
    /// Load from the environment and the default config file location.
    pub fn load() -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(dirs) = project_dirs() {
            builder = builder.file(dirs.config_dir().join(CONFIG_FILE));
        }
        Ok(builder.load()?)
    }

    /// Load from the environment and an explicit config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self::builder().env().file(path).load()?)
    }

    /// The data directory, resolving the OS default when unset.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                KonbiniError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    "could not determine a home directory for the data store",
                ))
            })
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    pub fn is_owner_email(&self, email: &str) -> bool {
        email.trim().eq_ignore_ascii_case(self.owner_email.trim())
    }

    pub fn has_completion_credentials(&self) -> bool {
        self.completion_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KonbiniConfig::default();
        assert_eq!(config.hot_list_size, 5);
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
        assert_eq!(config.latency(), Duration::ZERO);
        assert!(!config.has_completion_credentials());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = KonbiniConfig {
            data_dir: Some(PathBuf::from("/tmp/konbini")),
            ..Default::default()
        };
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/konbini"));
    }

    #[test]
    fn test_owner_email_match_is_trimmed_and_case_insensitive() {
        let config = KonbiniConfig::default();
        assert!(config.is_owner_email("  CouleurYou@Gmail.com "));
        assert!(!config.is_owner_email("reader@example.com"));
    }

    #[test]
    fn test_blank_api_key_is_not_a_credential() {
        let config = KonbiniConfig {
            completion_api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!config.has_completion_credentials());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = KonbiniConfig {
            simulated_latency_ms: 500,
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        let loaded: KonbiniConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "hot_list_size = 3\nmax_upload_bytes = 1024\n").unwrap();

        let config = KonbiniConfig::load_from(&path).unwrap();
        assert_eq!(config.hot_list_size, 3);
        assert_eq!(config.max_upload_bytes, 1024);
    }
}
