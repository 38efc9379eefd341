//! File-backed token cache
//!
//! Stored as JSON in `<config dir>/tokens.json`. The API client only reads it;
//! [`super::OAuthRefresher`] writes it after a successful refresh.

use std::fs;
use std::path::{Path, PathBuf};

use super::TokenRecord;
use crate::config::GscConfig;
use crate::error::{GscError, Result};

#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache at the default location (`<config dir>/tokens.json`)
    pub fn default_location() -> Self {
        Self::new(GscConfig::tokens_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached token.
    ///
    /// Returns `None` if the file doesn't exist, an error if it is malformed.
    pub fn load(&self) -> Result<Option<TokenRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| GscError::TokenCache {
            reason: format!("Failed to read {}: {}", self.path.display(), e),
        })?;

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| GscError::TokenCache {
                reason: format!("Failed to parse {}: {}", self.path.display(), e),
            })
    }

    /// Write `record`, creating the parent directory if needed
    pub fn save(&self, record: &TokenRecord) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| GscError::TokenCache {
                    reason: format!("Failed to create {}: {}", dir.display(), e),
                })?;
            }
        }

        let content = serde_json::to_string_pretty(record)?;

        fs::write(&self.path, content).map_err(|e| GscError::TokenCache {
            reason: format!("Failed to write {}: {}", self.path.display(), e),
        })
    }

    /// Remove the cached token; a missing file is not an error
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path().join("tokens.json"));
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path().join("nested").join("tokens.json"));
        let record = TokenRecord::new("access").with_refresh_token("refresh");

        cache.save(&record).unwrap();

        assert_eq!(cache.load().unwrap(), Some(record));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "not json").unwrap();

        let err = TokenCache::new(&path).load().unwrap_err();
        assert_eq!(err.code(), "GSC-030");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path().join("tokens.json"));
        cache.save(&TokenRecord::new("t")).unwrap();

        cache.clear().unwrap();
        cache.clear().unwrap();

        assert!(cache.load().unwrap().is_none());
    }
}
