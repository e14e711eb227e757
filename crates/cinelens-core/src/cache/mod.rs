//! File-backed cache of generated analyses.
//!
//! One file per title id, named `<tconst>.html`, under a single directory.
//! Entries never expire; the only way an entry changes is a later `put` for
//! the same key (last writer wins).

use crate::config::CacheConfig;
use crate::error::{CinelensError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Key-value store of analysis text, backed by the file system.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open a cache rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| CinelensError::Io {
                message: format!("Failed to create cache directory {}", root.display()),
                path: Some(root.clone()),
                source: Some(e),
            })?;
            debug!("Created cache directory {}", root.display());
        } else if !root.is_dir() {
            return Err(CinelensError::Config {
                message: format!("Cache path is not a directory: {}", root.display()),
            });
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry for `tconst`.
    pub fn path_for(&self, tconst: &str) -> Result<PathBuf> {
        validate_key(tconst)?;
        Ok(self
            .root
            .join(format!("{}.{}", tconst, CacheConfig::FILE_EXTENSION)))
    }

    /// Read the entry for `tconst`, or `None` if nothing was stored.
    pub fn get(&self, tconst: &str) -> Result<Option<String>> {
        let path = self.path_for(tconst)?;
        match fs::read_to_string(&path) {
            Ok(contents) => {
                info!("Found cached analysis for '{}'", tconst);
                Ok(Some(contents))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CinelensError::io_with_path(e, path)),
        }
    }

    /// Store `contents` for `tconst`, replacing any previous entry.
    ///
    /// The text is written to a temp file in the cache directory and renamed
    /// over the target, so readers see either the old or the new entry.
    pub fn put(&self, tconst: &str, contents: &str) -> Result<()> {
        let path = self.path_for(tconst)?;

        let mut temp = NamedTempFile::new_in(&self.root).map_err(|e| CinelensError::Io {
            message: format!("Failed to create temp file in {}", self.root.display()),
            path: Some(self.root.clone()),
            source: Some(e),
        })?;
        if let Err(e) = temp.write_all(contents.as_bytes()).and_then(|_| temp.flush()) {
            return Err(CinelensError::io_with_path(e, temp.path()));
        }
        temp.persist(&path)
            .map_err(|e| CinelensError::io_with_path(e.error, &path))?;

        info!("Analysis saved to cache for '{}'", tconst);
        Ok(())
    }

    /// Whether an entry exists for `tconst`.
    pub fn contains(&self, tconst: &str) -> bool {
        self.path_for(tconst).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// Reject keys that would escape the cache directory or name no file.
fn validate_key(tconst: &str) -> Result<()> {
    let invalid = |message: &str| {
        Err(CinelensError::Validation {
            field: "tconst".to_string(),
            message: format!("{} ({:?})", message, tconst),
        })
    };

    if tconst.trim().is_empty() {
        return invalid("cache key is empty");
    }
    if tconst.contains(['/', '\\', '\0']) || tconst.contains("..") {
        return invalid("cache key contains path characters");
    }
    Ok(())
}
