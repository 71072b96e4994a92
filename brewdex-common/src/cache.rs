// brewdex-common/src/cache.rs
// Stores raw registry snapshots between runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::error::Result;
use crate::Config;

/// Snapshots older than this are rescanned before use.
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct Cache {
    cache_dir: PathBuf,
}

impl Cache {
    /// Create a new Cache using the config's cache_dir
    pub fn new(config: &Config) -> Result<Self> {
        Self::at(config.cache_dir())
    }

    pub fn at(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.into();
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)?;
        }
        Ok(Self { cache_dir })
    }

    pub fn get_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    /// True when the file exists and is younger than the TTL.
    pub fn is_cache_valid(&self, filename: &str) -> Result<bool> {
        let path = self.path_for(filename);
        if !path.exists() {
            return Ok(false);
        }

        let modified = fs::metadata(&path)?.modified()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        Ok(age < CACHE_TTL)
    }
}
