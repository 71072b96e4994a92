// brewdex-core/src/formulary.rs
// Registry access for commands: scan the configured tap once, then serve
// from a JSON snapshot in the cache until it goes stale.

use std::path::{Path, PathBuf};

use brewdex_aio::json_io::{read_json_async, write_json_async};
use brewdex_common::cache::Cache;
use brewdex_common::config::Config;
use brewdex_common::error::{BrewdexError, Result};
use brewdex_common::model::FormulaRecord;
use brewdex_common::registry::FormulaRegistry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tap::{load_tap_async, IngestReport, TapIngestor};

pub const SNAPSHOT_FILE: &str = "formula.json";

#[derive(Serialize)]
struct SnapshotRef<'a> {
    tap_dir: &'a Path,
    records: Vec<&'a FormulaRecord>,
}

#[derive(Deserialize)]
struct Snapshot {
    tap_dir: PathBuf,
    records: Vec<FormulaRecord>,
}

pub struct Formulary {
    cache: Cache,
    tap_dir: PathBuf,
}

impl Formulary {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            cache: Cache::new(config)?,
            tap_dir: config.taps_dir().to_path_buf(),
        })
    }

    pub fn with_cache(cache: Cache, tap_dir: &Path) -> Self {
        Self {
            cache,
            tap_dir: tap_dir.to_path_buf(),
        }
    }

    pub fn tap_dir(&self) -> &Path {
        &self.tap_dir
    }

    /// Scans the tap directory and stores the accepted records as a snapshot.
    pub async fn refresh(&self) -> Result<(FormulaRegistry, IngestReport)> {
        let (registry, report) = load_tap_async(&self.tap_dir).await?;
        let snapshot = SnapshotRef {
            tap_dir: &self.tap_dir,
            records: registry.records().collect(),
        };
        write_json_async(&self.cache.path_for(SNAPSHOT_FILE), &snapshot).await?;
        debug!(
            "Stored snapshot of {} record(s) in {}",
            snapshot.records.len(),
            self.cache.get_dir().display()
        );
        Ok((registry, report))
    }

    /// Returns the registry from the snapshot, rescanning when the snapshot
    /// is missing or stale.
    pub async fn load(&self) -> Result<FormulaRegistry> {
        if self.cache.is_cache_valid(SNAPSHOT_FILE)? {
            match self.load_snapshot().await {
                Ok(registry) => return Ok(registry),
                Err(e) => warn!("Ignoring registry snapshot: {}", e),
            }
        }
        self.refresh().await.map(|(registry, _)| registry)
    }

    /// Rebuilds a registry from the snapshot. Records are validated again on
    /// the way in. A snapshot taken from another tap directory is an error.
    pub async fn load_snapshot(&self) -> Result<FormulaRegistry> {
        let path = self.cache.path_for(SNAPSHOT_FILE);
        let snapshot: Snapshot = read_json_async(&path).await?;
        if snapshot.tap_dir != self.tap_dir {
            return Err(BrewdexError::Cache(format!(
                "Snapshot was taken from {}, not {}",
                snapshot.tap_dir.display(),
                self.tap_dir.display()
            )));
        }
        let mut ingestor = TapIngestor::new();
        for record in snapshot.records {
            ingestor.ingest_record(&path, record);
        }
        let (registry, report) = ingestor.finish();
        if !report.is_clean() {
            warn!(
                "Registry snapshot {} contained {} rejected record(s)",
                path.display(),
                report.rejected()
            );
        }
        Ok(registry)
    }
}
