// brewdex-core/src/tap.rs
//! Loads every formula source under a tap directory into a registry.
//!
//! A bad file never aborts the load. Parse failures, invalid records and
//! conflicting duplicates are collected in an [`IngestReport`] so the caller
//! decides what to surface.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use brewdex_aio::fs::discover_formula_files;
use brewdex_common::error::{BrewdexError, Result};
use brewdex_common::model::{FormulaRecord, Version};
use brewdex_common::registry::{FormulaRegistry, IngestError, IngestOutcome};
use tracing::{debug, info, warn};

use crate::parse::{parse_formula_file, parse_formula_file_async};

/// Where an accepted or absorbed record came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOrigin {
    pub path: PathBuf,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct Rejection {
    pub origin: RecordOrigin,
    pub error: IngestError,
    /// For conflicts, the file whose record was kept.
    pub conflicts_with: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub path: PathBuf,
    pub error: BrewdexError,
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub sources_scanned: usize,
    pub added: Vec<RecordOrigin>,
    pub duplicates: Vec<RecordOrigin>,
    pub conflicts: Vec<Rejection>,
    pub invalid: Vec<Rejection>,
    pub unreadable: Vec<SourceFailure>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.invalid.is_empty() && self.unreadable.is_empty()
    }

    pub fn rejected(&self) -> usize {
        self.conflicts.len() + self.invalid.len()
    }
}

/// Feeds parsed records into a registry while remembering which file each
/// accepted record came from.
#[derive(Debug, Default)]
pub struct TapIngestor {
    registry: FormulaRegistry,
    report: IngestReport,
    origins: HashMap<(String, Version), PathBuf>,
}

impl TapIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests the records parsed from one source file.
    pub fn ingest_source(&mut self, path: &Path, parsed: Result<Vec<FormulaRecord>>) {
        self.report.sources_scanned += 1;
        let records = match parsed {
            Ok(records) => records,
            Err(error) => {
                warn!("Skipping unreadable formula {}: {}", path.display(), error);
                self.report.unreadable.push(SourceFailure {
                    path: path.to_path_buf(),
                    error,
                });
                return;
            }
        };

        for record in records {
            self.ingest_record(path, record);
        }
    }

    pub fn ingest_record(&mut self, path: &Path, record: FormulaRecord) {
        let origin = RecordOrigin {
            path: path.to_path_buf(),
            name: record.name.clone(),
            version: record.version.clone(),
        };
        let parsed_version = record.parsed_version().ok();

        match self.registry.ingest(record) {
            Ok(IngestOutcome::Added) => {
                if let Some(version) = parsed_version {
                    self.origins
                        .insert((origin.name.clone(), version), origin.path.clone());
                }
                self.report.added.push(origin);
            }
            Ok(IngestOutcome::Duplicate) => {
                debug!(
                    "{} {} from {} duplicates an existing record",
                    origin.name,
                    origin.version,
                    origin.path.display()
                );
                self.report.duplicates.push(origin);
            }
            Err(error @ IngestError::ConflictingRecord { .. }) => {
                let conflicts_with = parsed_version.and_then(|version| {
                    self.origins.get(&(origin.name.clone(), version)).cloned()
                });
                warn!("{} ({})", error, origin.path.display());
                self.report.conflicts.push(Rejection {
                    origin,
                    error,
                    conflicts_with,
                });
            }
            Err(error) => {
                warn!("{} ({})", error, origin.path.display());
                self.report.invalid.push(Rejection {
                    origin,
                    error,
                    conflicts_with: None,
                });
            }
        }
    }

    pub fn finish(self) -> (FormulaRegistry, IngestReport) {
        info!(
            "Ingested {} formula record(s) from {} source(s): {} duplicate, {} conflicting, {} invalid, {} unreadable",
            self.report.added.len(),
            self.report.sources_scanned,
            self.report.duplicates.len(),
            self.report.conflicts.len(),
            self.report.invalid.len(),
            self.report.unreadable.len()
        );
        (self.registry, self.report)
    }
}

/// Scans `root` recursively and ingests every formula source found, in
/// sorted path order.
pub fn load_tap(root: &Path) -> Result<(FormulaRegistry, IngestReport)> {
    let files = discover_formula_files(root)?;
    let mut ingestor = TapIngestor::new();
    for path in &files {
        ingestor.ingest_source(path, parse_formula_file(path));
    }
    Ok(ingestor.finish())
}

/// Async variant of [`load_tap`]. Files are read with tokio; ingestion
/// order is the same as the sync loader.
pub async fn load_tap_async(root: &Path) -> Result<(FormulaRegistry, IngestReport)> {
    let root_buf = root.to_path_buf();
    let files = tokio::task::spawn_blocking(move || discover_formula_files(&root_buf))
        .await
        .map_err(|e| BrewdexError::Generic(format!("Tap discovery task failed: {e}")))??;

    let mut ingestor = TapIngestor::new();
    for path in &files {
        let parsed = parse_formula_file_async(path).await;
        ingestor.ingest_source(path, parsed);
    }
    Ok(ingestor.finish())
}
