// brewdex-common/src/registry.rs
//! Versioned formula registry.
//!
//! Every accepted [`FormulaRecord`] lands in a per-name history ordered by
//! parsed version. The canonical record for a name is the last entry of its
//! history. Records sharing a name and version must be identical: an exact
//! repeat is absorbed, a differing one is rejected and the history is left
//! untouched.

use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::model::{FormulaRecord, Version};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("Invalid formula record '{name}': {reason}")]
    InvalidRecord { name: String, reason: String },

    #[error("Conflicting formula record for {name} {version}: differs in {}", fields.join(", "))]
    ConflictingRecord {
        name: String,
        version: String,
        fields: Vec<&'static str>,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    #[error("Package '{name}' has no version {version}")]
    UnknownVersion { name: String, version: String },
}

/// What a successful [`FormulaRegistry::ingest`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The record was new and is now part of the history.
    Added,
    /// An identical record was already present; nothing changed.
    Duplicate,
}

type VersionHistory = BTreeMap<Version, Arc<FormulaRecord>>;

#[derive(Debug, Clone, Default)]
pub struct FormulaRegistry {
    packages: BTreeMap<String, VersionHistory>,
}

impl FormulaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `record` and adds it to the history of its package.
    ///
    /// Nothing is mutated when an error is returned.
    pub fn ingest(&mut self, record: FormulaRecord) -> Result<IngestOutcome, IngestError> {
        let version = validate(&record)?;

        if let Some(existing) = self
            .packages
            .get(&record.name)
            .and_then(|history| history.get(&version))
        {
            if **existing == record {
                debug!(
                    "Formula '{}' {} already registered, skipping duplicate.",
                    record.name, record.version
                );
                return Ok(IngestOutcome::Duplicate);
            }
            let fields = differing_fields(existing, &record);
            warn!(
                "Rejecting formula '{}' {}: conflicts with registered record ({})",
                record.name,
                record.version,
                fields.join(", ")
            );
            return Err(IngestError::ConflictingRecord {
                name: record.name,
                version: record.version,
                fields,
            });
        }

        debug!("Registered formula '{}' {}", record.name, record.version);
        self.packages
            .entry(record.name.clone())
            .or_default()
            .insert(version, Arc::new(record));
        Ok(IngestOutcome::Added)
    }

    /// Highest accepted version of `name`.
    pub fn resolve_canonical(&self, name: &str) -> Result<&FormulaRecord, LookupError> {
        self.canonical_entry(name).map(|record| &**record)
    }

    /// Exact lookup of one version of `name`.
    pub fn get(&self, name: &str, version: &str) -> Result<&FormulaRecord, LookupError> {
        let history = self
            .packages
            .get(name)
            .ok_or_else(|| LookupError::UnknownPackage(name.to_string()))?;
        let unknown_version = || LookupError::UnknownVersion {
            name: name.to_string(),
            version: version.to_string(),
        };
        let parsed = Version::parse(version).map_err(|_| unknown_version())?;
        history
            .get(&parsed)
            .map(|record| &**record)
            .ok_or_else(unknown_version)
    }

    /// Accepted records of `name`, ascending by version. Empty for unknown
    /// names. The iterator can be cloned to restart it.
    pub fn history(&self, name: &str) -> History<'_> {
        History {
            inner: self.packages.get(name).map(|history| history.values()),
        }
    }

    /// Names with at least one accepted record.
    pub fn all_packages(&self) -> BTreeSet<&str> {
        self.packages.keys().map(String::as_str).collect()
    }

    /// Every accepted record, by name then ascending version.
    pub fn records(&self) -> impl Iterator<Item = &FormulaRecord> + '_ {
        self.packages
            .values()
            .flat_map(|history| history.values())
            .map(|record| &**record)
    }

    /// Number of accepted records across all packages.
    pub fn len(&self) -> usize {
        self.packages.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn canonical_entry(&self, name: &str) -> Result<&Arc<FormulaRecord>, LookupError> {
        self.packages
            .get(name)
            .and_then(|history| history.values().next_back())
            .ok_or_else(|| LookupError::UnknownPackage(name.to_string()))
    }
}

/// Ascending version history of one package. See [`FormulaRegistry::history`].
#[derive(Debug, Clone)]
pub struct History<'a> {
    inner: Option<btree_map::Values<'a, Version, Arc<FormulaRecord>>>,
}

impl<'a> Iterator for History<'a> {
    type Item = &'a FormulaRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next().map(|record| &**record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner
            .as_ref()
            .map_or((0, Some(0)), |values| values.size_hint())
    }
}

impl DoubleEndedIterator for History<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next_back().map(|record| &**record)
    }
}

impl ExactSizeIterator for History<'_> {}

/// Thread-safe handle around a [`FormulaRegistry`].
///
/// All access goes through one mutex, so ingests are linearised and every
/// query sees a consistent state. Queries hand back `Arc`s rather than
/// borrows so the lock is released before the caller uses the result.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<Mutex<FormulaRegistry>>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&self, record: FormulaRecord) -> Result<IngestOutcome, IngestError> {
        self.lock().ingest(record)
    }

    pub fn resolve_canonical(&self, name: &str) -> Result<Arc<FormulaRecord>, LookupError> {
        self.lock().canonical_entry(name).map(Arc::clone)
    }

    pub fn history(&self, name: &str) -> Vec<Arc<FormulaRecord>> {
        self.lock()
            .packages
            .get(name)
            .map(|history| history.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn all_packages(&self) -> BTreeSet<String> {
        self.lock().packages.keys().cloned().collect()
    }

    /// Point-in-time copy of the registry. Records are shared, not cloned.
    pub fn snapshot(&self) -> FormulaRegistry {
        self.lock().clone()
    }

    // A panic while holding the lock cannot leave a half-applied ingest
    // behind, so a poisoned lock is still safe to read.
    fn lock(&self) -> MutexGuard<'_, FormulaRegistry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<FormulaRegistry> for SharedRegistry {
    fn from(registry: FormulaRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }
}

fn invalid(record: &FormulaRecord, reason: impl Into<String>) -> IngestError {
    IngestError::InvalidRecord {
        name: record.name.clone(),
        reason: reason.into(),
    }
}

fn check_url(record: &FormulaRecord, field: &str, value: &str) -> Result<(), IngestError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| invalid(record, format!("{field} '{value}' is not a valid URL: {e}")))
}

/// Checks the record invariants and returns its parsed version.
fn validate(record: &FormulaRecord) -> Result<Version, IngestError> {
    let name = record.name.as_str();
    if name.is_empty() {
        return Err(invalid(record, "name is empty"));
    }
    if name.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(invalid(
            record,
            "name must not contain whitespace or '/'",
        ));
    }

    let version = record
        .parsed_version()
        .map_err(|e| invalid(record, e.to_string()))?;

    if record.source_url.trim().is_empty() {
        return Err(invalid(record, "source_url is empty"));
    }
    check_url(record, "source_url", &record.source_url)?;
    if !record.homepage.trim().is_empty() {
        check_url(record, "homepage", &record.homepage)?;
    }
    if let Some(dev_url) = record.dev_url.as_deref().filter(|u| !u.trim().is_empty()) {
        check_url(record, "dev_url", dev_url)?;
    }

    match &record.checksum {
        Some(checksum) if !checksum.is_empty() => {
            if !checksum.is_well_formed() {
                return Err(invalid(
                    record,
                    format!(
                        "checksum '{}' is not a valid {} digest",
                        checksum.digest, checksum.algorithm
                    ),
                ));
            }
        }
        _ if record.is_binary_only() => {
            return Err(invalid(
                record,
                "checksum is required for a binary-only release",
            ));
        }
        _ => {}
    }

    if let Some(dep) = record
        .build_dependencies
        .iter()
        .find(|dep| dep.name.trim().is_empty())
    {
        return Err(invalid(
            record,
            format!("dependency with empty name ({})", dep.phase),
        ));
    }
    if record
        .install_targets
        .iter()
        .any(|target| target.artifact.as_os_str().is_empty())
    {
        return Err(invalid(record, "install target with empty artifact path"));
    }

    Ok(version)
}

fn differing_fields(a: &FormulaRecord, b: &FormulaRecord) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if a.version != b.version {
        fields.push("version");
    }
    if a.description != b.description {
        fields.push("description");
    }
    if a.homepage != b.homepage {
        fields.push("homepage");
    }
    if a.source_url != b.source_url {
        fields.push("source_url");
    }
    if a.dev_url != b.dev_url {
        fields.push("dev_url");
    }
    if a.checksum != b.checksum {
        fields.push("checksum");
    }
    if a.build_dependencies != b.build_dependencies {
        fields.push("build_dependencies");
    }
    if a.install_targets != b.install_targets {
        fields.push("install_targets");
    }
    fields
}
