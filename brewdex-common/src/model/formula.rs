// brewdex-common/src/model/formula.rs
// One declared version of a package, as read from a formula source.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::version::Version;
use crate::dependency::Dependency;
use crate::error::{BrewdexError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    #[default]
    Sha256,
}

impl ChecksumAlgorithm {
    /// Length of the hex encoded digest.
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// A content hash paired with the algorithm that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checksum {
    #[serde(default)]
    pub algorithm: ChecksumAlgorithm,
    pub digest: String,
}

impl Checksum {
    pub fn sha256(digest: impl Into<String>) -> Self {
        Self {
            algorithm: ChecksumAlgorithm::Sha256,
            digest: digest.into().trim().to_ascii_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.digest.trim().is_empty()
    }

    pub fn is_well_formed(&self) -> bool {
        let digest = self.digest.trim();
        digest.len() == self.algorithm.hex_len() && digest.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Case-insensitive comparison against a computed hex digest.
    pub fn matches(&self, actual_hex: &str) -> bool {
        self.digest.trim().eq_ignore_ascii_case(actual_hex.trim())
    }
}

impl PartialEq for Checksum {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.matches(&other.digest)
    }
}

impl Eq for Checksum {}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

/// Symbolic install location, as used by `bin.install "foo"` in a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallCategory {
    Bin,
    Sbin,
    Lib,
    Libexec,
    Include,
    Share,
    Man,
    Etc,
    Prefix,
}

impl InstallCategory {
    /// Directory relative to the keg root. `Prefix` is the keg root itself.
    pub fn relative_dir(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Sbin => "sbin",
            Self::Lib => "lib",
            Self::Libexec => "libexec",
            Self::Include => "include",
            Self::Share => "share",
            Self::Man => "share/man",
            Self::Etc => "etc",
            Self::Prefix => "",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Sbin => "sbin",
            Self::Lib => "lib",
            Self::Libexec => "libexec",
            Self::Include => "include",
            Self::Share => "share",
            Self::Man => "man",
            Self::Etc => "etc",
            Self::Prefix => "prefix",
        }
    }
}

impl FromStr for InstallCategory {
    type Err = BrewdexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bin" => Ok(Self::Bin),
            "sbin" => Ok(Self::Sbin),
            "lib" => Ok(Self::Lib),
            "libexec" => Ok(Self::Libexec),
            "include" => Ok(Self::Include),
            "share" => Ok(Self::Share),
            "man" => Ok(Self::Man),
            "etc" => Ok(Self::Etc),
            "prefix" => Ok(Self::Prefix),
            other => Err(BrewdexError::ParseError(
                "install category".to_string(),
                format!("unknown destination '{other}'"),
            )),
        }
    }
}

impl fmt::Display for InstallCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallTarget {
    /// Path of the artifact inside the unpacked release.
    pub artifact: PathBuf,
    pub category: InstallCategory,
}

impl InstallTarget {
    pub fn new(artifact: impl Into<PathBuf>, category: InstallCategory) -> Self {
        Self {
            artifact: artifact.into(),
            category,
        }
    }
}

/// A single formula revision. Never mutated once created; a new version of
/// the package is a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub homepage: String,
    pub source_url: String,
    /// Live source reference (`head`). Absent for binary-only releases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_url: Option<String>,
    /// Declared version string, parsed when the record is ingested.
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Checksum>,
    #[serde(default)]
    pub build_dependencies: BTreeSet<Dependency>,
    #[serde(default)]
    pub install_targets: Vec<InstallTarget>,
}

impl FormulaRecord {
    /// Creates a record with only the identifying fields set.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            homepage: String::new(),
            source_url: source_url.into(),
            dev_url: None,
            version: version.into(),
            checksum: None,
            build_dependencies: BTreeSet::new(),
            install_targets: Vec::new(),
        }
    }

    pub fn parsed_version(&self) -> Result<Version> {
        Version::parse(&self.version)
    }

    /// True when no `head` reference exists, so the release can only be
    /// obtained as the prebuilt artifact at `source_url`.
    pub fn is_binary_only(&self) -> bool {
        self.dev_url
            .as_deref()
            .is_none_or(|dev| dev.trim().is_empty())
    }

    pub fn has_checksum(&self) -> bool {
        self.checksum.as_ref().is_some_and(|c| !c.is_empty())
    }
}
