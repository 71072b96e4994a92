// brewdex-common/src/model/version.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{BrewdexError, Result};

/// Wrapper around semver::Version for formula versions.
///
/// Keeps the string the formula declared so that `Display` and serialization
/// reproduce it. Ordering and equality use semver precedence followed by the
/// Homebrew revision (`1.2.3_1`). Build metadata (`+sha.abc`) is ignored, so
/// `1.0.0+a` and `1.0.0+b` name the same release.
#[derive(Debug, Clone)]
pub struct Version {
    parsed: semver::Version,
    revision: u32,
    raw: String,
}

impl Version {
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(BrewdexError::VersionError(
                "Version string is empty".to_string(),
            ));
        }
        // Homebrew tags are often "v1.2.3"
        let unprefixed = raw
            .strip_prefix('v')
            .or_else(|| raw.strip_prefix('V'))
            .unwrap_or(raw);

        // Homebrew marks formula revisions as "1.2.3_1".
        let (base, revision) = match unprefixed.rsplit_once('_') {
            Some((base, rev)) if !rev.is_empty() && rev.bytes().all(|b| b.is_ascii_digit()) => {
                let revision = rev.parse::<u32>().map_err(|e| {
                    BrewdexError::VersionError(format!(
                        "Invalid revision in version '{raw}': {e}"
                    ))
                })?;
                (base, revision)
            }
            _ => (unprefixed, 0),
        };

        let parsed = semver::Version::parse(base).or_else(|_| {
            // Short forms like "1.2".
            let parts: Vec<&str> = base.split('.').collect();
            let padded = match parts.len() {
                1 => format!("{}.0.0", parts[0]),
                2 => format!("{}.{}.0", parts[0], parts[1]),
                _ => base.to_string(),
            };
            semver::Version::parse(&padded).map_err(|e| {
                BrewdexError::VersionError(format!(
                    "Failed to parse version '{raw}' (tried '{padded}'): {e}"
                ))
            })
        })?;

        Ok(Self {
            parsed,
            revision,
            raw: raw.to_string(),
        })
    }

    pub fn major(&self) -> u64 {
        self.parsed.major
    }

    pub fn minor(&self) -> u64 {
        self.parsed.minor
    }

    pub fn patch(&self) -> u64 {
        self.parsed.patch
    }

    /// Homebrew formula revision, 0 when the version has no `_N` suffix.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// The string as written in the formula source.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn semver(&self) -> &semver::Version {
        &self.parsed
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.parsed
            .cmp_precedence(&other.parsed)
            .then(self.revision.cmp(&other.revision))
    }
}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Must agree with `cmp`, which skips build metadata.
        self.parsed.major.hash(state);
        self.parsed.minor.hash(state);
        self.parsed.patch.hash(state);
        self.parsed.pre.hash(state);
        self.revision.hash(state);
    }
}

impl FromStr for Version {
    type Err = BrewdexError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl From<Version> for semver::Version {
    fn from(version: Version) -> Self {
        version.parsed
    }
}

// Manual Serialize/Deserialize to handle the Version<->String conversion
impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::from_str(&s).map_err(serde::de::Error::custom)
    }
}
