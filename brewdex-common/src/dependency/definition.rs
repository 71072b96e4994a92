// brewdex-common/src/dependency/definition.rs
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// When a dependency is needed. Homebrew's `:test` dependencies fold into
/// `Build` since they are never needed by the installed binary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum DependencyPhase {
    Build,
    #[default]
    Runtime,
}

impl fmt::Display for DependencyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "build"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default)]
    pub phase: DependencyPhase,
}

impl Dependency {
    pub fn new_runtime(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phase: DependencyPhase::Runtime,
        }
    }

    pub fn new_build(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phase: DependencyPhase::Build,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.phase)
    }
}

pub trait DependencyExt {
    fn filter_by_phase(&self, phase: DependencyPhase) -> Vec<&Dependency>;
    fn runtime(&self) -> Vec<&Dependency>;
    fn build_time(&self) -> Vec<&Dependency>;
}

impl DependencyExt for BTreeSet<Dependency> {
    fn filter_by_phase(&self, phase: DependencyPhase) -> Vec<&Dependency> {
        self.iter().filter(|dep| dep.phase == phase).collect()
    }

    fn runtime(&self) -> Vec<&Dependency> {
        self.filter_by_phase(DependencyPhase::Runtime)
    }

    fn build_time(&self) -> Vec<&Dependency> {
        self.filter_by_phase(DependencyPhase::Build)
    }
}
