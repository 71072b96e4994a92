// brewdex-common/src/config.rs
use std::env;
use std::path::{Path, PathBuf};

use directories::UserDirs;
use tracing::debug;

use super::error::{BrewdexError, Result};
use crate::model::InstallCategory;

// Used when neither BREWDEX_ROOT nor HOMEBREW_PREFIX is set.
const DEFAULT_FALLBACK_ROOT: &str = "/opt/homebrew";

#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    /// Directory scanned for formula sources. Defaults to `<root>/Library/Taps`.
    pub tap_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading brewdex configuration");

        let root_str = env::var("BREWDEX_ROOT")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| env::var("HOMEBREW_PREFIX").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| {
                debug!(
                    "BREWDEX_ROOT and HOMEBREW_PREFIX not set, falling back to default: {}",
                    DEFAULT_FALLBACK_ROOT
                );
                DEFAULT_FALLBACK_ROOT.to_string()
            });
        let root = PathBuf::from(&root_str);
        if root.is_relative() {
            return Err(BrewdexError::Config(format!(
                "Root directory must be an absolute path, got '{root_str}'"
            )));
        }
        debug!("Effective root set to: {}", root.display());

        let tap_dir = env::var("BREWDEX_TAP_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|dir| expand_home(&dir))
            .unwrap_or_else(|| root.join("Library/Taps"));

        debug!("Configuration loaded successfully.");
        Ok(Self { root, tap_dir })
    }

    /// Builds a config rooted at `root` without reading the environment.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let tap_dir = root.join("Library/Taps");
        Self { root, tap_dir }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn taps_dir(&self) -> &Path {
        &self.tap_dir
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn cellar_dir(&self) -> PathBuf {
        self.root.join("Cellar")
    }

    pub fn opt_dir(&self) -> PathBuf {
        self.root.join("opt")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("brewdex_cache")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("brewdex_logs")
    }

    pub fn formula_cellar_dir(&self, formula_name: &str) -> PathBuf {
        self.cellar_dir().join(formula_name)
    }

    pub fn formula_keg_path(&self, formula_name: &str, version_str: &str) -> PathBuf {
        self.formula_cellar_dir(formula_name).join(version_str)
    }

    pub fn formula_opt_path(&self, formula_name: &str) -> PathBuf {
        self.opt_dir().join(formula_name)
    }

    /// Real directory behind a destination category, inside a keg.
    pub fn category_dir(&self, keg_path: &Path, category: InstallCategory) -> PathBuf {
        match category.relative_dir() {
            "" => keg_path.to_path_buf(),
            rel => keg_path.join(rel),
        }
    }
}

/// Expands a leading `~/` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => UserDirs::new()
            .map_or_else(|| PathBuf::from(path), |ud| ud.home_dir().join(rest)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_follow_homebrew_layout() {
        let config = Config::with_root("/opt/homebrew");
        assert_eq!(config.taps_dir(), Path::new("/opt/homebrew/Library/Taps"));
        assert_eq!(
            config.formula_keg_path("nepcal", "0.3.0"),
            PathBuf::from("/opt/homebrew/Cellar/nepcal/0.3.0")
        );
    }

    #[test]
    fn category_dirs_map_into_the_keg() {
        let config = Config::with_root("/usr/local");
        let keg = config.formula_keg_path("nepcal", "0.3.0");
        assert_eq!(
            config.category_dir(&keg, InstallCategory::Bin),
            keg.join("bin")
        );
        assert_eq!(
            config.category_dir(&keg, InstallCategory::Man),
            keg.join("share/man")
        );
        assert_eq!(config.category_dir(&keg, InstallCategory::Prefix), keg);
    }

    #[test]
    fn expand_home_leaves_absolute_paths_alone() {
        assert_eq!(expand_home("/srv/taps"), PathBuf::from("/srv/taps"));
    }
}
