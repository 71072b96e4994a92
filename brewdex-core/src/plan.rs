// brewdex-core/src/plan.rs
//! Works out where a record's install targets would land. Nothing here
//! touches the filesystem.

use std::path::PathBuf;

use brewdex_common::config::Config;
use brewdex_common::model::{FormulaRecord, InstallCategory};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallStep {
    /// Artifact path inside the unpacked release.
    pub artifact: PathBuf,
    pub category: InstallCategory,
    /// Destination inside the keg.
    pub destination: PathBuf,
    /// Symlink in the shared prefix, for categories that get linked.
    pub link: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    pub name: String,
    pub version: String,
    pub keg_path: PathBuf,
    pub opt_link: PathBuf,
    pub steps: Vec<InstallStep>,
}

fn file_name_of(artifact: &std::path::Path) -> PathBuf {
    artifact
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| artifact.to_path_buf())
}

pub fn plan_install(config: &Config, record: &FormulaRecord) -> InstallPlan {
    let keg_path = config.formula_keg_path(&record.name, &record.version);
    let steps = record
        .install_targets
        .iter()
        .map(|target| {
            let file_name = file_name_of(&target.artifact);
            let destination = config
                .category_dir(&keg_path, target.category)
                .join(&file_name);
            // Only executables are linked into the shared prefix.
            let link = match target.category {
                InstallCategory::Bin => Some(config.bin_dir().join(&file_name)),
                InstallCategory::Sbin => Some(config.root().join("sbin").join(&file_name)),
                _ => None,
            };
            InstallStep {
                artifact: target.artifact.clone(),
                category: target.category,
                destination,
                link,
            }
        })
        .collect();

    InstallPlan {
        name: record.name.clone(),
        version: record.version.clone(),
        opt_link: config.formula_opt_path(&record.name),
        keg_path,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use brewdex_common::model::InstallTarget;

    use super::*;

    #[test]
    fn bin_targets_land_in_keg_and_get_linked() {
        let config = Config::with_root("/opt/homebrew");
        let mut record = FormulaRecord::new(
            "nepcal",
            "0.3.0",
            "https://github.com/nepcal/nepcal/archive/v0.3.0.tar.gz",
        );
        record
            .install_targets
            .push(InstallTarget::new("build/nepcal", InstallCategory::Bin));
        record
            .install_targets
            .push(InstallTarget::new("docs/nepcal.1", InstallCategory::Man));

        let plan = plan_install(&config, &record);
        assert_eq!(plan.keg_path, Path::new("/opt/homebrew/Cellar/nepcal/0.3.0"));
        assert_eq!(plan.opt_link, Path::new("/opt/homebrew/opt/nepcal"));
        assert_eq!(
            plan.steps[0].destination,
            Path::new("/opt/homebrew/Cellar/nepcal/0.3.0/bin/nepcal")
        );
        assert_eq!(
            plan.steps[0].link.as_deref(),
            Some(Path::new("/opt/homebrew/bin/nepcal"))
        );
        assert_eq!(
            plan.steps[1].destination,
            Path::new("/opt/homebrew/Cellar/nepcal/0.3.0/share/man/nepcal.1")
        );
        assert!(plan.steps[1].link.is_none());
    }
}
