use std::fs;
use std::path::Path;

use brewdex_common::cache::Cache;
use brewdex_common::registry::{IngestError, LookupError};
use brewdex_core::formulary::{Formulary, SNAPSHOT_FILE};
use brewdex_core::{load_tap, load_tap_async};

fn formula_rb(url_owner: &str, version: &str, sha256: &str) -> String {
    format!(
        r#"class Nepcal < Formula
  desc "Equivalent of Linux's cal, for Nepali dates"
  homepage "https://github.com/nepcal/nepcal"
  url "https://github.com/{url_owner}/nepcal/archive/v{version}.tar.gz"
  head "https://github.com/{url_owner}/nepcal.git"
  version "{version}"
  sha256 "{sha256}"
  depends_on "make" => :build

  def install
    bin.install "nepcal"
  end
end
"#
    )
}

fn formula_json(version: &str, digest_char: char) -> String {
    let digest: String = std::iter::repeat_n(digest_char, 64).collect();
    format!(
        r#"{{
  "name": "nepcal",
  "description": "Equivalent of Linux's cal, for Nepali dates",
  "homepage": "https://github.com/nepcal/nepcal",
  "source_url": "https://github.com/nepcal/nepcal/releases/download/v{version}/nepcal_{version}_darwin_amd64.tar.gz",
  "version": "{version}",
  "checksum": {{ "algorithm": "sha256", "digest": "{digest}" }},
  "install_targets": [{{ "artifact": "nepcal", "category": "bin" }}]
}}"#
    )
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Lays out the nepcal tap: three Ruby formulas in different directories, a
/// duplicated 0.4.0 with diverging checksums and a 0.5.0 binary release.
fn nepcal_tap(root: &Path) {
    write(
        root,
        "brew/nepcal.rb",
        &formula_rb(
            "nepcal",
            "0.1.1",
            "dd78f37bba0daad312fe83bafc1abf75480ba7db86047e1aa0244c8a151fa94a",
        ),
    );
    write(
        root,
        "nepcal.rb",
        &formula_rb(
            "nepcal",
            "0.2.0",
            "e00c2012069dc7e69f85000e8d8e33e7c6e3ab74d1de4cda4ac629ce54b6a9fa",
        ),
    );
    write(
        root,
        "Formula/nepcal.rb",
        &formula_rb(
            "srishanbhattarai",
            "0.3.0",
            "e5033a604c00254779a93cf3194d27c82f30e428b131fcd2b9127b13ac484d71",
        ),
    );
    write(root, "releases/a/nepcal.json", &formula_json("0.4.0", 'a'));
    write(root, "releases/b/nepcal.json", &formula_json("0.4.0", 'b'));
    write(root, "releases/c/nepcal.json", &formula_json("0.5.0", 'c'));
}

#[test]
fn nepcal_tap_resolves_to_latest_release() {
    let dir = tempfile::tempdir().unwrap();
    nepcal_tap(dir.path());

    let (registry, report) = load_tap(dir.path()).unwrap();

    let canonical = registry.resolve_canonical("nepcal").unwrap();
    assert_eq!(canonical.version, "0.5.0");
    assert!(canonical.is_binary_only());

    let versions: Vec<&str> = registry
        .history("nepcal")
        .map(|record| record.version.as_str())
        .collect();
    assert_eq!(versions, ["0.1.1", "0.2.0", "0.3.0", "0.4.0", "0.5.0"]);

    assert_eq!(report.sources_scanned, 6);
    assert_eq!(report.added.len(), 5);
    assert_eq!(report.conflicts.len(), 1);
    let conflict = &report.conflicts[0];
    assert!(conflict.origin.path.ends_with("releases/b/nepcal.json"));
    assert!(conflict
        .conflicts_with
        .as_deref()
        .is_some_and(|p| p.ends_with("releases/a/nepcal.json")));
    assert!(matches!(
        conflict.error,
        IngestError::ConflictingRecord { ref fields, .. } if fields == &vec!["checksum"]
    ));

    // The first 0.4.0 in path order is the one kept.
    let kept = registry.get("nepcal", "0.4.0").unwrap();
    assert!(kept.checksum.as_ref().unwrap().digest.starts_with('a'));
}

#[test]
fn identical_copies_in_different_directories_are_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let rb = formula_rb(
        "nepcal",
        "0.2.0",
        "e00c2012069dc7e69f85000e8d8e33e7c6e3ab74d1de4cda4ac629ce54b6a9fa",
    );
    write(dir.path(), "Formula/nepcal.rb", &rb);
    write(dir.path(), "brew/nepcal.rb", &rb);

    let (registry, report) = load_tap(dir.path()).unwrap();
    assert_eq!(registry.history("nepcal").len(), 1);
    assert_eq!(report.duplicates.len(), 1);
    assert!(report.is_clean());
}

#[test]
fn bad_sources_are_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    nepcal_tap(dir.path());
    write(dir.path(), "broken/nepcal.rb", "class Nepcal < Formula\n  def install\n");
    write(dir.path(), "broken/garbage.json", "{ not json");
    // Binary-only release without a checksum.
    write(
        dir.path(),
        "broken/unsigned.json",
        r#"{ "name": "nepcal", "version": "0.6.0", "source_url": "https://example.com/nepcal-0.6.0.tar.gz" }"#,
    );

    let (registry, report) = load_tap(dir.path()).unwrap();
    assert_eq!(report.unreadable.len(), 2);
    assert_eq!(report.invalid.len(), 1);
    assert!(matches!(
        report.invalid[0].error,
        IngestError::InvalidRecord { .. }
    ));
    assert_eq!(registry.resolve_canonical("nepcal").unwrap().version, "0.5.0");
    assert_eq!(
        registry.resolve_canonical("unsigned").unwrap_err(),
        LookupError::UnknownPackage("unsigned".to_string())
    );
}

#[tokio::test]
async fn async_loader_matches_sync_loader() {
    let dir = tempfile::tempdir().unwrap();
    nepcal_tap(dir.path());

    let (sync_registry, _) = load_tap(dir.path()).unwrap();
    let (async_registry, report) = load_tap_async(dir.path()).await.unwrap();

    let sync_records: Vec<_> = sync_registry.records().cloned().collect();
    let async_records: Vec<_> = async_registry.records().cloned().collect();
    assert_eq!(sync_records, async_records);
    assert_eq!(report.conflicts.len(), 1);
}

#[tokio::test]
async fn formulary_serves_registry_from_snapshot() {
    let tap = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    nepcal_tap(tap.path());

    let cache = Cache::at(cache_dir.path()).unwrap();
    let formulary = Formulary::with_cache(cache, tap.path());
    let (scanned, _) = formulary.refresh().await.unwrap();
    assert!(cache_dir.path().join(SNAPSHOT_FILE).exists());

    // Removing the tap proves later loads come from the snapshot.
    fs::remove_dir_all(tap.path().join("releases")).unwrap();
    let loaded = formulary.load().await.unwrap();
    assert_eq!(loaded.len(), scanned.len());
    assert_eq!(loaded.resolve_canonical("nepcal").unwrap().version, "0.5.0");
}

#[tokio::test]
async fn snapshot_from_another_tap_is_not_reused() {
    let first_tap = tempfile::tempdir().unwrap();
    let second_tap = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    nepcal_tap(first_tap.path());
    write(
        second_tap.path(),
        "Formula/nepcal.rb",
        &formula_rb(
            "nepcal",
            "0.1.1",
            "dd78f37bba0daad312fe83bafc1abf75480ba7db86047e1aa0244c8a151fa94a",
        ),
    );

    let first = Formulary::with_cache(Cache::at(cache_dir.path()).unwrap(), first_tap.path());
    first.refresh().await.unwrap();

    let second = Formulary::with_cache(Cache::at(cache_dir.path()).unwrap(), second_tap.path());
    assert!(second.load_snapshot().await.is_err());
    let registry = second.load().await.unwrap();
    assert_eq!(registry.resolve_canonical("nepcal").unwrap().version, "0.1.1");
}
