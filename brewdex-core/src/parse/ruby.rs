// brewdex-core/src/parse/ruby.rs
// Reads the declarative subset of the Homebrew formula DSL.
//
// Only the stanzas that describe a release are understood: desc, homepage,
// url, head, version, sha256, depends_on and `<dir>.install` calls inside
// `def install`. Everything else (bottle blocks, resources, tests, patches)
// is skipped.

use brewdex_common::dependency::Dependency;
use brewdex_common::error::{BrewdexError, Result};
use brewdex_common::model::{Checksum, FormulaRecord, InstallCategory, InstallTarget};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

lazy_static! {
    static ref CLASS_RE: Regex =
        Regex::new(r"^class\s+([A-Z][A-Za-z0-9_]*)\s*<\s*Formula\b").unwrap();
    static ref FIELD_RE: Regex = Regex::new(
        r#"^(desc|homepage|url|head|version|sha256)\s*\(?\s*"((?:[^"\\]|\\.)*)""#
    )
    .unwrap();
    static ref DEPENDS_RE: Regex = Regex::new(
        r#"^depends_on\s*\(?\s*"([^"]+)"(?:\s*=>\s*(\[[^\]]*\]|:\w+))?"#
    )
    .unwrap();
    static ref INSTALL_RE: Regex = Regex::new(
        r"^(bin|sbin|lib|libexec|include|share|man|etc|prefix)\.install\s*\(?\s*(.+)$"
    )
    .unwrap();
    static ref STRING_ARG_RE: Regex =
        Regex::new(r#""((?:[^"\\]|\\.)*)"(\s*=>\s*"(?:[^"\\]|\\.)*")?"#).unwrap();
    static ref WORD_LIST_RE: Regex = Regex::new(r"%w[\[(]([^\])]*)[\])]").unwrap();
    static ref BLOCK_OPEN_RE: Regex = Regex::new(r"\bdo(\s*\|[^|]*\|)?$").unwrap();
    static ref KEYWORD_OPEN_RE: Regex =
        Regex::new(r"^(if|unless|case|begin|while|until)\b").unwrap();
    static ref PLATFORM_BLOCK_RE: Regex = Regex::new(r"^on_[a-z0-9_]+\b").unwrap();
    static ref PLATFORM_CONDITION_RE: Regex =
        Regex::new(r"^(if|unless)\s+(Hardware::CPU|OS)\.").unwrap();
    static ref HEREDOC_RE: Regex = Regex::new(r#"<<[~-]?['"]?([A-Z_][A-Z0-9_]*)['"]?"#).unwrap();
    static ref DEF_RE: Regex = Regex::new(r"^def\s+([A-Za-z_][A-Za-z0-9_?!]*)").unwrap();
    static ref URL_VERSION_RE: Regex = Regex::new(r"(\d+(?:\.\d+)+)").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Class,
    Head,
    Stable,
    /// `on_macos`/`on_arm` blocks and `if Hardware::CPU.intel?` branches.
    /// The first url and sha256 found in any of them wins.
    Platform,
    Def(String),
    Other,
}

#[derive(Debug, Default)]
struct Scanned {
    class_name: Option<String>,
    desc: Option<String>,
    homepage: Option<String>,
    url: Option<String>,
    head: Option<String>,
    version: Option<String>,
    sha256: Option<String>,
    dependencies: Vec<Dependency>,
    installs: Vec<InstallTarget>,
}

/// Parses Ruby formula text into a record.
///
/// `name_hint` is the file stem the formula was read from; Homebrew names a
/// formula after its file. Without a hint the name is derived from the class
/// name.
pub fn parse_ruby_formula(source: &str, name_hint: Option<&str>) -> Result<FormulaRecord> {
    let scanned = scan(source)?;

    let class_name = scanned.class_name.ok_or_else(|| {
        BrewdexError::ParseError(
            "ruby formula".to_string(),
            "no `class <Name> < Formula` declaration found".to_string(),
        )
    })?;
    let class_derived = class_to_formula_name(&class_name);
    let name = match name_hint {
        Some(hint) if !hint.is_empty() => {
            if hint != class_derived {
                debug!(
                    "Formula file '{}' declares class {} (expected name '{}')",
                    hint, class_name, class_derived
                );
            }
            hint.to_string()
        }
        _ => class_derived,
    };

    let raw_url = scanned.url.unwrap_or_default();
    let version = scanned
        .version
        .or_else(|| version_from_url(&raw_url))
        .unwrap_or_default();
    if version.is_empty() {
        warn!("Formula '{}' has no version and none could be inferred from its url", name);
    }

    let mut record = FormulaRecord::new(name, version.clone(), interpolate(&raw_url, &version));
    record.description = scanned.desc.unwrap_or_default();
    record.homepage = scanned.homepage.unwrap_or_default();
    record.dev_url = scanned.head.map(|head| interpolate(&head, &version));
    record.checksum = scanned.sha256.map(Checksum::sha256);
    record.build_dependencies = scanned.dependencies.into_iter().collect();
    record.install_targets = scanned.installs;
    Ok(record)
}

fn scan(source: &str) -> Result<Scanned> {
    let mut scanned = Scanned::default();
    let mut scopes: Vec<Scope> = Vec::new();
    let mut heredoc: Option<String> = None;

    for (index, raw_line) in source.lines().enumerate() {
        if let Some(terminator) = &heredoc {
            if raw_line.trim() == terminator {
                heredoc = None;
            }
            continue;
        }

        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        // The body is skipped from the next line on.
        if let Some(caps) = HEREDOC_RE.captures(line) {
            heredoc = Some(caps[1].to_string());
        }

        if line == "end" || line.starts_with("end ") || line.starts_with("end.") {
            if scopes.pop().is_none() {
                return Err(BrewdexError::ParseError(
                    "ruby formula".to_string(),
                    format!("unbalanced `end` on line {}", index + 1),
                ));
            }
            continue;
        }

        if let Some(caps) = CLASS_RE.captures(line) {
            if scanned.class_name.is_none() {
                scanned.class_name = Some(caps[1].to_string());
            }
            scopes.push(Scope::Class);
            continue;
        }

        if let Some(caps) = DEF_RE.captures(line) {
            scopes.push(Scope::Def(caps[1].to_string()));
            continue;
        }

        let top = scopes.last().cloned();
        let in_install = scopes
            .iter()
            .any(|scope| matches!(scope, Scope::Def(name) if name == "install"));

        if in_install {
            if let Some(caps) = INSTALL_RE.captures(line) {
                // The regex only admits known category names.
                if let Ok(category) = caps[1].parse::<InstallCategory>() {
                    for artifact in install_arguments(&caps[2]) {
                        scanned.installs.push(InstallTarget::new(artifact, category));
                    }
                }
            }
        } else {
            match top {
                Some(Scope::Class) | Some(Scope::Stable) | Some(Scope::Platform) => {
                    record_stanza(&mut scanned, line)
                }
                Some(Scope::Head) => {
                    if let Some(caps) = FIELD_RE.captures(line) {
                        if &caps[1] == "url" {
                            scanned.head = Some(unescape(&caps[2]));
                        }
                    }
                }
                _ => {}
            }
        }

        if BLOCK_OPEN_RE.is_match(line) {
            let scope = if line.starts_with("head ") || line == "head do" {
                Scope::Head
            } else if line.starts_with("stable ") || line == "stable do" {
                Scope::Stable
            } else if PLATFORM_BLOCK_RE.is_match(line) {
                Scope::Platform
            } else {
                Scope::Other
            };
            scopes.push(scope);
        } else if KEYWORD_OPEN_RE.is_match(line) {
            let carries_stanzas = matches!(
                top,
                Some(Scope::Class) | Some(Scope::Stable) | Some(Scope::Platform)
            );
            let scope = if carries_stanzas && PLATFORM_CONDITION_RE.is_match(line) {
                Scope::Platform
            } else {
                Scope::Other
            };
            scopes.push(scope);
        }
    }

    if let Some(terminator) = heredoc {
        return Err(BrewdexError::ParseError(
            "ruby formula".to_string(),
            format!("heredoc `{terminator}` is never terminated"),
        ));
    }

    if !scopes.is_empty() {
        return Err(BrewdexError::ParseError(
            "ruby formula".to_string(),
            format!("{} block(s) left open at end of file", scopes.len()),
        ));
    }
    Ok(scanned)
}

fn record_stanza(scanned: &mut Scanned, line: &str) {
    if let Some(caps) = FIELD_RE.captures(line) {
        let value = unescape(&caps[2]);
        let slot = match &caps[1] {
            "desc" => &mut scanned.desc,
            "homepage" => &mut scanned.homepage,
            "url" => &mut scanned.url,
            "head" => &mut scanned.head,
            "version" => &mut scanned.version,
            "sha256" => &mut scanned.sha256,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
        return;
    }

    if let Some(caps) = DEPENDS_RE.captures(line) {
        let name = caps[1].to_string();
        let tags = caps.get(2).map_or("", |m| m.as_str());
        let dependency = if tags.contains(":build") || tags.contains(":test") {
            Dependency::new_build(name)
        } else {
            Dependency::new_runtime(name)
        };
        scanned.dependencies.push(dependency);
    }
}

/// Artifacts named by an install call: quoted strings (the source side of
/// `"a" => "b"` renames) or a `%w[...]` word list.
fn install_arguments(args: &str) -> Vec<String> {
    if let Some(caps) = WORD_LIST_RE.captures(args) {
        return caps[1].split_whitespace().map(str::to_string).collect();
    }
    STRING_ARG_RE
        .captures_iter(args)
        .map(|caps| unescape(&caps[1]))
        .collect()
}

fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn interpolate(value: &str, version: &str) -> String {
    if version.is_empty() {
        value.to_string()
    } else {
        value.replace("#{version}", version)
    }
}

/// Guesses the version from a release URL such as `.../archive/v0.2.0.tar.gz`.
pub fn version_from_url(url: &str) -> Option<String> {
    let file = url.rsplit('/').next()?;
    let stem = [".tar.gz", ".tar.bz2", ".tar.xz", ".tgz", ".tar", ".zip"]
        .iter()
        .find_map(|ext| file.strip_suffix(ext))
        .unwrap_or(file);
    URL_VERSION_RE
        .find_iter(stem)
        .last()
        .map(|m| m.as_str().to_string())
}

/// `NepcalCli` -> `nepcal-cli`.
pub fn class_to_formula_name(class_name: &str) -> String {
    let mut name = String::with_capacity(class_name.len() + 4);
    for (i, c) in class_name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                name.push('-');
            }
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use brewdex_common::dependency::{DependencyExt, DependencyPhase};

    use super::*;

    const NEPCAL_0_2_0: &str = r#"class Nepcal < Formula
  desc "Equivalent of Linux's cal, for Nepali dates"
  homepage "https://github.com/nepcal/nepcal"
  url "https://github.com/nepcal/nepcal/archive/v0.2.0.tar.gz"
  head "https://github.com/nepcal/nepcal.git"
  version "0.2.0"
  sha256 "e00c2012069dc7e69f85000e8d8e33e7c6e3ab74d1de4cda4ac629ce54b6a9fa"
  depends_on "make" => :build

  def install
    bin.install "nepcal"
  end
end
"#;

    #[test]
    fn parses_release_formula() {
        let record = parse_ruby_formula(NEPCAL_0_2_0, Some("nepcal")).unwrap();
        assert_eq!(record.name, "nepcal");
        assert_eq!(record.version, "0.2.0");
        assert_eq!(record.description, "Equivalent of Linux's cal, for Nepali dates");
        assert_eq!(record.homepage, "https://github.com/nepcal/nepcal");
        assert_eq!(
            record.source_url,
            "https://github.com/nepcal/nepcal/archive/v0.2.0.tar.gz"
        );
        assert_eq!(
            record.dev_url.as_deref(),
            Some("https://github.com/nepcal/nepcal.git")
        );
        assert_eq!(
            record.checksum,
            Some(Checksum::sha256(
                "e00c2012069dc7e69f85000e8d8e33e7c6e3ab74d1de4cda4ac629ce54b6a9fa"
            ))
        );
        let build: Vec<_> = record.build_dependencies.build_time();
        assert_eq!(build.len(), 1);
        assert_eq!(build[0].name, "make");
        assert_eq!(
            record.install_targets,
            vec![InstallTarget::new("nepcal", InstallCategory::Bin)]
        );
    }

    #[test]
    fn name_falls_back_to_class_name() {
        let record = parse_ruby_formula(NEPCAL_0_2_0, None).unwrap();
        assert_eq!(record.name, "nepcal");
        assert_eq!(class_to_formula_name("NepcalCli"), "nepcal-cli");
    }

    #[test]
    fn version_is_inferred_from_url_and_interpolated() {
        let source = r#"
class Nepcal < Formula
  url "https://github.com/nepcal/nepcal/archive/v0.5.0.tar.gz"
  sha256 "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
end
"#;
        let record = parse_ruby_formula(source, Some("nepcal")).unwrap();
        assert_eq!(record.version, "0.5.0");
        assert!(record.dev_url.is_none());

        let templated = r#"
class Nepcal < Formula
  version "0.6.1"
  url "https://example.com/nepcal-#{version}.tar.gz"
end
"#;
        let record = parse_ruby_formula(templated, Some("nepcal")).unwrap();
        assert_eq!(record.source_url, "https://example.com/nepcal-0.6.1.tar.gz");
        assert!(record.checksum.is_none());
    }

    #[test]
    fn nested_blocks_do_not_leak_stanzas() {
        let source = r#"
class Tool < Formula
  desc "Tool" # trailing comment
  homepage "https://example.com"
  url "https://example.com/tool-1.2.tar.gz"
  sha256 "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"

  head do
    url "https://example.com/tool.git", branch: "main"
    depends_on "autoconf" => :build
  end

  bottle do
    sha256 cellar: :any, arm64_sonoma: "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc"
  end

  resource "extra" do
    url "https://example.com/extra-9.9.tar.gz"
    sha256 "dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd"
  end

  depends_on "go" => [:build, :test]
  depends_on "ncurses"

  def install
    if OS.mac?
      bin.install "tool", "tool-helper"
    end
    man.install %w[tool.1 tool.5]
    libexec.install "plugin" => "tool-plugin"
  end

  test do
    system bin/"tool", "--version"
  end
end
"#;
        let record = parse_ruby_formula(source, Some("tool")).unwrap();
        assert_eq!(record.version, "1.2");
        assert_eq!(record.source_url, "https://example.com/tool-1.2.tar.gz");
        assert_eq!(record.dev_url.as_deref(), Some("https://example.com/tool.git"));
        assert_eq!(
            record.checksum.as_ref().map(|c| c.digest.chars().next()),
            Some(Some('b'))
        );

        let deps: Vec<(&str, DependencyPhase)> = record
            .build_dependencies
            .iter()
            .map(|d| (d.name.as_str(), d.phase))
            .collect();
        assert_eq!(
            deps,
            vec![("go", DependencyPhase::Build), ("ncurses", DependencyPhase::Runtime)]
        );

        let targets: Vec<(String, InstallCategory)> = record
            .install_targets
            .iter()
            .map(|t| (t.artifact.display().to_string(), t.category))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("tool".to_string(), InstallCategory::Bin),
                ("tool-helper".to_string(), InstallCategory::Bin),
                ("tool.1".to_string(), InstallCategory::Man),
                ("tool.5".to_string(), InstallCategory::Man),
                ("plugin".to_string(), InstallCategory::Libexec),
            ]
        );
    }

    #[test]
    fn platform_blocks_carry_release_stanzas() {
        let source = r#"
class Nepcal < Formula
  desc "Equivalent of Linux's cal, for Nepali dates"
  homepage "https://github.com/nepcal/nepcal"
  version "0.5.0"

  on_macos do
    url "https://github.com/nepcal/nepcal/releases/download/v0.5.0/nepcal_0.5.0_darwin_amd64.tar.gz"
    sha256 "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc"

    def install
      bin.install "nepcal"
    end
  end

  on_linux do
    url "https://github.com/nepcal/nepcal/releases/download/v0.5.0/nepcal_0.5.0_linux_amd64.tar.gz"
    sha256 "dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd"

    def install
      bin.install "nepcal"
    end
  end
end
"#;
        let record = parse_ruby_formula(source, Some("nepcal")).unwrap();
        assert_eq!(record.version, "0.5.0");
        assert_eq!(
            record.source_url,
            "https://github.com/nepcal/nepcal/releases/download/v0.5.0/nepcal_0.5.0_darwin_amd64.tar.gz"
        );
        assert_eq!(record.checksum, Some(Checksum::sha256("c".repeat(64))));
        assert!(record.is_binary_only());
        assert_eq!(
            record.install_targets.first(),
            Some(&InstallTarget::new("nepcal", InstallCategory::Bin))
        );

        let mut registry = brewdex_common::registry::FormulaRegistry::new();
        assert!(registry.ingest(record).is_ok());
    }

    #[test]
    fn cpu_conditionals_inside_platform_blocks_keep_first_match() {
        let source = r#"
class Nepcal < Formula
  version "0.5.0"

  on_macos do
    if Hardware::CPU.intel?
      url "https://example.com/nepcal_#{version}_darwin_amd64.tar.gz"
      sha256 "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
    end
    if Hardware::CPU.arm?
      url "https://example.com/nepcal_#{version}_darwin_arm64.tar.gz"
      sha256 "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
    end
  end

  def install
    bin.install "nepcal"
  end
end
"#;
        let record = parse_ruby_formula(source, Some("nepcal")).unwrap();
        assert_eq!(
            record.source_url,
            "https://example.com/nepcal_0.5.0_darwin_amd64.tar.gz"
        );
        assert_eq!(record.checksum, Some(Checksum::sha256("a".repeat(64))));
    }

    #[test]
    fn heredoc_bodies_are_not_parsed_as_code() {
        let source = r#"
class Tool < Formula
  url "https://example.com/tool-1.0.tar.gz"
  sha256 "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"

  def install
    bin.install "tool"
  end

  test do
    (testpath/"test.c").write <<~EOS
      int main() {
        if (1) return 0;
      }
      url "https://example.com/not-the-source.tar.gz"
    EOS
    (testpath/"run.sh").write <<-'SH'
      while true; do
        break
      done
    SH
    system ENV.cc, "test.c"
  end
end
"#;
        let record = parse_ruby_formula(source, Some("tool")).unwrap();
        assert_eq!(record.source_url, "https://example.com/tool-1.0.tar.gz");
        assert_eq!(record.version, "1.0");

        let unterminated = "class Tool < Formula\n  test do\n    x = <<~EOS\n      end\nend\n";
        assert!(parse_ruby_formula(unterminated, Some("tool")).is_err());
    }

    #[test]
    fn missing_class_is_a_parse_error() {
        let err = parse_ruby_formula("url \"https://example.com/x-1.0.tar.gz\"\n", None).unwrap_err();
        assert!(matches!(err, BrewdexError::ParseError(..)));
    }

    #[test]
    fn unbalanced_blocks_are_rejected() {
        let source = "class Tool < Formula\n  def install\n    bin.install \"tool\"\nend\n";
        assert!(parse_ruby_formula(source, Some("tool")).is_err());
    }

    #[test]
    fn url_version_guessing() {
        assert_eq!(
            version_from_url("https://github.com/nepcal/nepcal/archive/v0.3.0.tar.gz").as_deref(),
            Some("0.3.0")
        );
        assert_eq!(
            version_from_url("https://example.com/tool-2.10.1.zip").as_deref(),
            Some("2.10.1")
        );
        assert_eq!(version_from_url("https://example.com/tool.git"), None);
    }
}
