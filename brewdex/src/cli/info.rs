// brewdex/src/cli/info.rs
use brewdex_common::dependency::DependencyExt;
use brewdex_common::error::Result;
use brewdex_common::FormulaRecord;
use brewdex_core::Formulary;
use clap::Args;
use colored::Colorize;

/// Show the canonical record of a package
#[derive(Args, Debug)]
pub struct Info {
    pub name: String,

    /// Show this version instead of the canonical one
    #[arg(long)]
    pub version: Option<String>,

    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,
}

impl Info {
    pub async fn run(&self, formulary: &Formulary) -> Result<()> {
        let registry = formulary.load().await?;
        let record = match &self.version {
            Some(version) => registry.get(&self.name, version)?,
            None => registry.resolve_canonical(&self.name)?,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(record)?);
            return Ok(());
        }
        print_record(record);
        Ok(())
    }
}

fn print_record(record: &FormulaRecord) {
    println!(
        "{}{} {}",
        "==> ".bold().blue(),
        record.name.bold(),
        record.version.green()
    );
    if !record.description.is_empty() {
        println!("{}", record.description);
    }
    if !record.homepage.is_empty() {
        println!("{}", record.homepage.cyan());
    }
    println!("{} {}", "From:".bold(), record.source_url);
    if let Some(dev_url) = &record.dev_url {
        println!("{} {}", "Head:".bold(), dev_url);
    }
    match &record.checksum {
        Some(checksum) if !checksum.is_empty() => {
            println!("{} {}", "Checksum:".bold(), checksum)
        }
        _ => println!("{} none", "Checksum:".bold()),
    }

    let build = record.build_dependencies.build_time();
    let runtime = record.build_dependencies.runtime();
    if !build.is_empty() {
        let names: Vec<&str> = build.iter().map(|d| d.name.as_str()).collect();
        println!("{} {}", "Build dependencies:".bold(), names.join(", "));
    }
    if !runtime.is_empty() {
        let names: Vec<&str> = runtime.iter().map(|d| d.name.as_str()).collect();
        println!("{} {}", "Runtime dependencies:".bold(), names.join(", "));
    }
    for target in &record.install_targets {
        println!(
            "{} {} -> {}",
            "Installs:".bold(),
            target.artifact.display(),
            target.category
        );
    }
}
