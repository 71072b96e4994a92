// brewdex/src/cli/scan.rs
use brewdex_common::error::Result;
use brewdex_core::tap::{IngestReport, Rejection};
use brewdex_core::Formulary;
use clap::Args;
use colored::Colorize;

/// Scan the tap directory and rebuild the registry snapshot
#[derive(Args, Debug)]
pub struct Scan {
    /// Exit with an error if any formula was rejected or unreadable
    #[arg(long)]
    pub strict: bool,
}

impl Scan {
    pub async fn run(&self, formulary: &Formulary) -> Result<()> {
        println!(
            "{}Scanning {}",
            "==> ".bold().blue(),
            formulary.tap_dir().display()
        );
        let (registry, report) = formulary.refresh().await?;
        print_report(&report);
        println!(
            "{}",
            format!(
                "{} package(s), {} record(s) registered",
                registry.all_packages().len(),
                registry.len()
            )
            .bold()
        );

        if self.strict && !report.is_clean() {
            return Err(brewdex_common::BrewdexError::Generic(format!(
                "{} formula source(s) rejected",
                report.rejected() + report.unreadable.len()
            )));
        }
        Ok(())
    }
}

fn print_rejection(label: colored::ColoredString, rejection: &Rejection) {
    println!(
        "  {} {} {} ({}): {}",
        label,
        rejection.origin.name,
        rejection.origin.version,
        rejection.origin.path.display(),
        rejection.error
    );
    if let Some(kept) = &rejection.conflicts_with {
        println!("      kept record from {}", kept.display());
    }
}

fn print_report(report: &IngestReport) {
    println!(
        "Scanned {} source(s): {} added, {} duplicate",
        report.sources_scanned,
        report.added.len().to_string().green(),
        report.duplicates.len()
    );
    for rejection in &report.conflicts {
        print_rejection("conflict".yellow().bold(), rejection);
    }
    for rejection in &report.invalid {
        print_rejection("invalid".red().bold(), rejection);
    }
    for failure in &report.unreadable {
        println!(
            "  {} {}: {}",
            "unreadable".red().bold(),
            failure.path.display(),
            failure.error
        );
    }
}
