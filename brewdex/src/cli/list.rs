// brewdex/src/cli/list.rs
use brewdex_common::error::Result;
use brewdex_core::Formulary;
use clap::Args;
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};

/// List known packages and their canonical versions
#[derive(Args, Debug)]
pub struct List {
    /// Show every accepted version, not just the canonical one
    #[arg(long)]
    pub all: bool,
}

impl List {
    pub async fn run(&self, formulary: &Formulary) -> Result<()> {
        let registry = formulary.load().await?;
        let packages = registry.all_packages();
        if packages.is_empty() {
            println!("{}", "0 formulas registered".yellow());
            return Ok(());
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.add_row(Row::new(vec![
            Cell::new("Name").style_spec("b"),
            Cell::new("Canonical").style_spec("b"),
            Cell::new("Versions").style_spec("b"),
        ]));

        for name in &packages {
            let canonical = registry.resolve_canonical(name)?;
            let versions = if self.all {
                registry
                    .history(name)
                    .map(|record| record.version.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            } else {
                registry.history(name).len().to_string()
            };
            table.add_row(Row::new(vec![
                Cell::new(name).style_spec("Fb"),
                Cell::new(&canonical.version).style_spec("Fg"),
                Cell::new(&versions),
            ]));
        }
        table.printstd();
        println!(
            "{}",
            format!("{} formulas registered", packages.len()).bold()
        );
        Ok(())
    }
}
