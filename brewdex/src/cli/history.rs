// brewdex/src/cli/history.rs
use brewdex_common::error::Result;
use brewdex_common::LookupError;
use brewdex_core::Formulary;
use clap::Args;
use colored::Colorize;

/// List every accepted version of a package, oldest first
#[derive(Args, Debug)]
pub struct History {
    pub name: String,
}

impl History {
    pub async fn run(&self, formulary: &Formulary) -> Result<()> {
        let registry = formulary.load().await?;
        let mut history = registry.history(&self.name).peekable();
        if history.peek().is_none() {
            return Err(LookupError::UnknownPackage(self.name.clone()).into());
        }

        let canonical = registry.resolve_canonical(&self.name)?;
        for record in history {
            let marker = if record.version == canonical.version {
                "(canonical)".green().to_string()
            } else {
                String::new()
            };
            let digest = record
                .checksum
                .as_ref()
                .filter(|c| !c.is_empty())
                .map_or_else(|| "-".to_string(), |c| c.digest.chars().take(12).collect());
            println!(
                "{:<12} {:<14} {} {}",
                record.version,
                digest,
                record.source_url,
                marker
            );
        }
        Ok(())
    }
}
