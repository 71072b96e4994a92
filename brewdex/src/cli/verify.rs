// brewdex/src/cli/verify.rs
use std::path::PathBuf;

use brewdex_aio::verify_checksum_async;
use brewdex_common::error::{BrewdexError, Result};
use brewdex_core::Formulary;
use clap::Args;
use colored::Colorize;

/// Check a downloaded artifact against the recorded checksum
#[derive(Args, Debug)]
pub struct Verify {
    pub name: String,

    /// Path to the downloaded release artifact
    pub artifact: PathBuf,

    /// Verify against this version instead of the canonical one
    #[arg(long)]
    pub version: Option<String>,
}

impl Verify {
    pub async fn run(&self, formulary: &Formulary) -> Result<()> {
        let registry = formulary.load().await?;
        let record = match &self.version {
            Some(version) => registry.get(&self.name, version)?,
            None => registry.resolve_canonical(&self.name)?,
        };
        let checksum = record
            .checksum
            .as_ref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                BrewdexError::ChecksumError(format!(
                    "{} {} has no recorded checksum",
                    record.name, record.version
                ))
            })?;

        verify_checksum_async(&self.artifact, checksum).await?;
        println!(
            "{} {} matches {} {}",
            "✔".green(),
            self.artifact.display(),
            record.name,
            record.version
        );
        Ok(())
    }
}
