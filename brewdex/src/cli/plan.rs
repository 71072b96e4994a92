// brewdex/src/cli/plan.rs
use brewdex_common::error::Result;
use brewdex_common::Config;
use brewdex_core::{plan_install, Formulary};
use clap::Args;
use colored::Colorize;

/// Show where a release would be installed, without installing it
#[derive(Args, Debug)]
pub struct Plan {
    pub name: String,

    #[arg(long)]
    pub version: Option<String>,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

impl Plan {
    pub async fn run(&self, config: &Config, formulary: &Formulary) -> Result<()> {
        let registry = formulary.load().await?;
        let record = match &self.version {
            Some(version) => registry.get(&self.name, version)?,
            None => registry.resolve_canonical(&self.name)?,
        };
        let plan = plan_install(config, record);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
            return Ok(());
        }

        println!(
            "{}{} {} -> {}",
            "==> ".bold().blue(),
            plan.name.bold(),
            plan.version,
            plan.keg_path.display()
        );
        if plan.steps.is_empty() {
            println!("{}", "No install targets recorded".yellow());
        }
        for step in &plan.steps {
            match &step.link {
                Some(link) => println!(
                    "  {} -> {} (linked at {})",
                    step.artifact.display(),
                    step.destination.display(),
                    link.display()
                ),
                None => println!(
                    "  {} -> {}",
                    step.artifact.display(),
                    step.destination.display()
                ),
            }
        }
        println!("  opt link: {}", plan.opt_link.display());
        Ok(())
    }
}
