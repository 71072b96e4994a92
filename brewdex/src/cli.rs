// brewdex/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use brewdex_common::error::Result;
use brewdex_common::Config;
use brewdex_core::Formulary;
use clap::{ArgAction, Parser, Subcommand};

pub mod history;
pub mod info;
pub mod list;
pub mod plan;
pub mod scan;
pub mod verify;

use crate::cli::history::History;
use crate::cli::info::Info;
use crate::cli::list::List;
use crate::cli::plan::Plan;
use crate::cli::scan::Scan;
use crate::cli::verify::Verify;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "brewdex", bin_name = "brewdex")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Tap directory to read formulas from (overrides BREWDEX_TAP_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub tap: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Scan(Scan),
    List(List),
    Info(Info),
    History(History),
    Verify(Verify),
    Plan(Plan),
}

impl Command {
    pub async fn run(&self, config: &Config, formulary: &Formulary) -> Result<()> {
        match self {
            Self::Scan(command) => command.run(formulary).await,
            Self::List(command) => command.run(formulary).await,
            Self::Info(command) => command.run(formulary).await,
            Self::History(command) => command.run(formulary).await,
            Self::Verify(command) => command.run(formulary).await,
            Self::Plan(command) => command.run(config, formulary).await,
        }
    }
}
