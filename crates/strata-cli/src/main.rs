use std::error::Error;

use clap::{Parser, Subcommand};

use commands::{
    generate::{self, GenerateArgs},
    plan::{self, PlanArgs},
    validate::{self, ValidateArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "strata", about = "Hierarchical cluster graph generator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a definition and write the instance artefacts.
    Generate(GenerateArgs),
    /// Validate a definition and check its serialization round-trip.
    Validate(ValidateArgs),
    /// Dry-run change detection between two definitions.
    Plan(PlanArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Validate(args) => validate::run(&args),
        Command::Plan(args) => plan::run(&args),
    }
}
