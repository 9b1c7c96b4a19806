pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "stocky",
    about = "Stocky operator CLI",
    long_about = "Operate the Stocky order engine: seed the catalog, run prompts, and manage stock levels.",
    after_help = "Examples:\n  stocky seed\n  stocky ask \"I want to order 2 LEGO Creator sets\"\n  stocky low-stock --threshold 3"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Write the demo catalog to the configured catalog path")]
    Seed {
        #[arg(long, help = "Catalog file path, overriding config and environment")]
        catalog: Option<PathBuf>,
        #[arg(long, help = "Overwrite an existing catalog file")]
        force: bool,
    },
    #[command(about = "Run a natural-language prompt through the order workflow")]
    Ask {
        #[arg(help = "Customer prompt, e.g. \"do you have monopoly in stock?\"")]
        prompt: String,
        #[arg(long, help = "Catalog file path, overriding config and environment")]
        catalog: Option<PathBuf>,
    },
    #[command(about = "Add stock for a product and persist the new count")]
    Restock {
        #[arg(help = "Product id, e.g. lego-creator-townhouse")]
        product_id: String,
        #[arg(help = "Units to add")]
        quantity: u32,
        #[arg(long, help = "Catalog file path, overriding config and environment")]
        catalog: Option<PathBuf>,
    },
    #[command(about = "List products at or below a stock threshold")]
    LowStock {
        #[arg(long, help = "Stock threshold, defaulting to the configured value")]
        threshold: Option<u32>,
        #[arg(long, help = "Catalog file path, overriding config and environment")]
        catalog: Option<PathBuf>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Seed { catalog, force } => commands::seed::run(catalog, force),
        Command::Ask { prompt, catalog } => commands::ask::run(&prompt, catalog),
        Command::Restock { product_id, quantity, catalog } => {
            commands::restock::run(&product_id, quantity, catalog)
        }
        Command::LowStock { threshold, catalog } => commands::low_stock::run(threshold, catalog),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
