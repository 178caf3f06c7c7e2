//! bluechip CLI binary.
//!
//! Screens a universe for blue chip dividend payers and prints dividend yield
//! valuation profiles.

mod cmd;
mod data;
mod logging;
mod universe;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::{profile::ProfileArgs, screen::ScreenArgs};
use logging::LogFormat;
use std::process;

#[derive(Parser)]
#[command(name = "bluechip")]
#[command(about = "Blue chip dividend screener and yield valuation", long_about = None)]
#[command(version)]
struct Cli {
    /// Base log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a universe for blue chips
    Screen(ScreenArgs),

    /// Show the dividend yield valuation of symbols
    Profile(ProfileArgs),

    /// List screening criteria
    Criteria {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Screen(args) => cmd::screen::run_screen(&args).await?,
        Commands::Profile(args) => cmd::profile::show_profiles(&args).await?,
        Commands::Criteria { category, verbose } => {
            cmd::criteria::list_criteria(category.as_deref(), verbose)?;
        }
    }

    Ok(())
}
