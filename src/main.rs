use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use music_sorter::{logging, Config, OrganizeError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

mod commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (JSON); defaults to ./config.json when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::Subcommand)]
enum Commands {
    /// Organize music files into album-artist/album structure
    Organize {
        /// Source directory, overrides configuration and environment
        #[arg(long)]
        source: Option<PathBuf>,
        /// Destination directory, overrides configuration and environment
        #[arg(long)]
        dest: Option<PathBuf>,
        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
        /// Print the result counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show where a single file would be organized to
    Check {
        /// Audio file to inspect
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    // Load environment variables from a .env file if present
    dotenv().ok();
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    if let Commands::Organize { source, dest, .. } = &cli.command {
        config.override_paths(source.clone(), dest.clone());
        if let Err(e) = config.validate() {
            return fail(&e);
        }
    }

    let _guard = match logging::init(&config.logging, cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            match e.downcast_ref::<OrganizeError>() {
                Some(organize_error) => fail(organize_error),
                None => {
                    eprintln!("Error: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run(command: &Commands, config: &Config) -> Result<ExitCode> {
    match command {
        Commands::Organize { dry_run, json, .. } => {
            let stats = commands::organize::organize_music_library(config, *dry_run)?;
            println!("{}", commands::organize::format_summary(&stats, *json)?);
        }
        Commands::Check { file } => {
            let report = commands::check::check_with_tags(config, file)
                .context("Failed to inspect file")?;
            println!("{}", report);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn fail(e: &OrganizeError) -> ExitCode {
    eprintln!("Error: {} (status {})", e, e.status_code());
    ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
}
