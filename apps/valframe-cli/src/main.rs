use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod config;
mod error;
mod logging;

use error::CliResult;

#[derive(Parser)]
#[command(name = "valframe")]
#[command(about = "Valframe CLI - Staged validation for delimited shipment files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

/// Which stage's findings a reprocess run should ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SkipStage {
    /// Accept the sanitized output without running any rules
    Business,
    /// Re-run business rules over the sanitized output
    Format,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more shipment files
    Validate {
        /// Files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Field separator
        #[arg(long)]
        separator: Option<char>,

        /// Text qualifier
        #[arg(long)]
        qualifier: Option<char>,

        /// Header line to use instead of each file's first line
        #[arg(long)]
        header: Option<String>,

        /// Print summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reprocess a previously validated file from its sanitized output
    Reprocess {
        /// Original input file
        file: PathBuf,

        /// Findings to ignore
        #[arg(long, value_enum)]
        skip: SkipStage,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Field separator
        #[arg(long)]
        separator: Option<char>,

        /// Text qualifier
        #[arg(long)]
        qualifier: Option<char>,
    },

    /// Zip every CSV file next to the given files
    Archive {
        /// Files whose directories are archived
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory receiving the archive
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Validate {
            files,
            config,
            separator,
            qualifier,
            header,
            json,
        } => {
            let overrides = config::CsvOverrides {
                separator,
                qualifier,
                header,
            };
            commands::validate::execute(files, config, overrides, json).await
        }

        Commands::Reprocess {
            file,
            skip,
            config,
            separator,
            qualifier,
        } => {
            // The sanitized output always carries its own header line
            let overrides = config::CsvOverrides {
                separator,
                qualifier,
                header: None,
            };
            commands::reprocess::execute(file, skip, config, overrides)
        }

        Commands::Archive {
            files,
            out_dir,
            config,
        } => commands::archive::execute(files, out_dir, config),
    }
}
