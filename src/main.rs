//! CLI entry point and command handlers for driftcheck.

mod cmd;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::path::PathBuf;

use cmd::validate::{cmd_validate, ValidateArgs};

#[derive(Parser)]
#[command(name = "driftcheck")]
#[command(version)]
#[command(about = "Validate region tag metadata in .drift-data.yml files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate drift data files against detected region tags
    ///
    /// Every message is printed (or written to --output) followed by a
    /// summary line. Exits with status 1 when any file is invalid.
    Validate {
        /// Root directory to search for drift data files
        #[arg(default_value = ".")]
        root: PathBuf,
        /// JSON file with grep_tags/source_tags from the analysis stage
        #[arg(long, value_name = "FILE")]
        tags: PathBuf,
        /// Write messages to this file instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Config file to use instead of the global and <ROOT>/.driftcheck.yml configs
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Report progress on stderr
        #[arg(long, short)]
        verbose: bool,
    },
    /// Generate shell completions
    Completion {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show version information
    Version {
        /// Show additional build information
        #[arg(long, short)]
        verbose: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(2);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            root,
            tags,
            output,
            config,
            verbose,
        } => {
            let args = ValidateArgs {
                root,
                tags,
                output,
                config,
                verbose,
            };
            if !cmd_validate(&args)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Completion { shell } => cmd_completion(shell),
        Commands::Version { verbose } => cmd_version(verbose),
    }
}

/// Generate shell completion script
fn cmd_completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "driftcheck", &mut io::stdout());
    Ok(())
}

fn cmd_version(verbose: bool) -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!("driftcheck {}", VERSION);

    if verbose {
        const GIT_SHA: &str = env!("GIT_SHA");
        const BUILD_DATE: &str = env!("BUILD_DATE");
        println!("commit: {}", GIT_SHA);
        println!("built: {}", BUILD_DATE);
    }

    Ok(())
}
