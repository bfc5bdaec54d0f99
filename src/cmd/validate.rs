//! `driftcheck validate`: check drift data files under a root directory.

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

use driftcheck::config::{global_config_path, Config};
use driftcheck::inventory::TagInventory;
use driftcheck::output::{summary_line, write_output};
use driftcheck::paths::PROJECT_CONFIG_FILE;
use driftcheck::validation::validate_drift_data_with;

/// Options for a validate run, straight from the command line.
#[derive(Debug, Clone)]
pub struct ValidateArgs {
    pub root: PathBuf,
    pub tags: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

/// Run validation, write messages plus the summary line, and report validity.
pub fn cmd_validate(args: &ValidateArgs) -> Result<bool> {
    let inventory = TagInventory::load(&args.tags)?;
    let config = load_config(&args.root, args.config.as_deref(), args.verbose)?;

    if args.verbose {
        eprintln!(
            "{} {} grep tag(s), {} parsed tag(s), {} ignored tag(s)",
            "→".cyan(),
            inventory.grep_tags.len(),
            inventory.source_tags.len(),
            inventory.ignored_tags.len()
        );
    }

    let mut file_count = 0usize;
    let report = validate_drift_data_with(
        &args.root,
        &inventory.grep_tags,
        &inventory.source_tags,
        &config,
        |path| {
            file_count += 1;
            if args.verbose {
                eprintln!("{} Reading {}", "→".cyan(), path.display());
            }
        },
    )?;

    if args.verbose {
        eprintln!("{} {} drift data file(s) checked", "→".cyan(), file_count);
    }
    if file_count == 0 {
        eprintln!(
            "{} No {} files found under {}",
            "Warning:".yellow(),
            config.data_file,
            args.root.display()
        );
    }

    let mut lines = report.messages;
    lines.push(summary_line(report.is_valid).to_string());
    write_output(&lines, args.output.as_deref())?;

    if let (Some(output), true) = (&args.output, args.verbose) {
        eprintln!("{} Wrote {} line(s) to {}", "✓".green(), lines.len(), output.display());
    }

    Ok(report.is_valid)
}

/// An explicit `--config` must exist and is used on its own; otherwise the
/// global config is layered under `<root>/.driftcheck.yml`.
fn load_config(root: &Path, explicit: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }
        if verbose {
            eprintln!("{} Using config from {}", "→".cyan(), path.display());
        }
        return Config::load_from(path);
    }

    if verbose {
        let sources: Vec<String> = global_config_path()
            .into_iter()
            .chain(Some(root.join(PROJECT_CONFIG_FILE)))
            .filter(|p| p.exists())
            .map(|p| p.display().to_string())
            .collect();
        let source = if sources.is_empty() {
            "built-in defaults".to_string()
        } else {
            sources.join(", ")
        };
        eprintln!("{} Using config from {}", "→".cyan(), source);
    }

    Config::load(root)
}
