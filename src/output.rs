//! Writing validation results.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const ALL_VALID: &str = "All files are valid.";
pub const INVALID_FOUND: &str = "Invalid file(s) found!";

/// Final line summarizing a validation run.
pub fn summary_line(is_valid: bool) -> &'static str {
    if is_valid {
        ALL_VALID
    } else {
        INVALID_FOUND
    }
}

/// Write `lines` newline-joined to `output_file`, or one per line to stdout.
pub fn write_output(lines: &[String], output_file: Option<&Path>) -> Result<()> {
    match output_file {
        Some(path) => fs::write(path, lines.join("\n"))
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            for line in lines {
                println!("{}", line);
            }
            Ok(())
        }
    }
}
