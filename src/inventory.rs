//! Tag sets produced by the source analysis stage.
//!
//! The analysis stage (grep scan plus AST parsing) runs outside this crate
//! and hands its results over as a JSON document:
//!
//! ```json
//! {
//!   "grep_tags": ["tag_a", "tag_b"],
//!   "source_tags": ["tag_a"],
//!   "ignored_tags": [],
//!   "source_methods": []
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagInventory {
    /// Tags found by text search; ground truth for "exists in source"
    #[serde(default)]
    pub grep_tags: HashSet<String>,
    /// Tags found by structural parsing
    #[serde(default)]
    pub source_tags: HashSet<String>,
    /// Tags the analysis stage skipped on purpose
    #[serde(default)]
    pub ignored_tags: HashSet<String>,
    /// Per-method metadata, passed through untouched
    #[serde(default)]
    pub source_methods: Vec<serde_json::Value>,
}

impl TagInventory {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read tag inventory from {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid tag inventory {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse tag inventory JSON")
    }
}
