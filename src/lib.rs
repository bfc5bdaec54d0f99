//! # driftcheck - region tag metadata validation
//!
//! Region tags mark labeled snippets of source code. `.drift-data.yml` files
//! sitting next to the source declare which tests exercise each tag. This
//! crate cross-checks those declarations against the tags an external
//! analysis stage detected in the source tree.
//!
//! ## Modules
//!
//! - [`config`] - Reserved key vocabulary and layered configuration
//! - [`inventory`] - Tag sets produced by the source analysis stage
//! - [`discovery`] - Locating drift data files under a root directory
//! - [`drift_data`] - Parsed drift data documents and tag entries
//! - [`validation`] - The two-pass consistency validator
//! - [`output`] - Summary line and message writing
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use driftcheck::config::Config;
//! use driftcheck::inventory::TagInventory;
//! use driftcheck::validation::validate_drift_data;
//!
//! let root = Path::new("samples");
//! let inventory = TagInventory::load(Path::new("tags.json")).expect("Failed to load tags");
//! let config = Config::load(root).expect("Failed to load config");
//!
//! let report = validate_drift_data(
//!     root,
//!     &inventory.grep_tags,
//!     &inventory.source_tags,
//!     &config,
//! )
//! .expect("Validation run failed");
//!
//! for message in &report.messages {
//!     println!("{}", message);
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod drift_data;
pub mod inventory;
pub mod output;
pub mod validation;

/// Default path constants.
pub mod paths {
    /// File name of drift data files: `.drift-data.yml`
    pub const DRIFT_DATA_FILE: &str = ".drift-data.yml";
    /// Project config file, relative to the validated root: `.driftcheck.yml`
    pub const PROJECT_CONFIG_FILE: &str = ".driftcheck.yml";
    /// Global config file, relative to `$HOME`: `.config/driftcheck/config.yml`
    pub const GLOBAL_CONFIG_PATH: &str = ".config/driftcheck/config.yml";
}
