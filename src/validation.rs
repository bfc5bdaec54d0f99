//! Consistency validation of drift data files against detected region tags.
//!
//! Validation runs in two passes over every discovered document:
//!
//! 1. **References**: each declared tag must have been found by the grep scan,
//!    must agree with the parser about whether it is detectable (`tested: false`
//!    means "must not be parsed"), and must be declared only once across the
//!    whole tree.
//! 2. **Attributes**: the first reserved key of each entry must carry its
//!    required literal (if any), `additions` must list known tags, and every
//!    other key must name an existing test file.
//!
//! All pass-one messages precede all pass-two messages. Violations never
//! abort the run; the full list is returned in a [`ValidationReport`].

use anyhow::Result;
use serde_yaml::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::config::{Config, ReservedKeys};
use crate::discovery::find_drift_files;
use crate::drift_data::{render_value, DriftDocument, TagEntry};

/// Reserved key holding extra tags covered by an entry's tests.
pub const ADDITIONS_KEY: &str = "additions";

/// Accumulated outcome of one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Whether every rule passed
    pub is_valid: bool,
    /// Diagnostics in the order they were produced
    pub messages: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            messages: Vec::new(),
        }
    }

    /// Record a violation and mark the run invalid.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.messages.push(message.into());
    }

    /// Record a message without changing validity.
    pub fn note(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}

/// Validate every drift data file under `root`.
///
/// Filesystem and YAML errors are fatal and returned as `Err`; rule
/// violations are reported through the returned [`ValidationReport`].
pub fn validate_drift_data(
    root: &Path,
    grep_tags: &HashSet<String>,
    source_tags: &HashSet<String>,
    config: &Config,
) -> Result<ValidationReport> {
    validate_drift_data_with(root, grep_tags, source_tags, config, |_| {})
}

/// Like [`validate_drift_data`], calling `on_file` before each drift data
/// file is read.
pub fn validate_drift_data_with<F>(
    root: &Path,
    grep_tags: &HashSet<String>,
    source_tags: &HashSet<String>,
    config: &Config,
    mut on_file: F,
) -> Result<ValidationReport>
where
    F: FnMut(&Path),
{
    let paths = find_drift_files(root, &config.data_file)?;

    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        on_file(path);
        documents.push(DriftDocument::load(path)?);
    }

    Ok(validate_documents(&documents, grep_tags, source_tags, config))
}

/// Validate already-parsed documents, in the order given.
pub fn validate_documents(
    documents: &[DriftDocument],
    grep_tags: &HashSet<String>,
    source_tags: &HashSet<String>,
    config: &Config,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    check_tag_references(documents, grep_tags, source_tags, &config.data_file, &mut report);
    check_tag_attributes(documents, grep_tags, config.reserved(), &mut report);

    report
}

/// Pass one: existence, parse-state agreement, and global uniqueness.
fn check_tag_references(
    documents: &[DriftDocument],
    grep_tags: &HashSet<String>,
    source_tags: &HashSet<String>,
    data_file: &str,
    report: &mut ValidationReport,
) {
    let mut seen_tags: HashSet<&str> = HashSet::new();

    for doc in documents {
        let yaml_path = doc.path.display();

        for (tag, entry) in &doc.entries {
            let should_be_parsed = !entry.is_marked_untested();

            if !grep_tags.contains(tag) {
                report.fail(format!(
                    "Yaml file {} contains region tag not used in source files: {}",
                    yaml_path, tag
                ));
            } else if should_be_parsed && !source_tags.contains(tag) {
                report.fail(format!(
                    "Yaml file {} contains unparsed region tag: {}",
                    yaml_path, tag
                ));
                report.note("  Remove it, or label it with \"tested: false\".");
            } else if !should_be_parsed && source_tags.contains(tag) {
                report.fail(format!(
                    "Parsed tag {} in file {} marked untested!",
                    tag, yaml_path
                ));
            }

            // Runs regardless of the checks above
            if !seen_tags.insert(tag.as_str()) {
                report.fail(format!(
                    "Region tag {} is used multiple times in {} files!",
                    tag, data_file
                ));
            }
        }
    }
}

/// Pass two: reserved attribute values and declared test paths.
fn check_tag_attributes(
    documents: &[DriftDocument],
    grep_tags: &HashSet<String>,
    reserved: ReservedKeys<'_>,
    report: &mut ValidationReport,
) {
    for doc in documents {
        let yaml_path = doc.path.display();

        for (tag, entry) in &doc.entries {
            let attr = entry.first_reserved_key(reserved);
            let attr_is_valid = match attr {
                Some(attr) => check_attribute(doc, tag, entry, attr, grep_tags, reserved, report),
                None => true,
            };

            let mut test_paths_exist = true;
            for test_path in entry.test_paths(reserved) {
                let resolved = doc.resolve_test_path(test_path);
                if !resolved.exists() {
                    report.fail(format!(
                        "Test file {} used in {} not found!",
                        resolved.display(),
                        yaml_path
                    ));
                    test_paths_exist = false;
                }
            }

            // Attribute failures on an entry with valid paths are not escalated
            if test_paths_exist {
                continue;
            }

            // Gated on validity of the whole run so far, not just this tag
            if report.is_valid {
                report.fail(format!(
                    "Region tag {} in file {} is formatted incorrectly!",
                    tag, yaml_path
                ));
            }

            if let (false, Some(attr)) = (attr_is_valid, attr) {
                report.note(format!("Invalid {} key in file {}", attr, yaml_path));
            }
        }
    }
}

/// Check the selected reserved attribute of one entry. Returns `false` on violation.
fn check_attribute(
    doc: &DriftDocument,
    tag: &str,
    entry: &TagEntry,
    attr: &str,
    grep_tags: &HashSet<String>,
    reserved: ReservedKeys<'_>,
    report: &mut ValidationReport,
) -> bool {
    let yaml_path = doc.path.display();
    let Some(actual) = entry.get(attr) else {
        return true;
    };
    let mut is_valid = true;

    if let Some(expected) = reserved.required_value(attr) {
        if actual != expected {
            is_valid = false;
            report.fail(format!(
                "Invalid {} value in file {} for tag {}: {}, expected {} (or omission)",
                attr,
                yaml_path,
                tag,
                render_value(actual),
                render_value(expected)
            ));
        }
    }

    if attr == ADDITIONS_KEY {
        match actual {
            Value::Sequence(added) => {
                let all_known = added
                    .iter()
                    .all(|t| t.as_str().is_some_and(|t| grep_tags.contains(t)));
                if !all_known {
                    is_valid = false;
                    report.fail(format!(
                        "Yaml file {} contains region tag not used in source files: {}",
                        yaml_path, tag
                    ));
                }
            }
            _ => {
                is_valid = false;
                report.fail(format!(
                    "Additions key for {} in {} is not a list!",
                    tag, yaml_path
                ));
            }
        }
    }

    is_valid
}
