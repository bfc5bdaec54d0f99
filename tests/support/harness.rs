use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// TestHarness provides an isolated source tree for driftcheck runs.
/// Each harness owns a temporary directory holding:
/// - `repo/` - the validated root, where drift data and test files go
/// - `tags.json` - the tag inventory handed to `--tags`
/// - `home/` - an empty `$HOME` so no global config leaks in
pub struct TestHarness {
    pub dir: TempDir,
    pub root: PathBuf,
    pub tags_path: PathBuf,
    pub driftcheck_binary: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("repo");
        fs::create_dir_all(&root).expect("Failed to create repo dir");
        fs::create_dir_all(temp_dir.path().join("home")).expect("Failed to create home dir");

        let harness = TestHarness {
            tags_path: temp_dir.path().join("tags.json"),
            dir: temp_dir,
            root,
            driftcheck_binary: PathBuf::from(env!("CARGO_BIN_EXE_driftcheck")),
        };
        harness.write_tags(&[], &[]);
        harness
    }

    /// Write `content` as the drift data file of `rel_dir` (relative to the root).
    pub fn write_drift(&self, rel_dir: &str, content: &str) -> PathBuf {
        let dir = self.root.join(rel_dir);
        fs::create_dir_all(&dir).expect("Failed to create drift data dir");
        let path = dir.join(".drift-data.yml");
        fs::write(&path, content).expect("Failed to write drift data file");
        path
    }

    /// Create an empty test file at `rel_path` (relative to the root).
    pub fn write_test_file(&self, rel_path: &str) {
        let path = self.root.join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create test file dir");
        }
        fs::write(&path, "").expect("Failed to write test file");
    }

    /// Replace the tag inventory.
    pub fn write_tags(&self, grep_tags: &[&str], source_tags: &[&str]) {
        let inventory = serde_json::json!({
            "grep_tags": grep_tags,
            "source_tags": source_tags,
            "ignored_tags": [],
            "source_methods": [],
        });
        fs::write(&self.tags_path, inventory.to_string()).expect("Failed to write tags");
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.root.join(".driftcheck.yml"), content).expect("Failed to write config");
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Executes `driftcheck validate --tags <tags> <root>` plus `extra` args.
    pub fn validate(&self, extra: &[&str]) -> Output {
        let mut args = vec![
            "validate".to_string(),
            "--tags".to_string(),
            self.tags_path.display().to_string(),
        ];
        args.extend(extra.iter().map(|a| a.to_string()));
        args.push(self.root.display().to_string());
        self.run(&args)
    }

    /// Executes the driftcheck binary with the given arguments.
    pub fn run<S: AsRef<std::ffi::OsStr>>(&self, args: &[S]) -> Output {
        Command::new(&self.driftcheck_binary)
            .args(args)
            .env("HOME", self.path().join("home"))
            .env("NO_COLOR", "1")
            .current_dir(self.path())
            .output()
            .expect("Failed to run driftcheck")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
