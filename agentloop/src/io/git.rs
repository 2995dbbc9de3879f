//! Git adapter with the loop's permissive failure semantics.
//!
//! History collection must never take the loop down. Any git failure
//! (missing binary, non-zero exit) degrades to empty output plus a warning,
//! and the caller treats that as "nothing happened this cycle".

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, warn};

/// Executes git subcommands in a fixed working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// True when the workdir is already inside a git work tree.
    pub fn is_work_tree(&self) -> bool {
        self.capture(&["rev-parse", "--is-inside-work-tree"]) == "true"
    }

    /// Initialize a repository with a local identity so commits succeed in
    /// environments without a global git config.
    pub fn init(&self) {
        self.capture(&["init"]);
        self.capture(&["config", "user.name", "agentloop"]);
        self.capture(&["config", "user.email", "agentloop@local.invalid"]);
    }

    /// Stage every change, including untracked files.
    pub fn add_all(&self) {
        self.capture(&["add", "-A"]);
    }

    /// Diff summary of staged changes; empty when nothing is staged.
    pub fn diff_cached_stat(&self) -> String {
        self.capture(&["diff", "--cached", "--stat"])
    }

    /// Unstage everything.
    pub fn reset(&self) {
        self.capture(&["reset"]);
    }

    pub fn commit(&self, message: &str) {
        self.capture(&["commit", "-m", message]);
    }

    /// Run a git subcommand and return trimmed stdout.
    ///
    /// Non-zero exits and spawn failures both yield an empty string.
    fn capture(&self, args: &[&str]) -> String {
        match self.run(args) {
            Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
                .trim()
                .to_string(),
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(args = ?args, stderr = %stderr.trim(), "git command failed");
                String::new()
            }
            Err(err) => {
                warn!(args = ?args, err = %err, "git could not be run");
                String::new()
            }
        }
    }

    fn run(&self, args: &[&str]) -> std::io::Result<Output> {
        debug!(args = ?args, "running git");
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
    }
}
