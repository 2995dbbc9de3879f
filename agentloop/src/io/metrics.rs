//! Cycle measurement: staging, diffing, checkpoint commits, the metrics log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use tracing::{debug, instrument};

use crate::core::diff::parse_diff_stat;
use crate::core::prompt::Category;
use crate::core::session::{CycleRecord, Session};
use crate::io::git::Git;

/// Append-only JSONL sink for cycle records.
///
/// The file is opened in append mode per write and never truncated or
/// rewritten by this program.
#[derive(Debug, Clone)]
pub struct MetricsLog {
    path: PathBuf,
}

impl MetricsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single JSON line.
    pub fn append(&self, record: &CycleRecord) -> Result<()> {
        let mut line = serde_json::to_string(record).context("serialize cycle record")?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open metrics log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("append metrics log {}", self.path.display()))?;
        Ok(())
    }
}

/// Put the workspace under version control with an initial checkpoint.
///
/// Idempotent: an existing work tree is left untouched. Called once at
/// startup, before the first cycle.
pub fn init_repo(git: &Git) {
    if git.is_work_tree() {
        debug!("workspace is already a work tree");
        return;
    }
    git.init();
    git.add_all();
    git.commit("seed");
}

/// Measure one cycle's effect on the workspace.
///
/// Stages everything and diffs against the last checkpoint. A cycle with no
/// staged changes is a no-op: the index is reset and neither a commit nor a
/// log line is produced. Git being unavailable looks like an empty diff and
/// takes the same path.
#[instrument(skip_all, fields(cycle))]
pub fn measure(
    git: &Git,
    log: &MetricsLog,
    session: &mut Session,
    cycle: u64,
    prompt: &str,
    category: Category,
) -> Result<Option<CycleRecord>> {
    git.add_all();
    let stat = git.diff_cached_stat();
    if stat.is_empty() {
        debug!("no staged changes");
        git.reset();
        return Ok(None);
    }

    let counts = parse_diff_stat(&stat);
    git.commit(&format!("cycle-{cycle}"));

    let record = CycleRecord {
        cycle,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        prompt: prompt.to_string(),
        category,
        files_changed: counts.files_changed,
        insertions: counts.insertions,
        deletions: counts.deletions,
    };
    session.record(&record);
    log.append(&record)?;
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command;

    fn commit_count(workdir: &Path) -> u64 {
        let out = Command::new("git")
            .args(["rev-list", "--count", "HEAD"])
            .current_dir(workdir)
            .output()
            .expect("run git");
        assert!(out.status.success(), "rev-list failed");
        String::from_utf8_lossy(&out.stdout)
            .trim()
            .parse()
            .expect("parse count")
    }

    fn setup() -> (tempfile::TempDir, Git, MetricsLog) {
        let temp = tempfile::tempdir().expect("tempdir");
        let git = Git::new(temp.path());
        fs::write(temp.path().join("index.js"), "// seed\n").expect("write");
        init_repo(&git);
        let log = MetricsLog::new(temp.path().join("metrics.jsonl"));
        (temp, git, log)
    }

    #[test]
    fn init_repo_is_idempotent() {
        let (temp, git, _log) = setup();
        init_repo(&git);
        assert_eq!(commit_count(temp.path()), 1);
    }

    #[test]
    fn clean_tree_measures_as_noop() {
        let (temp, git, log) = setup();
        let mut session = Session::new();

        let result = measure(&git, &log, &mut session, 1, "prompt", Category::Additive)
            .expect("measure");

        assert!(result.is_none());
        assert!(!log.path().exists(), "no-op cycle must not touch the log");
        assert_eq!(commit_count(temp.path()), 1);
        assert_eq!(session.cycles, 0);
    }

    #[test]
    fn changed_tree_commits_and_appends_one_line() {
        let (temp, git, log) = setup();
        let mut session = Session::new();
        fs::write(temp.path().join("cache.js"), "module.exports = {};\n").expect("write");

        let record = measure(&git, &log, &mut session, 1, "add a cache", Category::Expansion)
            .expect("measure")
            .expect("record");

        assert_eq!(record.cycle, 1);
        assert_eq!(record.files_changed, 1);
        assert!(record.insertions >= 1);
        assert_eq!(commit_count(temp.path()), 2);

        let contents = fs::read_to_string(log.path()).expect("read log");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        let parsed: CycleRecord = serde_json::from_str(lines[0]).expect("parse line");
        assert_eq!(parsed, record);

        assert_eq!(session.cycles, 1);
        assert_eq!(session.total_files_changed, 1);
    }

    #[test]
    fn session_totals_sum_across_cycles() {
        let (temp, git, log) = setup();
        let mut session = Session::new();

        fs::write(temp.path().join("a.js"), "const a = 1;\n").expect("write");
        let first = measure(&git, &log, &mut session, 1, "one", Category::Additive)
            .expect("measure")
            .expect("record");
        fs::write(temp.path().join("b.js"), "const b = 2;\nconst c = 3;\n").expect("write");
        let second = measure(&git, &log, &mut session, 2, "two", Category::Structural)
            .expect("measure")
            .expect("record");

        assert_eq!(session.cycles, 2);
        assert_eq!(
            session.total_insertions,
            first.insertions + second.insertions
        );
        assert_eq!(
            session.total_files_changed,
            first.files_changed + second.files_changed
        );
        assert_eq!(commit_count(temp.path()), 3);
    }

    #[test]
    fn git_failure_degrades_to_noop() {
        // No repository at all: every git call yields empty output, so the
        // cycle measures as a no-op instead of failing.
        let temp = tempfile::tempdir().expect("tempdir");
        let git = Git::new(temp.path().join("missing"));
        let log = MetricsLog::new(temp.path().join("metrics.jsonl"));
        let mut session = Session::new();

        let result = measure(&git, &log, &mut session, 1, "prompt", Category::Additive)
            .expect("measure");
        assert!(result.is_none());
        assert!(!log.path().exists());
    }
}
