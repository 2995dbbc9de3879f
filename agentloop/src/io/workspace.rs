//! Workspace seeding and file listing.
//!
//! The workspace is the directory the agent edits. Seeding writes a small
//! fixture project exactly once; files the agent has since modified are
//! never overwritten, and the workspace is never deleted.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Baseline fixture files written into a fresh workspace.
const FIXTURE_FILES: [(&str, &str); 5] = [
    ("index.js", include_str!("../fixtures/index.js")),
    ("routes.js", include_str!("../fixtures/routes.js")),
    ("utils.js", include_str!("../fixtures/utils.js")),
    ("config.js", include_str!("../fixtures/config.js")),
    ("middleware.js", include_str!("../fixtures/middleware.js")),
];

/// Ensure the workspace exists and contains the baseline fixtures.
///
/// Idempotent: existing files are left untouched, so re-seeding after the
/// agent has worked never clobbers its changes.
pub fn seed_workspace(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create workspace {}", dir.display()))?;
    for (name, contents) in FIXTURE_FILES {
        let path = dir.join(name);
        if path.exists() {
            continue;
        }
        debug!(file = name, "seeding fixture file");
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

/// List `.js` files in the workspace for prompt placeholder resolution.
///
/// An unreadable workspace degrades to an empty listing; the generator falls
/// back to its fixed default list in that case.
pub fn list_source_files(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(err = %err, "workspace unreadable");
            return Vec::new();
        }
    };
    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".js"))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_writes_all_fixture_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let workspace = temp.path().join("workspace");
        seed_workspace(&workspace).expect("seed");

        for (name, contents) in FIXTURE_FILES {
            let written = fs::read_to_string(workspace.join(name)).expect("read fixture");
            assert_eq!(written, contents);
        }
    }

    #[test]
    fn seed_never_overwrites_modified_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let workspace = temp.path().join("workspace");
        seed_workspace(&workspace).expect("seed");

        fs::write(workspace.join("index.js"), "// modified by the agent\n").expect("write");
        seed_workspace(&workspace).expect("re-seed");

        let contents = fs::read_to_string(workspace.join("index.js")).expect("read");
        assert_eq!(contents, "// modified by the agent\n");
    }

    #[test]
    fn listing_filters_and_sorts_js_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("b.js"), "").expect("write");
        fs::write(temp.path().join("a.js"), "").expect("write");
        fs::write(temp.path().join("notes.md"), "").expect("write");

        assert_eq!(list_source_files(temp.path()), vec!["a.js", "b.js"]);
    }

    #[test]
    fn listing_unreadable_directory_is_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("does-not-exist");
        assert!(list_source_files(&missing).is_empty());
    }
}
