//! Parsing of `git diff --stat` summary text.

use std::sync::LazyLock;

use regex::Regex;

static FILES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) files? changed").unwrap());
static INSERTIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) insertions?").unwrap());
static DELETIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) deletions?").unwrap());

/// Counts extracted from a diff summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStat {
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
}

/// Parse the trailing summary line of `git diff --stat` output.
///
/// Deliberately permissive: counters that do not appear (git omits
/// `deletions` when nothing was removed) parse as zero, and the first match
/// wins. Git prints the summary once, on the final line, so scanning the
/// whole text is safe.
pub fn parse_diff_stat(stat: &str) -> DiffStat {
    DiffStat {
        files_changed: first_capture(&FILES_RE, stat),
        insertions: first_capture(&INSERTIONS_RE, stat),
        deletions: first_capture(&DELETIONS_RE, stat),
    }
}

fn first_capture(re: &Regex, text: &str) -> u64 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_summary() {
        let stat = parse_diff_stat("3 files changed, 10 insertions(+), 2 deletions(-)");
        assert_eq!(
            stat,
            DiffStat {
                files_changed: 3,
                insertions: 10,
                deletions: 2
            }
        );
    }

    #[test]
    fn parses_singular_forms() {
        let stat = parse_diff_stat("1 file changed, 1 insertion(+), 1 deletion(-)");
        assert_eq!(
            stat,
            DiffStat {
                files_changed: 1,
                insertions: 1,
                deletions: 1
            }
        );
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let stat = parse_diff_stat("2 files changed, 7 insertions(+)");
        assert_eq!(stat.files_changed, 2);
        assert_eq!(stat.insertions, 7);
        assert_eq!(stat.deletions, 0);
    }

    #[test]
    fn unrecognized_text_parses_as_all_zero() {
        assert_eq!(parse_diff_stat("nothing to see here"), DiffStat::default());
    }

    #[test]
    fn parses_summary_below_per_file_lines() {
        let stat = parse_diff_stat(
            " routes.js   | 12 ++++++++----\n utils.js    |  4 ++--\n 2 files changed, 12 insertions(+), 4 deletions(-)",
        );
        assert_eq!(stat.files_changed, 2);
        assert_eq!(stat.insertions, 12);
        assert_eq!(stat.deletions, 4);
    }
}
