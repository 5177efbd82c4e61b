//! `git clean -n` / `git clean -f`

use serde::{Deserialize, Serialize};

use super::{lines, unparsable, unquote_path};
use crate::operation::OperationKind;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    /// Nothing was deleted; the lists are what would be removed
    pub dry_run: bool,
    pub files: Vec<String>,
    /// Directories, without the trailing `/`
    pub directories: Vec<String>,
    /// Nested repositories git left alone
    pub skipped: Vec<String>,
}

const PREFIXES: [(&str, Action); 4] = [
    ("Would remove ", Action::Remove),
    ("Removing ", Action::Remove),
    ("Would skip repository ", Action::Skip),
    ("Skipping repository ", Action::Skip),
];

#[derive(Clone, Copy)]
enum Action {
    Remove,
    Skip,
}

pub fn parse_clean(stdout: &str, dry_run: bool) -> Result<CleanReport> {
    let op = OperationKind::Clean;
    let mut report = CleanReport {
        dry_run,
        ..Default::default()
    };

    for line in lines(stdout) {
        let (action, target) = PREFIXES
            .iter()
            .find_map(|(prefix, action)| line.strip_prefix(prefix).map(|t| (*action, t)))
            .ok_or_else(|| unparsable(op, line))?;
        let target = unquote_path(target).ok_or_else(|| unparsable(op, line))?;

        match action {
            Action::Skip => report.skipped.push(target.trim_end_matches('/').to_string()),
            Action::Remove => match target.strip_suffix('/') {
                Some(dir) => report.directories.push(dir.to_string()),
                None => report.files.push(target),
            },
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dry_run_splits_files_and_directories() {
        let stdout = "Would remove build/\nWould remove notes.txt\nWould skip repository vendor/lib/\n";
        let report = parse_clean(stdout, true).unwrap();
        assert_eq!(
            report,
            CleanReport {
                dry_run: true,
                files: vec!["notes.txt".into()],
                directories: vec!["build".into()],
                skipped: vec!["vendor/lib".into()],
            }
        );
    }

    #[test]
    fn test_forced_run() {
        let report = parse_clean("Removing a.tmp\nRemoving \"b c.tmp\"\n", false).unwrap();
        assert!(!report.dry_run);
        assert_eq!(report.files, vec!["a.tmp", "b c.tmp"]);
    }

    #[test]
    fn test_nothing_to_clean() {
        let report = parse_clean("", true).unwrap();
        assert!(report.files.is_empty() && report.directories.is_empty());
    }

    #[test]
    fn test_unexpected_line() {
        let err = parse_clean("warning: something odd\n", true).unwrap_err();
        assert!(matches!(err, Error::UnparsableOutput { line, .. } if line == "warning: something odd"));
    }
}
