//! `git diff --numstat`

use serde::{Deserialize, Serialize};

use super::{lines, unparsable};
use crate::operation::OperationKind;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStatEntry {
    /// As printed by git; renames appear as `old => new` or `dir/{old => new}`
    pub path: String,
    /// `None` for binary files
    pub insertions: Option<u32>,
    pub deletions: Option<u32>,
}

impl DiffStatEntry {
    pub fn is_binary(&self) -> bool {
        self.insertions.is_none() && self.deletions.is_none()
    }
}

/// Parse `<insertions>\t<deletions>\t<path>` lines; binary files use `-`.
pub fn parse_numstat(stdout: &str) -> Result<Vec<DiffStatEntry>> {
    lines(stdout)
        .map(|line| {
            let mut fields = line.splitn(3, '\t');
            let (Some(ins), Some(del), Some(path)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(unparsable(OperationKind::Diff, line));
            };
            Ok(DiffStatEntry {
                path: path.to_string(),
                insertions: count(ins, line)?,
                deletions: count(del, line)?,
            })
        })
        .collect()
}

fn count(field: &str, line: &str) -> Result<Option<u32>> {
    if field == "-" {
        return Ok(None);
    }
    field
        .parse()
        .map(Some)
        .map_err(|_| unparsable(OperationKind::Diff, line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numstat() {
        let entries = parse_numstat("3\t1\tsrc/lib.rs\n-\t-\tlogo.png\n0\t0\tsrc/{a.rs => b.rs}\n")
            .unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].insertions, Some(3));
        assert_eq!(entries[0].deletions, Some(1));
        assert!(entries[1].is_binary());
        assert_eq!(entries[2].path, "src/{a.rs => b.rs}");
    }

    #[test]
    fn test_numstat_rejects_text_diff() {
        assert!(parse_numstat("diff --git a/x b/x\n").is_err());
    }
}
