//! `git status --porcelain=v2 --branch`

use serde::{Deserialize, Serialize};

use super::{lines, unparsable, unquote_path};
use crate::operation::OperationKind;
use crate::Result;

/// A path that moved, with git's similarity score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedPath {
    pub from: String,
    pub to: String,
    pub score: u8,
}

/// Working tree state of a repository.
///
/// Each changed path appears in exactly one category. Type changes are
/// reported as modified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Current branch, `None` when HEAD is detached
    pub branch: Option<String>,
    /// HEAD commit, `None` before the first commit
    pub head: Option<String>,
    pub upstream: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub renamed: Vec<RenamedPath>,
    pub copied: Vec<RenamedPath>,
    pub untracked: Vec<String>,
    pub conflicted: Vec<String>,
}

impl StatusReport {
    /// No staged, unstaged, untracked or conflicted paths.
    pub fn is_clean(&self) -> bool {
        self.added.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
            && self.copied.is_empty()
            && self.untracked.is_empty()
            && self.conflicted.is_empty()
    }
}

const OP: OperationKind = OperationKind::Status;

/// Parse porcelain v2 output.
///
/// The `# branch.head` header is required; other `#` headers git may add
/// are ignored.
pub fn parse_status(stdout: &str) -> Result<StatusReport> {
    let mut report = StatusReport::default();
    let mut saw_head = false;

    for line in lines(stdout) {
        if let Some(header) = line.strip_prefix("# ") {
            saw_head |= parse_header(&mut report, header, line)?;
            continue;
        }

        let (kind, rest) = line.split_once(' ').ok_or_else(|| unparsable(OP, line))?;
        match kind {
            "1" => parse_ordinary(&mut report, rest, line)?,
            "2" => parse_renamed(&mut report, rest, line)?,
            "u" => {
                let fields: Vec<&str> = rest.splitn(10, ' ').collect();
                let path = fields.get(9).ok_or_else(|| unparsable(OP, line))?;
                report.conflicted.push(path_field(path, line)?);
            }
            "?" => report.untracked.push(path_field(rest, line)?),
            "!" => {}
            _ => return Err(unparsable(OP, line)),
        }
    }

    if !saw_head {
        return Err(unparsable(OP, "missing '# branch.head' header"));
    }
    Ok(report)
}

/// Returns true for the `branch.head` header.
fn parse_header(report: &mut StatusReport, header: &str, line: &str) -> Result<bool> {
    let Some((key, value)) = header.split_once(' ') else {
        return Ok(false);
    };
    match key {
        "branch.oid" => {
            report.head = (value != "(initial)").then(|| value.to_string());
        }
        "branch.head" => {
            report.branch = (value != "(detached)").then(|| value.to_string());
            return Ok(true);
        }
        "branch.upstream" => report.upstream = Some(value.to_string()),
        "branch.ab" => {
            let (ahead, behind) = value
                .split_once(' ')
                .and_then(|(a, b)| {
                    let ahead: u32 = a.strip_prefix('+')?.parse().ok()?;
                    let behind: u32 = b.strip_prefix('-')?.parse().ok()?;
                    Some((ahead, behind))
                })
                .ok_or_else(|| unparsable(OP, line))?;
            report.ahead = ahead;
            report.behind = behind;
        }
        _ => {}
    }
    Ok(false)
}

fn path_field(raw: &str, line: &str) -> Result<String> {
    unquote_path(raw).ok_or_else(|| unparsable(OP, line))
}

/// `<XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>`
fn parse_ordinary(report: &mut StatusReport, rest: &str, line: &str) -> Result<()> {
    let fields: Vec<&str> = rest.splitn(8, ' ').collect();
    let (Some(xy), Some(path)) = (fields.first(), fields.get(7)) else {
        return Err(unparsable(OP, line));
    };
    let mut codes = xy.chars();
    let (Some(x), Some(y), None) = (codes.next(), codes.next(), codes.next()) else {
        return Err(unparsable(OP, line));
    };
    let path = path_field(path, line)?;

    if x == 'A' || y == 'A' {
        report.added.push(path);
    } else if x == 'D' || y == 'D' {
        report.deleted.push(path);
    } else if matches!(x, 'M' | 'T') || matches!(y, 'M' | 'T') {
        report.modified.push(path);
    } else {
        return Err(unparsable(OP, line));
    }
    Ok(())
}

/// `<XY> <sub> <mH> <mI> <mW> <hH> <hI> <X><score> <path>\t<origPath>`
fn parse_renamed(report: &mut StatusReport, rest: &str, line: &str) -> Result<()> {
    let fields: Vec<&str> = rest.splitn(9, ' ').collect();
    let (Some(score_field), Some(paths)) = (fields.get(7), fields.get(8)) else {
        return Err(unparsable(OP, line));
    };
    let (to, from) = paths.split_once('\t').ok_or_else(|| unparsable(OP, line))?;

    let mut score_chars = score_field.chars();
    let kind = score_chars.next();
    let score: u8 = score_chars
        .as_str()
        .parse()
        .map_err(|_| unparsable(OP, line))?;

    let entry = RenamedPath {
        from: path_field(from, line)?,
        to: path_field(to, line)?,
        score,
    };
    match kind {
        Some('R') => report.renamed.push(entry),
        Some('C') => report.copied.push(entry),
        _ => return Err(unparsable(OP, line)),
    }
    Ok(())
}
