//! `git reflog show --date=unix --no-decorate`

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{lines, unparsable};
use crate::operation::OperationKind;
use crate::Result;

/// `<hash> <ref>@{<unix>}: <action>: <message>`
static REFLOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-f]{4,64}) (\S+)@\{(\d+)\}: (.*)$").expect("reflog pattern is valid")
});

/// One reference update, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflogEntry {
    /// Position in the log; `0` is the newest entry
    pub index: usize,
    pub hash: String,
    pub ref_name: String,
    /// e.g. `commit`, `checkout`, `reset`, `commit (amend)`
    pub action: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

pub fn parse_reflog(stdout: &str) -> Result<Vec<ReflogEntry>> {
    lines(stdout)
        .enumerate()
        .map(|(index, line)| parse_line(index, line))
        .collect()
}

fn parse_line(index: usize, line: &str) -> Result<ReflogEntry> {
    let op = OperationKind::Reflog;
    let caps = REFLOG_LINE
        .captures(line)
        .ok_or_else(|| unparsable(op, line))?;

    let timestamp = caps[3]
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| unparsable(op, line))?;

    // Entries written by `update-ref -m` carry no action prefix
    let (action, message) = match caps[4].split_once(": ") {
        Some((action, message)) => (action.to_string(), message.to_string()),
        None => (caps[4].to_string(), String::new()),
    };

    Ok(ReflogEntry {
        index,
        hash: caps[1].to_string(),
        ref_name: caps[2].to_string(),
        action,
        message,
        timestamp,
    })
}
