//! `git log --format=<LOG_FORMAT>`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::unparsable;
use crate::operation::OperationKind;
use crate::Result;

/// Fields separated by `0x1f`, records terminated by `0x1e`.
pub const LOG_FORMAT: &str = "%H%x1f%h%x1f%an%x1f%ae%x1f%at%x1f%P%x1f%s%x1e";

const FIELD_COUNT: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub short_hash: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
    /// Empty for a root commit, two or more for a merge
    pub parents: Vec<String>,
    pub subject: String,
}

pub fn parse_log(stdout: &str) -> Result<Vec<CommitInfo>> {
    stdout
        .split('\x1e')
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .map(parse_record)
        .collect()
}

fn parse_record(record: &str) -> Result<CommitInfo> {
    let op = OperationKind::Log;
    let fields: Vec<&str> = record.splitn(FIELD_COUNT, '\x1f').collect();
    let [hash, short_hash, name, email, time, parents, subject] = fields[..] else {
        return Err(unparsable(op, record));
    };

    let timestamp = time
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| unparsable(op, record))?;

    Ok(CommitInfo {
        hash: hash.to_string(),
        short_hash: short_hash.to_string(),
        author_name: name.to_string(),
        author_email: email.to_string(),
        timestamp,
        parents: parents.split_whitespace().map(str::to_string).collect(),
        subject: subject.to_string(),
    })
}
