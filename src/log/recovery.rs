//! Log Recovery
//!
//! Rebuilds store state by replaying the log.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::record::Record;

use super::LogReader;

/// Handles log replay at startup
pub struct LogRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of records successfully read
    pub entries_recovered: u64,

    /// Number of unreadable lines skipped
    pub entries_corrupted: u64,

    /// Highest numeric key seen, if any
    pub highest_key: Option<u64>,
}

impl LogRecovery {
    /// Read every valid record from a log file, in file order
    ///
    /// A missing file is an empty log.
    pub fn recover(path: &Path) -> Result<(Vec<Record>, RecoveryResult)> {
        let mut result = RecoveryResult::default();
        if !path.exists() {
            return Ok((Vec::new(), result));
        }

        let mut entries = LogReader::open(path)?.entries();
        let mut records = Vec::new();
        for record in entries.by_ref() {
            let record = record?;
            result.entries_recovered += 1;
            if let Some(n) = record.numeric_key() {
                result.highest_key = Some(result.highest_key.map_or(n, |h| h.max(n)));
            }
            records.push(record);
        }
        result.entries_corrupted = entries.lines_skipped();

        Ok((records, result))
    }

    /// Scan a log file without keeping its records
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::recover(path).map(|(_, result)| result)
    }
}

/// Fold records by key; a later record replaces an earlier one
pub fn fold(records: impl IntoIterator<Item = Record>) -> HashMap<String, Record> {
    let mut map = HashMap::new();
    for record in records {
        map.insert(record.key.clone(), record);
    }
    map
}
