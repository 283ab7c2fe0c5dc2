//! Log Reader
//!
//! Handles reading records from the log file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::record::Record;

use super::entry::{decode_line, DELIMITER};

/// Reads records from the log file in order
pub struct LogReader {
    reader: BufReader<File>,

    /// Scratch buffer reused across lines
    line: Vec<u8>,

    /// 1-based number of the last line read
    line_number: u64,

    /// Non-blank lines that failed to parse
    lines_skipped: u64,
}

impl LogReader {
    /// Open a log file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            line: Vec::new(),
            line_number: 0,
            lines_skipped: 0,
        })
    }

    /// Read the next parseable record
    ///
    /// Malformed lines are logged and skipped; `Ok(None)` means end of file.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            self.line.clear();
            if self.reader.read_until(DELIMITER, &mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            if self.line.trim_ascii().is_empty() {
                continue;
            }

            match decode_line(&self.line) {
                Some(record) => return Ok(Some(record)),
                None => {
                    self.lines_skipped += 1;
                    tracing::warn!("Skipping unreadable log line {}", self.line_number);
                }
            }
        }
    }

    /// Number of malformed lines skipped so far
    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped
    }

    /// Iterate over all valid records
    pub fn entries(self) -> LogIterator {
        LogIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over log records
///
/// Yields `Err` once on an I/O failure and then stops.
pub struct LogIterator {
    reader: LogReader,
    done: bool,
}

impl LogIterator {
    /// Number of malformed lines skipped so far
    pub fn lines_skipped(&self) -> u64 {
        self.reader.lines_skipped()
    }
}

impl Iterator for LogIterator {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
