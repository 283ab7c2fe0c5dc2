//! Log Writer
//!
//! Handles appending records to the log file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::LogSyncStrategy;
use crate::error::Result;
use crate::record::Record;

use super::entry::{encode_line, DELIMITER};

/// Appends records to the log file
pub struct LogWriter {
    /// Location of the log (for diagnostics)
    path: PathBuf,

    /// File opened in append mode
    file: File,

    /// When to fsync
    sync_strategy: LogSyncStrategy,

    /// Appends written since the last fsync
    unsynced: usize,

    /// Records appended through this writer
    entries_written: u64,

    /// The file may end in an unterminated line (crash or failed write);
    /// the next append starts with a delimiter so it lands on a fresh line
    torn_tail: bool,
}

impl LogWriter {
    /// Open or create a log file for appending
    pub fn open(path: &Path, sync_strategy: LogSyncStrategy) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let torn_tail = Self::ends_without_delimiter(&mut file)?;
        if torn_tail {
            tracing::warn!("Log {} ends with a partial line", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            sync_strategy,
            unsynced: 0,
            entries_written: 0,
            torn_tail,
        })
    }

    /// Append a record to the log
    ///
    /// Returns once the line is written and, when the sync strategy calls
    /// for it, fsynced. On any write or sync failure the file is cut back
    /// to its length before the call, so a rejected record is never
    /// replayed.
    pub fn append(&mut self, record: &Record) -> Result<()> {
        let line = encode_line(record)?;
        let start = self.file.metadata()?.len();

        let mut buf = Vec::with_capacity(line.len() + 1);
        if self.torn_tail {
            buf.push(DELIMITER);
        }
        buf.extend_from_slice(&line);

        if let Err(e) = self.file.write_all(&buf) {
            self.rollback(start);
            return Err(e.into());
        }
        self.unsynced += 1;

        let sync_due = match self.sync_strategy {
            LogSyncStrategy::EveryWrite => true,
            LogSyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };
        if sync_due {
            if let Err(e) = self.sync() {
                self.unsynced -= 1;
                self.rollback(start);
                return Err(e);
            }
        }

        self.torn_tail = false;
        self.entries_written += 1;
        Ok(())
    }

    /// Cut the file back to `len`, dropping a line whose append failed
    ///
    /// If truncation fails too, the tail may hold a partial line and the
    /// next append starts with a delimiter.
    fn rollback(&mut self, len: u64) {
        if let Err(e) = self.file.set_len(len) {
            tracing::warn!(
                "Failed to roll back log {} to {} bytes: {}",
                self.path.display(),
                len,
                e
            );
            self.torn_tail = true;
        }
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Number of records appended through this writer
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    /// Appends not yet fsynced
    pub fn unsynced(&self) -> usize {
        self.unsynced
    }

    fn ends_without_delimiter(file: &mut File) -> Result<bool> {
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::Start(len - 1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != DELIMITER)
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        if self.unsynced > 0 {
            if let Err(e) = self.sync() {
                tracing::error!("Failed to sync log {} on close: {}", self.path.display(), e);
            }
        }
    }
}
