//! Durable Log Module
//!
//! Append-only journal backing the file variant of the store.
//!
//! ## Responsibilities
//! - Append a record before it becomes visible in memory
//! - fsync according to the configured strategy
//! - Replay on startup, skipping lines that do not parse
//! - Fold replayed records by key, last write wins
//!
//! ## File Format
//! ```text
//! {"Key":"2","UUID":"user1","Value":"https://example.com/a","IsDeleted":false}\n
//! {"Key":"3","UUID":"user1","Value":"https://example.com/b","IsDeleted":false}\n
//! {"Key":"2","UUID":"user1","Value":"https://example.com/a","IsDeleted":true}\n
//! ```
//!
//! A soft delete re-appends the whole record with `IsDeleted` set, so the
//! later line for a key supersedes the earlier one.

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{decode_line, encode_line, DELIMITER};
pub use writer::LogWriter;
pub use reader::{LogIterator, LogReader};
pub use recovery::{fold, LogRecovery, RecoveryResult};
