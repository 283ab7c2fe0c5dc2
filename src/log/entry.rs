//! Log line encoding
//!
//! One JSON object per line, newline terminated.

use crate::error::Result;
use crate::record::Record;

/// Terminates every log line
pub const DELIMITER: u8 = b'\n';

/// Serialize a record into a complete log line (delimiter included)
pub fn encode_line(record: &Record) -> Result<Vec<u8>> {
    let mut line = serde_json::to_vec(record)?;
    line.push(DELIMITER);
    Ok(line)
}

/// Parse one log line; `None` for blank or malformed lines
pub fn decode_line(line: &[u8]) -> Option<Record> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_slice(trimmed).ok()
}
