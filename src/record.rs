//! Record definition
//!
//! The unit stored by every backend and journaled by the durable log.

use serde::{Deserialize, Serialize};

/// A shortened URL owned by one session.
///
/// Field names on disk follow the log line format
/// `{"Key":..,"UUID":..,"Value":..,"IsDeleted":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Short key, a stringified decimal integer
    #[serde(rename = "Key")]
    pub key: String,

    /// Session identifier of the creator
    #[serde(rename = "UUID")]
    pub owner_id: String,

    /// The long URL the key redirects to
    #[serde(rename = "Value")]
    pub original_url: String,

    /// Set by soft delete; older log lines omit it
    #[serde(rename = "IsDeleted", default)]
    pub is_deleted: bool,
}

impl Record {
    /// Create a live record
    pub fn new(
        key: impl Into<String>,
        owner_id: impl Into<String>,
        original_url: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            owner_id: owner_id.into(),
            original_url: original_url.into(),
            is_deleted: false,
        }
    }

    /// Copy of this record with the deletion flag set
    pub fn deleted(&self) -> Self {
        Self {
            is_deleted: true,
            ..self.clone()
        }
    }

    /// Numeric value of the key, if it is one
    pub fn numeric_key(&self) -> Option<u64> {
        self.key.parse().ok()
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}
