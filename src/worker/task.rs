//! Deletion task definition

use std::collections::BTreeSet;

/// Request to soft-delete a batch of keys on behalf of one owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionTask {
    /// Keys to delete; duplicates collapse
    pub keys: BTreeSet<String>,

    /// Session requesting the deletion
    pub owner_id: String,
}

impl DeletionTask {
    pub fn new<I, K>(keys: I, owner_id: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            owner_id: owner_id.into(),
        }
    }
}
