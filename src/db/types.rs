use rustc_hash::FxHasher;
use smol_str::SmolStr;
use std::fmt;
use std::hash::BuildHasherDefault;
use thiserror::Error;

use crate::stash_value::Document;

pub type FastMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;

pub const KEY_SEPARATOR: char = ':';

/// Addresses one stash field of one host record.
///
/// Stored in redb as `"{record_id}:{field}"`, so neither part may contain ':'.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StashKey {
    pub record_id: SmolStr,
    pub field: SmolStr,
}

impl StashKey {
    pub fn new(record_id: impl Into<SmolStr>, field: impl Into<SmolStr>) -> Result<Self, StashDbError> {
        let record_id = record_id.into();
        let field = field.into();
        validate_key_part(&record_id)?;
        validate_key_part(&field)?;
        Ok(Self { record_id, field })
    }
}

pub(crate) fn validate_key_part(part: &str) -> Result<(), StashDbError> {
    if part.is_empty() || part.contains(KEY_SEPARATOR) {
        return Err(StashDbError::InvalidKey(part.to_string()));
    }
    Ok(())
}

impl fmt::Display for StashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.record_id, KEY_SEPARATOR, self.field)
    }
}

/// Change-detection token for one stash field.
///
/// `UNSET` (0) means the field has never been written. Every committed
/// write, and every removal, bumps it by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VersionToken(pub u64);

impl VersionToken {
    pub const UNSET: VersionToken = VersionToken(0);

    #[inline]
    pub fn next(self) -> VersionToken {
        VersionToken(self.0 + 1)
    }
}

/// A freshly read copy of a stash field together with its version.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// `None` while the field is unset.
    pub document: Option<Document>,
    pub version: VersionToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Committed(VersionToken),
    /// Another writer committed since the snapshot was taken.
    Conflict { current: VersionToken },
}

#[derive(Debug, Error)]
pub enum StashDbError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Record id or field name is empty or contains ':'.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl From<redb::DatabaseError> for StashDbError {
    fn from(e: redb::DatabaseError) -> Self {
        StashDbError::Redb(e.into())
    }
}

impl From<redb::TransactionError> for StashDbError {
    fn from(e: redb::TransactionError) -> Self {
        StashDbError::Redb(e.into())
    }
}

impl From<redb::TableError> for StashDbError {
    fn from(e: redb::TableError) -> Self {
        StashDbError::Redb(e.into())
    }
}

impl From<redb::CommitError> for StashDbError {
    fn from(e: redb::CommitError) -> Self {
        StashDbError::Redb(e.into())
    }
}

impl From<redb::StorageError> for StashDbError {
    fn from(e: redb::StorageError) -> Self {
        StashDbError::Redb(e.into())
    }
}
