use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use tracing::trace;

use super::backend::StashBackend;
use super::types::{Snapshot, StashDbError, StashKey, VersionToken, WriteOutcome};
use crate::serialization::{deserialize_document, serialize_document};
use crate::stash_value::Document;

// Table definitions
// Key: "record_id:field"
// Value: CBOR-encoded document / version counter
const STASH_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("stash");
const VERSION_TABLE: TableDefinition<&str, u64> = TableDefinition::new("versions");

/// Durable stash backend on a single redb file.
///
/// redb serialises write transactions, so the version check and the write in
/// `conditional_write` happen under the same writer lock.
pub struct StashDb {
    db: Database,
}

impl StashDb {
    /// Open or create the database at the specified path.
    /// Also ensures that the required tables exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StashDbError> {
        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(STASH_TABLE)?;
            let _ = write_txn.open_table(VERSION_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Current version of a field without decoding its document.
    pub fn get_version(&self, key: &StashKey) -> Result<VersionToken, StashDbError> {
        let encoded = key.to_string();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(VERSION_TABLE)?;
        Ok(table
            .get(encoded.as_str())?
            .map(|access| VersionToken(access.value()))
            .unwrap_or_default())
    }
}

impl StashBackend for StashDb {
    fn read(&self, key: &StashKey) -> Result<Snapshot, StashDbError> {
        let encoded = key.to_string();
        // Both tables are read in one transaction so document and version agree.
        let read_txn = self.db.begin_read()?;
        let stash = read_txn.open_table(STASH_TABLE)?;
        let versions = read_txn.open_table(VERSION_TABLE)?;

        let document = match stash.get(encoded.as_str())? {
            Some(access) => Some(deserialize_document(access.value())?),
            None => None,
        };
        let version = versions
            .get(encoded.as_str())?
            .map(|access| VersionToken(access.value()))
            .unwrap_or_default();

        Ok(Snapshot { document, version })
    }

    fn conditional_write(
        &self,
        key: &StashKey,
        document: &Document,
        expected: VersionToken,
    ) -> Result<WriteOutcome, StashDbError> {
        // Encode before begin_write() to keep the writer lock short.
        let bytes = serialize_document(document)?;
        let encoded = key.to_string();

        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut versions = write_txn.open_table(VERSION_TABLE)?;
            let current = versions
                .get(encoded.as_str())?
                .map(|access| VersionToken(access.value()))
                .unwrap_or_default();

            if current != expected {
                WriteOutcome::Conflict { current }
            } else {
                let next = current.next();
                versions.insert(encoded.as_str(), next.0)?;
                let mut stash = write_txn.open_table(STASH_TABLE)?;
                stash.insert(encoded.as_str(), bytes.as_slice())?;
                WriteOutcome::Committed(next)
            }
        };

        match outcome {
            WriteOutcome::Committed(version) => {
                write_txn.commit()?;
                trace!(key = %key, version = version.0, "stash committed");
            }
            WriteOutcome::Conflict { current } => {
                write_txn.abort()?;
                trace!(key = %key, expected = expected.0, current = current.0, "stash version conflict");
            }
        }
        Ok(outcome)
    }

    /// Removes the document. The version is bumped rather than cleared, so a
    /// writer holding a pre-removal snapshot still conflicts.
    fn remove(&self, key: &StashKey) -> Result<bool, StashDbError> {
        let encoded = key.to_string();
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut stash = write_txn.open_table(STASH_TABLE)?;
            let existed = stash.remove(encoded.as_str())?.is_some();
            if existed {
                let mut versions = write_txn.open_table(VERSION_TABLE)?;
                let current = versions
                    .get(encoded.as_str())?
                    .map(|access| VersionToken(access.value()))
                    .unwrap_or_default();
                versions.insert(encoded.as_str(), current.next().0)?;
            }
            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }
}
