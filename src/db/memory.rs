use parking_lot::Mutex;

use super::backend::StashBackend;
use super::types::{FastMap, Snapshot, StashDbError, StashKey, VersionToken, WriteOutcome};
use crate::stash_value::Document;

/// In-process stash backend. The compare-and-swap runs under one mutex.
#[derive(Default)]
pub struct MemoryDb {
    fields: Mutex<FastMap<StashKey, Snapshot>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields that currently hold a document.
    pub fn len(&self) -> usize {
        self.fields
            .lock()
            .values()
            .filter(|snapshot| snapshot.document.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StashBackend for MemoryDb {
    fn read(&self, key: &StashKey) -> Result<Snapshot, StashDbError> {
        Ok(self.fields.lock().get(key).cloned().unwrap_or_default())
    }

    fn conditional_write(
        &self,
        key: &StashKey,
        document: &Document,
        expected: VersionToken,
    ) -> Result<WriteOutcome, StashDbError> {
        let mut fields = self.fields.lock();
        let entry = fields.entry(key.clone()).or_default();
        if entry.version != expected {
            return Ok(WriteOutcome::Conflict {
                current: entry.version,
            });
        }
        entry.version = entry.version.next();
        entry.document = Some(document.clone());
        Ok(WriteOutcome::Committed(entry.version))
    }

    fn remove(&self, key: &StashKey) -> Result<bool, StashDbError> {
        let mut fields = self.fields.lock();
        match fields.get_mut(key) {
            Some(entry) if entry.document.is_some() => {
                entry.document = None;
                entry.version = entry.version.next();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
