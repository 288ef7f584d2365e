use super::types::{Snapshot, StashDbError, StashKey, VersionToken, WriteOutcome};
use crate::stash_value::Document;

/// The persistence collaborator a stash field lives in.
///
/// Implementations must make `conditional_write` an atomic compare-and-swap
/// on the version: the document is stored only if the field's current
/// version equals `expected`, and the new version is returned.
pub trait StashBackend: Send + Sync {
    fn read(&self, key: &StashKey) -> Result<Snapshot, StashDbError>;

    fn conditional_write(
        &self,
        key: &StashKey,
        document: &Document,
        expected: VersionToken,
    ) -> Result<WriteOutcome, StashDbError>;

    /// Drop the field entirely. Returns true if it existed.
    fn remove(&self, key: &StashKey) -> Result<bool, StashDbError>;
}
