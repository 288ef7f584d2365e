// ─── Error ──────────────────────────────────────────────────────────────────
use crate::db::StashDbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StashError {
    #[error("invalid path: {0:?}")]
    InvalidPath(String),
    #[error("key not set: {0}")]
    KeyNotSet(String),
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    /// The write would nest the document deeper than it can be stored.
    #[error("value at {path} would nest {depth} levels deep (limit {limit})")]
    TooDeep {
        path: String,
        depth: usize,
        limit: usize,
    },
    #[error("numeric overflow at {0}")]
    Overflow(String),
    /// Every attempt lost the race against another writer.
    #[error("concurrent modification: gave up after {attempts} attempts")]
    ConcurrentModification { attempts: usize },
    #[error(transparent)]
    Db(#[from] StashDbError),
}

impl StashError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StashError::ConcurrentModification { .. })
    }
}
