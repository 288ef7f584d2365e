use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::column::StashColumn;
use crate::db::{Snapshot, StashBackend, StashKey, VersionToken, WriteOutcome};
use crate::error::StashError;
use crate::path_codec::{self, MAX_DEPTH, StashPath};
use crate::stash_value::{Document, StashNumber, StashValue, document_depth};

/// Result of one attempt's mutation step.
enum Mutation<T> {
    /// Persist the mutated document, then return `T`.
    Write(T),
    /// Nothing changed; return `T` without writing.
    Unchanged(T),
}

/// Per-record handle on one stash field.
///
/// Holds no document between calls. Every write reads a fresh snapshot,
/// mutates its own copy and commits with a conditional write against the
/// snapshot's version; on conflict the whole step is redone against a new
/// snapshot, up to the column's retry budget.
pub struct StashController<'a, B: StashBackend> {
    backend: &'a B,
    column: &'a StashColumn,
    key: StashKey,
}

impl<'a, B: StashBackend> StashController<'a, B> {
    pub fn new(
        backend: &'a B,
        column: &'a StashColumn,
        record_id: impl Into<SmolStr>,
    ) -> Result<Self, StashError> {
        let key = StashKey::new(record_id, column.field_name())?;
        Ok(Self {
            backend,
            column,
            key,
        })
    }

    pub fn key(&self) -> &StashKey {
        &self.key
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Store a copy of the column's initial value if the field is unset.
    /// Returns `false` when the field already held a document.
    pub fn initialize_on_create(&self) -> Result<bool, StashError> {
        let depth = document_depth(self.column.initial_value());
        if depth > MAX_DEPTH {
            return Err(StashError::TooDeep {
                path: String::new(),
                depth,
                limit: MAX_DEPTH,
            });
        }
        let initialized = self.commit_with_retry("initialize", |document| {
            if document.is_some() {
                return Ok(Mutation::Unchanged(false));
            }
            *document = Some(self.column.initial_value().clone());
            Ok(Mutation::Write(true))
        })?;
        if initialized {
            debug!(key = %self.key, "stash initialized");
        }
        Ok(initialized)
    }

    /// Remove the field along with its host record.
    pub fn destroy(&self) -> Result<bool, StashError> {
        Ok(self.backend.remove(&self.key)?)
    }

    // ─── Reads ──────────────────────────────────────────────────────────────

    /// Value at `path`, or `None` if nothing is stored there.
    pub fn get(&self, path: &str) -> Result<Option<StashValue>, StashError> {
        let path = StashPath::parse(path)?;
        let snapshot = self.backend.read(&self.key)?;
        Ok(snapshot
            .document
            .as_ref()
            .and_then(|doc| path_codec::get(doc, &path))
            .cloned())
    }

    /// The whole document, or `None` while the field is unset.
    pub fn document(&self) -> Result<Option<Document>, StashError> {
        Ok(self.backend.read(&self.key)?.document)
    }

    pub fn version(&self) -> Result<VersionToken, StashError> {
        Ok(self.backend.read(&self.key)?.version)
    }

    // ─── Writes ─────────────────────────────────────────────────────────────

    /// Store `value` at `path`, creating intermediate objects. Returns `value`.
    pub fn set(&self, path: &str, value: impl Into<StashValue>) -> Result<StashValue, StashError> {
        let path = StashPath::parse(path)?;
        let value = value.into();
        self.commit_with_retry("set", |document| {
            let doc = document.get_or_insert_with(Document::new);
            path_codec::set(doc, &path, value.clone())?;
            Ok(Mutation::Write(()))
        })?;
        Ok(value)
    }

    /// Remove the value at `path` and return it. Nothing is written when
    /// there was nothing to remove.
    pub fn delete(&self, path: &str) -> Result<Option<StashValue>, StashError> {
        let path = StashPath::parse(path)?;
        self.commit_with_retry("delete", |document| {
            let Some(doc) = document.as_mut() else {
                return Ok(Mutation::Unchanged(None));
            };
            Ok(match path_codec::delete(doc, &path)? {
                Some(removed) => Mutation::Write(Some(removed)),
                None => Mutation::Unchanged(None),
            })
        })
    }

    /// Replace the value at `path` with `transform(current)`.
    ///
    /// `transform` may run more than once per call, each time against a
    /// freshly read value, so it must not have side effects.
    pub fn modify<F>(&self, path: &str, transform: F) -> Result<StashValue, StashError>
    where
        F: Fn(&StashValue) -> StashValue,
    {
        self.try_modify(path, |current| Ok(transform(current)))
    }

    /// Like [`modify`](Self::modify), but the transform may reject the value.
    pub fn try_modify<F>(&self, path: &str, transform: F) -> Result<StashValue, StashError>
    where
        F: Fn(&StashValue) -> Result<StashValue, StashError>,
    {
        let path = StashPath::parse(path)?;
        self.modify_at(&path, transform)
    }

    /// Add `delta` to the number at `path` and return the new value.
    pub fn increment(
        &self,
        path: &str,
        delta: impl Into<StashNumber>,
    ) -> Result<StashValue, StashError> {
        let path = StashPath::parse(path)?;
        let delta = delta.into();
        self.modify_at(&path, |current| {
            let number = current.as_number().ok_or_else(|| StashError::TypeMismatch {
                path: path.to_string(),
                expected: "number",
                found: current.type_name(),
            })?;
            number
                .checked_add(delta)
                .map(StashValue::Number)
                .ok_or_else(|| StashError::Overflow(path.to_string()))
        })
    }

    pub fn increment_by_one(&self, path: &str) -> Result<StashValue, StashError> {
        self.increment(path, 1i64)
    }

    fn modify_at<F>(&self, path: &StashPath, transform: F) -> Result<StashValue, StashError>
    where
        F: Fn(&StashValue) -> Result<StashValue, StashError>,
    {
        self.commit_with_retry("modify", |document| {
            let not_set = || StashError::KeyNotSet(path.to_string());
            let doc = document.as_mut().ok_or_else(not_set)?;
            let current = path_codec::get(doc, path).ok_or_else(not_set)?;
            let next = transform(current)?;
            path_codec::set(doc, path, next.clone())?;
            Ok(Mutation::Write(next))
        })
    }

    // ─── OCC loop ───────────────────────────────────────────────────────────

    /// Read, mutate, conditionally write; redo everything on a version
    /// conflict. Errors from `mutate` or the backend end the loop at once.
    fn commit_with_retry<T, F>(&self, op: &'static str, mutate: F) -> Result<T, StashError>
    where
        F: Fn(&mut Option<Document>) -> Result<Mutation<T>, StashError>,
    {
        let retry = self.column.retry();
        let attempts = retry.attempts();

        for attempt in 1..=attempts {
            let Snapshot {
                mut document,
                version,
            } = self.backend.read(&self.key)?;
            trace!(key = %self.key, op, attempt, version = version.0, "stash attempt");

            let result = match mutate(&mut document)? {
                Mutation::Unchanged(result) => return Ok(result),
                Mutation::Write(result) => result,
            };

            let document = document.unwrap_or_default();
            match self.backend.conditional_write(&self.key, &document, version)? {
                WriteOutcome::Committed(_) => return Ok(result),
                WriteOutcome::Conflict { current } => {
                    debug!(
                        key = %self.key,
                        op,
                        attempt,
                        expected = version.0,
                        current = current.0,
                        "stash write conflict"
                    );
                    if attempt < attempts {
                        std::thread::sleep(retry.delay_for(attempt));
                    }
                }
            }
        }

        warn!(key = %self.key, op, attempts, "stash retry budget exhausted");
        Err(StashError::ConcurrentModification { attempts })
    }
}
