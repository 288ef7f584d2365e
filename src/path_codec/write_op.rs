use super::{MAX_DEPTH, StashPath};
use crate::error::StashError;
use crate::stash_value::{Document, StashValue};

/// Store `value` at `path`, creating missing intermediate objects.
///
/// Whatever was at the final key is replaced. Walking through a value that
/// is not an object fails with [`StashError::TypeMismatch`]; it is never
/// overwritten to make room. A value that would nest past [`MAX_DEPTH`]
/// is refused with [`StashError::TooDeep`] before anything changes.
pub fn set(doc: &mut Document, path: &StashPath, value: StashValue) -> Result<(), StashError> {
    let depth = path.len() + value.nesting_depth();
    if depth > MAX_DEPTH {
        return Err(StashError::TooDeep {
            path: path.to_string(),
            depth,
            limit: MAX_DEPTH,
        });
    }
    let (parents, last) = path.split_last();
    let mut current = doc;
    // Once a segment is created every deeper one is created too, so a
    // mismatch can only occur before anything was inserted.
    for (depth, segment) in parents.iter().enumerate() {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| StashValue::Object(Document::new()));
        current = match slot {
            StashValue::Object(map) => map,
            other => return Err(type_mismatch(path, depth, other)),
        };
    }
    current.insert(last.clone(), value);
    Ok(())
}

/// Remove the value at `path` and return it.
///
/// A missing intermediate segment or final key is `Ok(None)` and the
/// document is left untouched.
pub fn delete(doc: &mut Document, path: &StashPath) -> Result<Option<StashValue>, StashError> {
    let (parents, last) = path.split_last();
    let mut current = doc;
    for (depth, segment) in parents.iter().enumerate() {
        current = match current.get_mut(segment) {
            None => return Ok(None),
            Some(StashValue::Object(map)) => map,
            Some(other) => return Err(type_mismatch(path, depth, other)),
        };
    }
    Ok(current.remove(last))
}

fn type_mismatch(path: &StashPath, depth: usize, found: &StashValue) -> StashError {
    StashError::TypeMismatch {
        path: path.prefix(depth),
        expected: "object",
        found: found.type_name(),
    }
}
