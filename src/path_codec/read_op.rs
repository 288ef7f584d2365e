use super::StashPath;
use crate::stash_value::{Document, StashValue};

/// Look up the value at `path`.
///
/// `None` means nothing is stored there: a segment is absent, or an
/// intermediate value is not an object. An explicit null comes back as
/// `Some(&StashValue::Null)`.
pub fn get<'a>(doc: &'a Document, path: &StashPath) -> Option<&'a StashValue> {
    let (parents, last) = path.split_last();
    let mut current = doc;
    for segment in parents {
        current = current.get(segment)?.as_object()?;
    }
    current.get(last)
}

#[inline]
pub fn contains(doc: &Document, path: &StashPath) -> bool {
    get(doc, path).is_some()
}
