use crate::db::StashDbError;
use crate::stash_value::{Document, StashValue};

// ─── Document encoding ──────────────────────────────────────────────────────
//
// A stash is stored as one CBOR map. Nested objects and arrays are encoded
// inline, so the whole document round-trips through a single value.

pub fn serialize_document(doc: &Document) -> Result<Vec<u8>, StashDbError> {
    let mut buf = Vec::with_capacity(64);
    serialize_document_into(doc, &mut buf)?;
    Ok(buf)
}

/// Same as [`serialize_document`], but reuses the caller's buffer.
/// The buffer is cleared but retains its capacity.
pub fn serialize_document_into(doc: &Document, buf: &mut Vec<u8>) -> Result<(), StashDbError> {
    buf.clear();
    cbor4ii::serde::to_writer(&mut *buf, doc)
        .map_err(|e| StashDbError::Serialization(e.to_string()))
}

pub fn deserialize_document(bytes: &[u8]) -> Result<Document, StashDbError> {
    let cbor_val: cbor4ii::core::Value = cbor4ii::serde::from_slice(bytes)
        .map_err(|e| StashDbError::Serialization(format!("{e:?}")))?;
    match StashValue::from(cbor_val) {
        StashValue::Object(doc) => Ok(doc),
        other => Err(StashDbError::Serialization(format!(
            "stash root must be an object, found {}",
            other.type_name()
        ))),
    }
}
