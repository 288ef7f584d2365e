use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// The full contents of one stash field. Always a mapping at the root.
///
/// Ordered so that two equal documents always encode to the same bytes.
pub type Document = BTreeMap<SmolStr, StashValue>;

// ─── StashNumber ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
pub enum StashNumber {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl std::fmt::Debug for StashNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StashNumber::I64(i) => write!(f, "I64({})", i),
            StashNumber::U64(u) => write!(f, "U64({})", u),
            StashNumber::F64(v) => write!(f, "F64({})", v),
        }
    }
}

impl StashNumber {
    pub fn as_f64(self) -> f64 {
        match self {
            StashNumber::I64(i) => i as f64,
            StashNumber::U64(u) => u as f64,
            StashNumber::F64(f) => f,
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            StashNumber::I64(i) => Some(i),
            StashNumber::U64(u) => i64::try_from(u).ok(),
            StashNumber::F64(f) => {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }
        }
    }

    pub fn as_u64(self) -> Option<u64> {
        match self {
            StashNumber::U64(u) => Some(u),
            StashNumber::I64(i) => u64::try_from(i).ok(),
            StashNumber::F64(f) => {
                if f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 {
                    Some(f as u64)
                } else {
                    None
                }
            }
        }
    }

    fn as_i128(self) -> Option<i128> {
        match self {
            StashNumber::I64(i) => Some(i as i128),
            StashNumber::U64(u) => Some(u as i128),
            StashNumber::F64(_) => None,
        }
    }

    /// Adds two numbers, staying integral when both sides are.
    ///
    /// Integer sums prefer `I64` and fall back to `U64` for large positive
    /// results. Returns `None` when an integer sum fits neither.
    pub fn checked_add(self, rhs: StashNumber) -> Option<StashNumber> {
        match (self.as_i128(), rhs.as_i128()) {
            (Some(a), Some(b)) => {
                let sum = a + b;
                if let Ok(i) = i64::try_from(sum) {
                    Some(StashNumber::I64(i))
                } else {
                    u64::try_from(sum).ok().map(StashNumber::U64)
                }
            }
            _ => Some(StashNumber::F64(self.as_f64() + rhs.as_f64())),
        }
    }
}

impl From<i64> for StashNumber {
    fn from(n: i64) -> Self {
        StashNumber::I64(n)
    }
}

impl From<u64> for StashNumber {
    fn from(n: u64) -> Self {
        StashNumber::U64(n)
    }
}

impl From<f64> for StashNumber {
    fn from(n: f64) -> Self {
        StashNumber::F64(n)
    }
}

// ─── StashValue ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub enum StashValue {
    #[default]
    Null,
    Bool(bool),
    Number(StashNumber),
    Str(SmolStr),
    Array(Vec<StashValue>),
    Object(Document),
}

impl StashValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StashValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<StashNumber> {
        match self {
            StashValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(StashNumber::as_f64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number()?.as_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_number()?.as_u64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StashValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Document> {
        match self {
            StashValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<StashValue>> {
        match self {
            StashValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&StashValue> {
        self.as_object()?.get(key)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StashValue::Null)
    }

    /// Number of container levels in this value: 0 for scalars, 1 for an
    /// empty array or object, plus the deepest child otherwise.
    pub fn nesting_depth(&self) -> usize {
        match self {
            StashValue::Array(arr) => 1 + arr.iter().map(StashValue::nesting_depth).max().unwrap_or(0),
            StashValue::Object(map) => 1 + document_depth(map),
            _ => 0,
        }
    }

    /// Short name of the variant, used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            StashValue::Null => "null",
            StashValue::Bool(_) => "bool",
            StashValue::Number(_) => "number",
            StashValue::Str(_) => "string",
            StashValue::Array(_) => "array",
            StashValue::Object(_) => "object",
        }
    }
}

/// Nesting depth of a document below its root: the number of keys on the
/// longest path, plus the container levels of the value found there.
pub fn document_depth(doc: &Document) -> usize {
    doc.values()
        .map(|v| 1 + v.nesting_depth())
        .max()
        .unwrap_or(0)
}

// ─── Serialize (for cbor4ii::serde::to_writer) ──────────────────────────────

impl Serialize for StashValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StashValue::Null => serializer.serialize_none(),
            StashValue::Bool(b) => serializer.serialize_bool(*b),
            StashValue::Number(n) => match n {
                StashNumber::I64(i) => serializer.serialize_i64(*i),
                StashNumber::U64(u) => serializer.serialize_u64(*u),
                StashNumber::F64(f) => serializer.serialize_f64(*f),
            },
            StashValue::Str(s) => serializer.serialize_str(s.as_str()),
            StashValue::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for v in arr {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            StashValue::Object(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k.as_str(), v)?;
                }
                m.end()
            }
        }
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

impl From<StashNumber> for StashValue {
    fn from(n: StashNumber) -> Self {
        StashValue::Number(n)
    }
}

impl From<f64> for StashValue {
    fn from(n: f64) -> Self {
        StashValue::Number(StashNumber::F64(n))
    }
}

impl From<i64> for StashValue {
    fn from(n: i64) -> Self {
        StashValue::Number(StashNumber::I64(n))
    }
}

impl From<u64> for StashValue {
    fn from(n: u64) -> Self {
        StashValue::Number(StashNumber::U64(n))
    }
}

impl From<bool> for StashValue {
    fn from(b: bool) -> Self {
        StashValue::Bool(b)
    }
}

impl From<&str> for StashValue {
    fn from(s: &str) -> Self {
        StashValue::Str(SmolStr::from(s))
    }
}

impl From<String> for StashValue {
    fn from(s: String) -> Self {
        StashValue::Str(SmolStr::from(s))
    }
}

impl From<Document> for StashValue {
    fn from(doc: Document) -> Self {
        StashValue::Object(doc)
    }
}

// ─── From<cbor4ii::core::Value> ─────────────────────────────────────────────

impl From<cbor4ii::core::Value> for StashValue {
    fn from(v: cbor4ii::core::Value) -> Self {
        use cbor4ii::core::Value;
        match v {
            Value::Null => StashValue::Null,
            Value::Bool(b) => StashValue::Bool(b),
            Value::Integer(i) => {
                if let Ok(val) = i64::try_from(i) {
                    StashValue::Number(StashNumber::I64(val))
                } else if let Ok(val) = u64::try_from(i) {
                    StashValue::Number(StashNumber::U64(val))
                } else {
                    StashValue::Number(StashNumber::F64(i as f64))
                }
            }
            Value::Float(f) => StashValue::Number(StashNumber::F64(f)),
            Value::Text(s) => StashValue::Str(SmolStr::from(s)),
            Value::Array(arr) => StashValue::Array(arr.into_iter().map(StashValue::from).collect()),
            Value::Map(map) => StashValue::Object(
                map.into_iter()
                    .map(|(k, v)| {
                        let key = match k {
                            Value::Text(s) => SmolStr::from(s),
                            Value::Integer(i) => SmolStr::from(i.to_string()),
                            other => SmolStr::from(format!("{:?}", other)),
                        };
                        (key, StashValue::from(v))
                    })
                    .collect(),
            ),
            // StashValue never encodes bytes, so these only come from foreign
            // writers. Kept as an array of octets rather than dropped.
            Value::Bytes(bytes) => StashValue::Array(
                bytes
                    .into_iter()
                    .map(|b| StashValue::Number(StashNumber::U64(u64::from(b))))
                    .collect(),
            ),
            Value::Tag(_, inner) => StashValue::from(*inner),
            // `Value` is non-exhaustive.
            _ => StashValue::Null,
        }
    }
}

// ─── From/Into serde_json::Value ────────────────────────────────────────────

impl From<serde_json::Value> for StashValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => StashValue::Null,
            serde_json::Value::Bool(b) => StashValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    StashValue::Number(StashNumber::I64(i))
                } else if let Some(u) = n.as_u64() {
                    StashValue::Number(StashNumber::U64(u))
                } else {
                    StashValue::Number(StashNumber::F64(n.as_f64().unwrap_or(0.0)))
                }
            }
            serde_json::Value::String(s) => StashValue::Str(SmolStr::from(s)),
            serde_json::Value::Array(arr) => {
                StashValue::Array(arr.into_iter().map(StashValue::from).collect())
            }
            serde_json::Value::Object(obj) => StashValue::Object(
                obj.into_iter()
                    .map(|(k, v)| (SmolStr::from(k), StashValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<StashValue> for serde_json::Value {
    fn from(val: StashValue) -> Self {
        match val {
            StashValue::Null => serde_json::Value::Null,
            StashValue::Bool(b) => serde_json::Value::Bool(b),
            StashValue::Number(n) => match n {
                StashNumber::I64(i) => serde_json::json!(i),
                StashNumber::U64(u) => serde_json::json!(u),
                StashNumber::F64(f) => serde_json::json!(f),
            },
            StashValue::Str(s) => serde_json::Value::String(s.to_string()),
            StashValue::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(|v| v.into()).collect())
            }
            StashValue::Object(obj) => serde_json::Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k.to_string(), v.into()))
                    .collect(),
            ),
        }
    }
}

/// Builds a [`Document`] from a JSON object literal. Non-object input yields
/// an empty document.
pub fn document_from_json(value: serde_json::Value) -> Document {
    match StashValue::from(value) {
        StashValue::Object(doc) => doc,
        _ => Document::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checked_add_stays_integral() {
        let sum = StashNumber::I64(7).checked_add(StashNumber::I64(3));
        assert_eq!(sum, Some(StashNumber::I64(10)));

        let sum = StashNumber::I64(i64::MAX).checked_add(StashNumber::I64(1));
        assert_eq!(sum, Some(StashNumber::U64(i64::MAX as u64 + 1)));

        let sum = StashNumber::U64(u64::MAX).checked_add(StashNumber::I64(1));
        assert_eq!(sum, None);
    }

    #[test]
    fn test_checked_add_float_wins() {
        let sum = StashNumber::I64(1).checked_add(StashNumber::F64(0.5));
        assert_eq!(sum, Some(StashNumber::F64(1.5)));
    }

    #[test]
    fn test_json_conversion_keeps_nesting() {
        let doc = document_from_json(json!({"a": {"b": [1, "x", null]}, "c": 2.5}));
        let a = doc.get("a").and_then(|v| v.get("b")).and_then(StashValue::as_array);
        assert_eq!(a.map(Vec::len), Some(3));
        assert_eq!(doc.get("c").and_then(StashValue::as_f64), Some(2.5));

        let back: serde_json::Value = StashValue::Object(doc).into();
        assert_eq!(back, json!({"a": {"b": [1, "x", null]}, "c": 2.5}));
    }

    #[test]
    fn test_cbor_value_conversion() {
        use cbor4ii::core::Value;
        let cbor = Value::Map(vec![
            (Value::Text("n".into()), Value::Integer(-4)),
            (Value::Text("big".into()), Value::Integer(u64::MAX as i128)),
            (Value::Integer(9), Value::Bool(true)),
        ]);
        let value = StashValue::from(cbor);
        assert_eq!(value.get("n").and_then(StashValue::as_i64), Some(-4));
        assert_eq!(value.get("big").and_then(StashValue::as_u64), Some(u64::MAX));
        assert_eq!(value.get("9").and_then(StashValue::as_bool), Some(true));
    }

    #[test]
    fn test_cbor_null_tag_and_bytes_conversion() {
        use cbor4ii::core::Value;
        let cbor = Value::Map(vec![
            (Value::Text("none".into()), Value::Null),
            (Value::Text("tagged".into()), Value::Tag(1, Box::new(Value::Integer(5)))),
            (Value::Text("raw".into()), Value::Bytes(vec![0, 255])),
        ]);
        let value = StashValue::from(cbor);
        assert_eq!(value.get("none"), Some(&StashValue::Null));
        assert_eq!(value.get("tagged").and_then(StashValue::as_i64), Some(5));
        let raw: serde_json::Value = value.get("raw").cloned().unwrap_or_default().into();
        assert_eq!(raw, json!([0, 255]));
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(StashValue::from(1i64).nesting_depth(), 0);
        assert_eq!(StashValue::from(json!({})).nesting_depth(), 1);
        assert_eq!(StashValue::from(json!([[1], {"a": {"b": 2}}])).nesting_depth(), 3);

        assert_eq!(document_depth(&Document::new()), 0);
        assert_eq!(document_depth(&document_from_json(json!({"a": 1}))), 1);
        assert_eq!(document_depth(&document_from_json(json!({"a": 1, "b": {"c": []}}))), 3);
    }
}
