use crate::error::StashError;
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;

pub const PATH_SEPARATOR: char = '/';

/// Deepest nesting a stored document may reach below its root, counted in
/// keys plus container levels. cbor4ii's decoder refuses values nested
/// much deeper, so nothing past this is ever written.
pub const MAX_DEPTH: usize = 64;

/// A parsed, slash-delimited key. Never empty; no segment is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StashPath {
    segments: Vec<SmolStr>,
}

impl StashPath {
    /// Whitespace around the whole key is trimmed; segments are kept verbatim.
    /// `""`, `"a//b"`, `"/a"` and `"a/"` are all rejected, as is a key with
    /// more than [`MAX_DEPTH`] segments.
    pub fn parse(raw: &str) -> Result<Self, StashError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StashError::InvalidPath(raw.to_string()));
        }
        let segments = trimmed
            .split(PATH_SEPARATOR)
            .map(|segment| {
                if segment.is_empty() {
                    Err(StashError::InvalidPath(raw.to_string()))
                } else {
                    Ok(SmolStr::new(segment))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        if segments.len() > MAX_DEPTH {
            return Err(StashError::InvalidPath(raw.to_string()));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a parsed path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Intermediate segments and the final key.
    pub fn split_last(&self) -> (&[SmolStr], &SmolStr) {
        let n = self.segments.len();
        (&self.segments[..n - 1], &self.segments[n - 1])
    }

    /// The path up to and including segment `depth` (0-based), for error messages.
    pub(crate) fn prefix(&self, depth: usize) -> String {
        self.segments[..=depth.min(self.segments.len() - 1)].join("/")
    }
}

impl FromStr for StashPath {
    type Err = StashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StashPath::parse(s)
    }
}

impl TryFrom<&str> for StashPath {
    type Error = StashError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        StashPath::parse(s)
    }
}

impl fmt::Display for StashPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
