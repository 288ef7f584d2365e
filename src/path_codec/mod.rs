//! Pure nested-document addressing. No I/O, no persistence awareness.
mod path;
mod read_op;
mod write_op;

pub use path::{MAX_DEPTH, PATH_SEPARATOR, StashPath};
pub use read_op::{contains, get};
pub use write_op::{delete, set};

#[cfg(test)]
mod tests;
