pub mod db;
pub mod error;
pub mod path_codec;
pub mod serialization;
pub mod stash;
pub mod stash_value;

pub use db::{MemoryDb, StashBackend, StashDb, StashDbError, StashKey, VersionToken};
pub use error::StashError;
pub use path_codec::StashPath;
pub use stash::{RetryConfig, StashColumn, StashController};
pub use stash_value::{Document, StashNumber, StashValue};
