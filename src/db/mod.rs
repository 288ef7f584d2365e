pub mod backend;
pub mod db;
pub mod memory;
pub mod types;

pub use backend::StashBackend;
pub use db::StashDb;
pub use memory::MemoryDb;
pub use types::{Snapshot, StashDbError, StashKey, VersionToken, WriteOutcome};
