pub mod column;
pub mod controller;
pub mod retry;

pub use column::StashColumn;
pub use controller::StashController;
pub use retry::RetryConfig;
