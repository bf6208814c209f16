//! Services behind the HTTP routes.

pub mod engine;
pub mod locks;
pub mod retry;
pub mod store;

pub use engine::{PracticeSnapshot, ProgressEngine, QueueFilter};
pub use retry::RetryPolicy;
pub use store::ProgressStore;
