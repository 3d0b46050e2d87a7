pub mod api;
pub mod assignment;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use assignment::ReviewAssignmentOrchestrator;
pub use error::{ReviewError, ReviewResult};
pub use store::MemoryStore;
