pub mod clock;
pub mod orchestrator;

pub use clock::{Clock, FixedClock, SystemClock};
pub use orchestrator::{AssignmentConfig, ReviewAssignmentOrchestrator};
