//! Resilience utilities.
//!
//! # Design Decisions
//! - No retries inside the dispatcher; retry policy belongs to callers
//! - Calls that can block (pipeline provisioning) are deadline-bounded

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineElapsed};
