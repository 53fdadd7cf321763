//! Deadline enforcement for collaborator calls.
//!
//! # Responsibilities
//! - Bound calls into the provisioning device by a caller-supplied deadline
//! - Report an elapsed deadline as its own error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - No deadline means the call runs to completion

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped call did not finish before its deadline.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("deadline of {0:?} elapsed")]
pub struct DeadlineElapsed(pub Duration);

/// Run `fut`, giving up once `deadline` has passed.
pub async fn with_deadline<F>(deadline: Option<Duration>, fut: F) -> Result<F::Output, DeadlineElapsed>
where
    F: Future,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DeadlineElapsed(limit)),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let out = with_deadline(Some(Duration::from_secs(1)), async { 7 }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn test_elapsed() {
        let limit = Duration::from_millis(10);
        let out = with_deadline(Some(limit), tokio::time::sleep(Duration::from_millis(500))).await;
        assert_eq!(out, Err(DeadlineElapsed(limit)));
    }

    #[tokio::test]
    async fn test_no_deadline() {
        let out = with_deadline(None, async { "done" }).await;
        assert_eq!(out, Ok("done"));
    }
}
