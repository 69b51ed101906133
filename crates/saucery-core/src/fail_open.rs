//! Fail-open utilities for best-effort reporting
//!
//! Reporting results to Sauce Labs must never fail the test run that produced
//! them. Operations wrapped here log their error and yield `None`.
//!
//! DO NOT use fail-open for:
//! - Configuration loading (a bad config should stop the run early)
//! - Lifecycle log parsing (the caller asked for exactly those events)

use std::future::Future;
use tracing::error;

use crate::{error_chain, Result};

/// Execute an operation that should fail open
///
/// Logs the error and its cause chain via `tracing::error!` on failure and
/// returns `None`. There is no retry: the operation runs at most once.
///
/// # Usage
///
/// ```no_run
/// use saucery_core::fail_open::fail_open;
/// use saucery_core::Result;
///
/// async fn update_job() -> Result<u16> {
///     Ok(200)
/// }
///
/// async fn example() {
///     let status = fail_open("sauce_job_update", || update_job()).await;
///     // status is None if update_job() failed
/// }
/// ```
pub async fn fail_open<F, Fut, T>(operation_name: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match f().await {
        Ok(val) => Some(val),
        Err(e) => {
            error!("{} failed (fail-open): {}", operation_name, error_chain(&e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SauceError;

    #[tokio::test]
    async fn test_fail_open_success() {
        let result = fail_open("test_op", || async { Ok::<_, SauceError>(42) }).await;
        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn test_fail_open_failure() {
        let result = fail_open("test_op", || async {
            Err::<i32, _>(SauceError::Config("connection reset".to_string()))
        })
        .await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_fail_open_runs_once() {
        let mut attempts = 0;
        let result = fail_open("test_op", || {
            attempts += 1;
            async { Err::<i32, _>(SauceError::Config("boom".to_string())) }
        })
        .await;
        assert_eq!(result, None);
        assert_eq!(attempts, 1);
    }
}
