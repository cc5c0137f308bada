//! Deadlines for user directory calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::AuthError;
use super::ports::UserDirectoryError;

/// Await a directory call for at most `timeout`.
///
/// The outer error is the elapsed deadline; the inner result is left to the
/// caller so it can decide which directory failures to erase.
pub(crate) async fn within<T, Fut>(
    timeout: Duration,
    operation: &'static str,
    call: Fut,
) -> Result<Result<T, UserDirectoryError>, AuthError>
where
    Fut: Future<Output = Result<T, UserDirectoryError>>,
{
    tokio::time::timeout(timeout, call).await.map_err(|_| {
        warn!(operation, timeout_ms = timeout.as_millis(), "user directory call timed out");
        AuthError::directory_timeout(timeout)
    })
}
