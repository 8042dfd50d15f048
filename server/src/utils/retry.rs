//! Bounded retry for transient store failures
//!
//! Business-rule errors (not found, duplicates, validation) are never
//! retried; only errors the store itself reports. Backoff doubles per
//! attempt and the caller gets `ServiceUnavailable` once the budget is
//! exhausted.

use std::future::Future;
use std::time::Duration;

use crate::db::repository::{RepoError, RepoResult};
use crate::utils::{AppError, AppResult};

/// Maximum attempts per operation (initial call + retries)
pub const MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay, doubled per attempt
pub const BASE_DELAY_MS: u64 = 100;

/// Run a repository operation, retrying transient failures with backoff.
pub async fn retry_transient<T, F, Fut>(op: &str, mut f: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RepoResult<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(RepoError::Database(msg)) => {
                attempt += 1;
                if attempt >= MAX_ATTEMPTS {
                    tracing::error!(
                        op = op,
                        attempts = attempt,
                        error = %msg,
                        "Store unavailable, retries exhausted"
                    );
                    return Err(AppError::service_unavailable(format!(
                        "{op} failed after {MAX_ATTEMPTS} attempts"
                    )));
                }
                let delay = BASE_DELAY_MS * (1u64 << (attempt - 1));
                tracing::warn!(
                    op = op,
                    attempt = attempt,
                    delay_ms = delay,
                    error = %msg,
                    "Transient store error, retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
