use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

pub fn token_prefix(t: &str) -> &str {
    &t[..t.len().min(12)]
}

/// Run a store call under a deadline. An elapsed deadline drops the future.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(deadline_ms = deadline.as_millis() as u64, "db: deadline exceeded");
            Err(AppError::StoreTimeout)
        }
    }
}

/// Run CPU-heavy credential work (Argon2) on the blocking pool.
pub async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::CredentialHashing(format!("credential task failed: {e}")))
}
