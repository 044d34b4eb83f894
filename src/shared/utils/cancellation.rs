use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::shared::errors::{AppError, AppResult};

/// Race `future` against the caller's cancellation token.
pub async fn run_cancellable<F, T>(cancel: &CancellationToken, future: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        result = future => result,
    }
}

/// Like [`run_cancellable`] with an upper bound on how long the call may take.
pub async fn run_with_deadline<F, T>(
    cancel: &CancellationToken,
    deadline: Duration,
    label: &str,
    future: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    run_cancellable(cancel, async {
        match tokio::time::timeout(deadline, future).await {
            Ok(result) => result,
            Err(_) => Err(AppError::TransientNetwork(format!(
                "{} timed out after {:?}",
                label, deadline
            ))),
        }
    })
    .await
}

/// Short-circuit a fallback loop once the caller has given up.
pub fn ensure_active(cancel: &CancellationToken) -> AppResult<()> {
    if cancel.is_cancelled() {
        Err(AppError::Cancelled)
    } else {
        Ok(())
    }
}
