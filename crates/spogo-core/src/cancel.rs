// ── Cancellation ──
//
// Dropping a future aborts whatever HTTP request, retry sleep or dealer
// read it was waiting on, so racing it against a token is enough.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// Run `fut` until it completes or `token` is cancelled.
pub async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(CoreError::Cancelled),
        result = fut => result,
    }
}
