pub mod auth;
pub mod campaigns;
pub mod donations;
pub mod donors;
pub mod error;
pub mod influencers;
pub mod middleware;
pub mod policy;
pub mod router;
pub mod stats;
mod time;

use tracing::error;

use crate::error::ApiError;

/// Runs blocking database or password-hashing work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("blocking task failed to join: {}", e);
        ApiError::from(anyhow::anyhow!("background task failed"))
    })?
}
