use crate::error::SyncError;

/// Run a blocking store call off the async runtime.
pub(crate) async fn call<F, T>(f: F) -> Result<T, SyncError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}
