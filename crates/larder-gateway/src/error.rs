use thiserror::Error;

/// A store round trip that did not complete. Always reported to the
/// originating connection only, as `operation-failed`.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("store failure: {0:#}")]
    Store(anyhow::Error),

    #[error("store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<anyhow::Error> for SyncError {
    fn from(e: anyhow::Error) -> Self {
        Self::Store(e)
    }
}
