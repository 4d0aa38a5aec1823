use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use larder_types::api::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("store failure: {0:#}")]
    Store(anyhow::Error),

    #[error("store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Uploads are not configured")]
    UploadsDisabled,
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Store(_) | Self::Worker(_) => {
                error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong".to_string())
            }
            Self::UploadsDisabled => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
