//! Signed upload parameters for the external image host. The board never
//! sees the images; browsers upload directly with this signature.

use axum::{
    Json,
    extract::{Query, State},
};
use sha1::{Digest, Sha1};
use tracing::debug;

use larder_types::api::{SignUploadQuery, UploadSignature};

use crate::error::ApiError;
use crate::state::AppState;

/// Upload source tag the image host expects from browser widgets.
const UPLOAD_SOURCE: &str = "uw";

#[derive(Debug, Clone)]
pub struct UploadSigner {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl UploadSigner {
    pub fn sign(&self, folder: &str, timestamp: i64) -> UploadSignature {
        let (use_filename, unique_filename, overwrite) = (true, false, true);

        // alphabetical order, as the host recomputes it
        let params = format!(
            "folder={}&overwrite={}&source={}&timestamp={}&unique_filename={}&use_filename={}",
            folder, overwrite, UPLOAD_SOURCE, timestamp, unique_filename, use_filename
        );

        let mut hasher = Sha1::new();
        hasher.update(params.as_bytes());
        hasher.update(self.api_secret.as_bytes());

        UploadSignature {
            signature: hex::encode(hasher.finalize()),
            timestamp,
            folder: folder.to_string(),
            use_filename,
            unique_filename,
            overwrite,
            api_key: self.api_key.clone(),
            cloud_name: self.cloud_name.clone(),
        }
    }
}

pub async fn sign_upload(
    State(state): State<AppState>,
    Query(query): Query<SignUploadQuery>,
) -> Result<Json<UploadSignature>, ApiError> {
    let signer = state.uploads.as_ref().ok_or(ApiError::UploadsDisabled)?;
    debug!("signing upload into folder {}", query.nick);
    Ok(Json(signer.sign(&query.nick, chrono::Utc::now().timestamp())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_covers_sorted_params_and_secret() {
        let signer = UploadSigner {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "s3cret".into(),
        };

        let signed = signer.sign("chef99", 1_700_000_000);
        assert_eq!(signed.signature, "b4b5351d6774de7fe57102ea0753d84fc6c77f0a");
        assert_eq!(signed.folder, "chef99");
        assert_eq!(signed.api_key, "key");
        assert_eq!(signed.cloud_name, "demo");
    }
}
