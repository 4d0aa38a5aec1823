use serde::{Deserialize, Serialize};

// -- Recipes --

#[derive(Debug, Default, Deserialize)]
pub struct RecentRecipesQuery {
    /// Absent means every recipe.
    pub limit: Option<u32>,
}

// -- Uploads --

#[derive(Debug, Deserialize)]
pub struct SignUploadQuery {
    /// Folder to upload into, normally the uploader's nickname
    pub nick: String,
}

/// Signed parameters a browser needs to upload an image straight to the
/// image host. The host recomputes the signature from the same parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignature {
    pub signature: String,
    pub timestamp: i64,
    pub folder: String,
    #[serde(rename = "use_filename")]
    pub use_filename: bool,
    #[serde(rename = "unique_filename")]
    pub unique_filename: bool,
    pub overwrite: bool,
    pub api_key: String,
    pub cloud_name: String,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
