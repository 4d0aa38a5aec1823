use serde::{Deserialize, Serialize};

/// A user as the board shows it: name and presence, never the password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPresence {
    pub name: String,
    pub is_online: bool,
}

/// A shared recipe.
///
/// `op` is the author's nickname at the time of posting. It is a plain string,
/// not a reference: it is blanked when the author deletes their account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    #[serde(rename = "OP")]
    pub op: String,
    pub title: String,
    pub instructions: String,
    pub image_urls: Vec<String>,
    /// Server-assigned creation time, `YYYY-MM-DD HH:MM:SS` UTC.
    pub time: String,
}

/// The prior version of a recipe as the client last saw it.
///
/// Recipes are addressed by value, not by id: every row equal on all four
/// fields is affected by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchKey {
    #[serde(rename = "OP")]
    pub op: String,
    pub title: String,
    pub instructions: String,
    pub time: String,
}
