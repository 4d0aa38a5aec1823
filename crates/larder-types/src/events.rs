use serde::{Deserialize, Serialize};

use crate::models::MatchKey;

/// Events sent FROM server TO client over the WebSocket gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Authentication succeeded; the connection now owns `nickname`
    LoggedIn { nickname: String },

    /// Wrong password for an existing nickname, or the nickname was taken
    /// by a concurrent signup
    IncorrectLogin,

    /// `update-password` supplied the wrong current password
    IncorrectCurrentPassword,

    /// Password change stored
    PasswordUpdated,

    /// Someone came online, went offline or left; reload the user list
    RequestRefreshPresence,

    /// The shared recipe list changed; reload it
    RequestRefreshRecipes,

    /// The caller's own recipes changed; reload them
    RequestRefreshMyRecipes,

    CreateSucceeded,
    UpdateSucceeded,
    DeleteSucceeded,

    /// Human-readable status line sent to every connection
    Announcement { text: String },

    /// The account behind this connection is gone; drop all client state
    ResetClient,

    /// The store failed while handling `operation`; nothing was changed
    OperationFailed { operation: String },
}

/// Commands sent FROM client TO server over the WebSocket gateway.
///
/// Closing the socket is the implicit `disconnect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ClientCommand {
    /// Sign in, or sign up when the nickname is unknown
    Authenticate(Credentials),

    CreateRecipe(NewRecipe),

    UpdateRecipe(RecipeEdit),

    /// Removes every recipe carrying this exact title
    DeleteRecipe { title: String },

    UpdatePassword(PasswordChange),

    DeleteAccount { nickname: String },
}

impl ClientCommand {
    /// Stable name used in logs and in `operation-failed` notices.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticate(_) => "authenticate",
            Self::CreateRecipe(_) => "create-recipe",
            Self::UpdateRecipe(_) => "update-recipe",
            Self::DeleteRecipe { .. } => "delete-recipe",
            Self::UpdatePassword(_) => "update-password",
            Self::DeleteAccount { .. } => "delete-account",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub nickname: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    #[serde(rename = "OP")]
    pub op: String,
    pub title: String,
    pub instructions: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeEdit {
    pub title: String,
    pub instructions: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub match_key: MatchKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub nickname: String,
    pub current_password: String,
    pub new_password: String,
}
