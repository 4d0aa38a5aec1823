use axum::{Json, extract::State};

use larder_types::models::UserPresence;

use crate::error::ApiError;
use crate::state::AppState;

/// Every user with presence, online first.
pub async fn all_users(State(state): State<AppState>) -> Result<Json<Vec<UserPresence>>, ApiError> {
    let db = state.db();
    let rows = tokio::task::spawn_blocking(move || db.list_presence()).await??;

    Ok(Json(
        rows.into_iter()
            .map(|row| UserPresence {
                name: row.name,
                is_online: row.is_online,
            })
            .collect(),
    ))
}
