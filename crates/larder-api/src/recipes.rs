use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::warn;

use larder_db::models::RecipeRow;
use larder_types::api::RecentRecipesQuery;
use larder_types::models::Recipe;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn recent_recipes(
    State(state): State<AppState>,
    Query(query): Query<RecentRecipesQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let db = state.db();
    let rows = tokio::task::spawn_blocking(move || db.recent_recipes(query.limit)).await??;
    Ok(Json(rows.into_iter().map(to_recipe).collect()))
}

pub async fn recipes_by_nickname(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let db = state.db();
    let rows = tokio::task::spawn_blocking(move || db.recipes_by_op(&nickname)).await??;
    Ok(Json(rows.into_iter().map(to_recipe).collect()))
}

fn to_recipe(row: RecipeRow) -> Recipe {
    let image_urls = serde_json::from_str(&row.image_urls).unwrap_or_else(|e| {
        warn!("Corrupt image_urls on recipe {}: {}", row.id, e);
        Vec::new()
    });

    Recipe {
        id: row.id,
        op: row.op,
        title: row.title,
        instructions: row.instructions,
        image_urls,
        time: row.time,
    }
}
