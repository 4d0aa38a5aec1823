//! Create, update and delete of shared recipes.
//!
//! There is no locking across connections: two connections editing the same
//! recipe both reach the store and the last statement wins.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use larder_types::events::{NewRecipe, RecipeEdit, ServerEvent};

use crate::error::SyncError;
use crate::handler::Gateway;
use crate::outcome::{Delivery, Outcome};
use crate::store;

/// Creation time as stored, second precision, UTC.
pub(crate) fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl Gateway {
    pub(crate) async fn create_recipe(&self, recipe: NewRecipe) -> Result<Outcome, SyncError> {
        let db = self.db.clone();
        let NewRecipe {
            op,
            title,
            instructions,
            image_urls,
        } = recipe;

        let (op_db, title_db) = (op.clone(), title.clone());
        store::call(move || {
            let image_urls = serde_json::to_string(&image_urls)?;
            db.insert_recipe(&op_db, &title_db, &instructions, &image_urls, &timestamp())
        })
        .await?;

        info!("{} shared recipe: {}", op, title);
        Ok(Outcome::Applied(vec![
            Delivery::Caller(ServerEvent::RequestRefreshMyRecipes),
            Delivery::Caller(ServerEvent::CreateSucceeded),
            Delivery::Others(ServerEvent::RequestRefreshRecipes),
            Delivery::announcement(format!("{} shared recipe: {}", op, title)),
        ]))
    }

    /// Rewrite every recipe equal to the match key. A stale key matches
    /// nothing and still reports success.
    pub(crate) async fn update_recipe(&self, edit: RecipeEdit) -> Result<Outcome, SyncError> {
        let db = self.db.clone();
        let RecipeEdit {
            title,
            instructions,
            image_urls,
            match_key,
        } = edit;

        let (key, new_title) = (match_key.clone(), title.clone());
        let touched = store::call(move || {
            let image_urls = serde_json::to_string(&image_urls)?;
            db.update_recipes(
                &key.op,
                &key.title,
                &key.instructions,
                &key.time,
                &new_title,
                &instructions,
                &image_urls,
            )
        })
        .await?;

        match touched {
            0 => warn!(
                "update of {:?} by {} matched no recipe",
                match_key.title, match_key.op
            ),
            1 => {}
            n => warn!(
                "update of {:?} by {} matched {} recipes",
                match_key.title, match_key.op, n
            ),
        }

        info!("{} updated recipe: {}", match_key.op, title);
        Ok(Outcome::Applied(vec![
            Delivery::Caller(ServerEvent::RequestRefreshMyRecipes),
            Delivery::Caller(ServerEvent::UpdateSucceeded),
            Delivery::Others(ServerEvent::RequestRefreshRecipes),
            Delivery::announcement(format!("{} updated recipe: {}", match_key.op, title)),
        ]))
    }

    /// Delete every recipe titled `title`, whoever posted it.
    pub(crate) async fn delete_recipe(
        &self,
        conn_id: Uuid,
        title: String,
    ) -> Result<Outcome, SyncError> {
        let db = self.db.clone();
        let target = title.clone();
        let removed = store::call(move || db.delete_recipes_by_title(&target)).await?;

        let text = match self.dispatcher.session(conn_id).await.nickname() {
            Some(nickname) => format!("{} deleted recipe: {}", nickname, title),
            None => format!("Recipe deleted: {}", title),
        };
        info!("{} ({} rows)", text, removed);

        Ok(Outcome::Applied(vec![
            Delivery::Caller(ServerEvent::RequestRefreshMyRecipes),
            Delivery::Caller(ServerEvent::DeleteSucceeded),
            Delivery::Others(ServerEvent::RequestRefreshRecipes),
            Delivery::announcement(text),
        ]))
    }
}
