use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error};
use uuid::Uuid;

use larder_db::Database;
use larder_types::events::{ClientCommand, ServerEvent};

use crate::dispatcher::Dispatcher;
use crate::outcome::Outcome;

/// Entry point for everything a connection can ask of the board.
#[derive(Clone)]
pub struct Gateway {
    pub(crate) db: Arc<Database>,
    pub(crate) dispatcher: Dispatcher,
}

impl Gateway {
    pub fn new(db: Arc<Database>, dispatcher: Dispatcher) -> Self {
        Self { db, dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    /// Register a connection and ask it to load the current users and recipes.
    pub async fn connect(&self) -> (Uuid, mpsc::UnboundedReceiver<ServerEvent>) {
        let (conn_id, rx) = self.dispatcher.register().await;
        self.dispatcher
            .send_to(conn_id, ServerEvent::RequestRefreshPresence)
            .await;
        self.dispatcher
            .send_to(conn_id, ServerEvent::RequestRefreshRecipes)
            .await;
        debug!("connection {} registered", conn_id);
        (conn_id, rx)
    }

    /// Handle one command without delivering anything.
    pub async fn handle(&self, conn_id: Uuid, cmd: ClientCommand) -> Outcome {
        let operation = cmd.name();

        let result = match cmd {
            ClientCommand::Authenticate(credentials) => {
                self.authenticate(conn_id, credentials).await
            }
            ClientCommand::UpdatePassword(change) => self.update_password(conn_id, change).await,
            ClientCommand::DeleteAccount { nickname } => {
                self.delete_account(conn_id, nickname).await
            }
            ClientCommand::CreateRecipe(recipe) => self.create_recipe(recipe).await,
            ClientCommand::UpdateRecipe(edit) => self.update_recipe(edit).await,
            ClientCommand::DeleteRecipe { title } => self.delete_recipe(conn_id, title).await,
        };

        result.unwrap_or_else(|error| {
            error!("connection {}: {} failed: {}", conn_id, operation, error);
            Outcome::Failed { operation, error }
        })
    }

    /// Handle one command and deliver its outcome.
    pub async fn dispatch(&self, conn_id: Uuid, cmd: ClientCommand) {
        let outcome = self.handle(conn_id, cmd).await;
        self.dispatcher
            .deliver(conn_id, outcome.into_deliveries())
            .await;
    }

    /// The connection is gone: drop its session and, if it was signed in,
    /// mark the user offline and tell everyone left.
    pub async fn disconnect(&self, conn_id: Uuid) {
        let Some(session) = self.dispatcher.unregister(conn_id).await else {
            return;
        };

        let outcome = self
            .sign_out(session)
            .await
            .unwrap_or_else(|error| {
                error!("connection {}: disconnect failed: {}", conn_id, error);
                Outcome::Failed {
                    operation: "disconnect",
                    error,
                }
            });

        // conn_id is no longer registered, so caller-bound events vanish
        self.dispatcher
            .deliver(conn_id, outcome.into_deliveries())
            .await;
    }
}
