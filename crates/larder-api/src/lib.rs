//! HTTP surface of the board: read-only queries, upload signing, static
//! assets and the WebSocket upgrade into the gateway.

pub mod error;
pub mod recipes;
pub mod state;
pub mod uploads;
pub mod users;

use std::path::Path;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use larder_gateway::connection;

use crate::state::AppState;

pub fn router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/all-users", get(users::all_users))
        .route("/recent-recipes", get(recipes::recent_recipes))
        .route("/users/{nickname}/recipes", get(recipes::recipes_by_nickname))
        .route("/api/sign-upload", get(uploads::sign_upload))
        .route("/gateway", get(ws_upgrade))
        .with_state(state)
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let gateway = state.gateway.clone();
    ws.on_upgrade(move |socket| connection::handle_connection(socket, gateway))
}
