use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::sessions;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sessions::get_sessions))
        .route("/", post(sessions::create_session))
        .route("/:id", get(sessions::get_session_by_id))
        .route("/:id", patch(sessions::patch_session))
        .route("/:id/setup-match", post(sessions::setup_match))
}
