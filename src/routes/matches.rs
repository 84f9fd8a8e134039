use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::matches;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(matches::get_matches))
        .route("/", post(matches::create_match))
        .route("/:id", get(matches::get_match_by_id))
        .route("/:id", patch(matches::patch_match))
        .route("/:id", delete(matches::delete_match))
        .route("/:id/balls", post(matches::record_ball))
        .route("/:id/advance", post(matches::advance_innings))
        .route("/:id/summary", get(matches::get_match_summary))
}
