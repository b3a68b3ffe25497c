pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::handle_root))
        .route("/health", get(health::health_handler))
        // Generation
        .route("/generate-resume", post(handlers::handle_generate_resume))
        .route("/upload-json", post(handlers::handle_upload_json))
        .route(
            "/generate-from-json",
            post(handlers::handle_generate_from_json),
        )
        // Artifacts and reference data
        .route("/download/:filename", get(handlers::handle_download))
        .route("/template", get(handlers::handle_get_template))
        .route("/sample-data", get(handlers::handle_get_sample_data))
        .route("/cleanup", delete(handlers::handle_cleanup))
        .with_state(state)
}
