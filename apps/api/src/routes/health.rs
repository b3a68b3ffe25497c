use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus a few cheap environment checks.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let output_dir_exists = tokio::fs::metadata(&state.output_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    let sample_data_exists = tokio::fs::metadata(&state.config.sample_data_path)
        .await
        .is_ok();

    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "resume-builder-api",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": {
            "output_dir_exists": output_dir_exists,
            "template_source": state
                .config
                .template_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "embedded".to_string()),
            "sample_data_exists": sample_data_exists,
            "engine": state.engine.name()
        }
    }))
}
