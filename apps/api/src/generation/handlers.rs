//! Axum route handlers for the resume generation API.

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::files::{self, ArtifactKind};
use crate::models::resume::ResumeRecord;
use crate::render::{generate, RenderError};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerateResumeResponse {
    pub message: String,
    pub filename: String,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub template: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SampleDataResponse {
    pub sample_data: Value,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub message: String,
    pub status: String,
    pub files_removed: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_root() -> Json<Value> {
    Json(json!({
        "message": "JSON to PDF Resume Builder API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health_check": "GET /health",
            "generate_resume": "POST /generate-resume",
            "upload_json": "POST /upload-json",
            "generate_from_json": "POST /generate-from-json",
            "download_file": "GET /download/{filename}",
            "get_template": "GET /template",
            "get_sample_data": "GET /sample-data",
            "cleanup_temp": "DELETE /cleanup"
        }
    }))
}

/// POST /generate-resume
///
/// The body is parsed here rather than through `Json<ResumeRecord>` so schema
/// violations come back as `DATA_ERROR` like every other input path.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResumeResponse>, AppError> {
    let record = ResumeRecord::from_json_slice(&body)?;
    let response = generate_for(&state, &record, "Resume generated successfully").await?;
    Ok(Json(response))
}

/// POST /upload-json
///
/// Multipart form with a `file` field holding a `.json` resume.
pub async fn handle_upload_json(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GenerateResumeResponse>, AppError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    if !filename.to_ascii_lowercase().ends_with(".json") {
        return Err(AppError::Validation(
            "File must be a JSON file (.json)".to_string(),
        ));
    }

    info!(filename = %filename, size = data.len(), "Received resume upload");

    let record = ResumeRecord::from_json_slice(&data)?;
    let response = generate_for(
        &state,
        &record,
        "Resume generated successfully from uploaded JSON",
    )
    .await?;
    Ok(Json(response))
}

/// POST /generate-from-json
///
/// Renders the sample data file configured on the server.
pub async fn handle_generate_from_json(
    State(state): State<AppState>,
) -> Result<Json<GenerateResumeResponse>, AppError> {
    let data = read_sample_data(&state).await?;
    let record = ResumeRecord::from_json_slice(&data)?;
    let response = generate_for(
        &state,
        &record,
        "Resume generated successfully from existing resume.json",
    )
    .await?;
    Ok(Json(response))
}

/// GET /download/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let kind = ArtifactKind::from_filename(&filename)
        .ok_or_else(|| AppError::Validation(format!("Invalid file name '{filename}'")))?;

    let path = state.output_dir.join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, kind.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// GET /template
pub async fn handle_get_template(State(state): State<AppState>) -> Json<TemplateResponse> {
    Json(TemplateResponse {
        template: state.template.source().to_string(),
        message: "LaTeX template content".to_string(),
    })
}

/// GET /sample-data
pub async fn handle_get_sample_data(
    State(state): State<AppState>,
) -> Result<Json<SampleDataResponse>, AppError> {
    let data = read_sample_data(&state).await?;
    let sample_data: Value = serde_json::from_slice(&data)
        .map_err(|e| RenderError::Data(format!("Sample data is not valid JSON: {e}")))?;
    Ok(Json(SampleDataResponse {
        sample_data,
        message: "Sample resume data structure".to_string(),
    }))
}

/// DELETE /cleanup
pub async fn handle_cleanup(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, AppError> {
    let files_removed = files::remove_generated(&state.output_dir).await?;
    Ok(Json(CleanupResponse {
        message: format!("Cleaned up {files_removed} temporary and auxiliary files"),
        status: "success".to_string(),
        files_removed,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Generates under a fresh unique stem so concurrent requests never collide.
async fn generate_for(
    state: &AppState,
    record: &ResumeRecord,
    message: &str,
) -> Result<GenerateResumeResponse, AppError> {
    let stem = Uuid::new_v4().to_string();
    let generated = generate(
        record,
        &state.template,
        state.engine.as_ref(),
        &state.output_dir,
        &stem,
    )
    .await?;

    let filename = generated.pdf_filename();
    Ok(GenerateResumeResponse {
        message: message.to_string(),
        download_url: format!("/download/{filename}"),
        filename,
    })
}

async fn read_sample_data(state: &AppState) -> Result<Vec<u8>, AppError> {
    let path = &state.config.sample_data_path;
    match tokio::fs::read(path).await {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(format!(
            "{} not found. Please ensure the resume data file exists.",
            path.display()
        ))),
        Err(e) => Err(e.into()),
    }
}
