//! Batch generation handlers.

use axum::{
    Json,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    archive::ARCHIVE_NAME,
    batch::Entry,
    error::BatchError,
    intake,
};

use super::super::state::AppState;

/// Request body for POST /api/generate.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub entries: Vec<Entry>,
}

/// POST /generate - multipart form with repeated `name[]` and `link[]` fields.
pub async fn form(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut names = Vec::new();
    let mut links = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &format!("Multipart error: {}", e)),
        };

        let name = field.name().unwrap_or("").to_string();
        let value = match field.text().await {
            Ok(value) => value,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, &format!("Failed to read field: {}", e));
            }
        };

        match name.as_str() {
            "name[]" => names.push(value),
            "link[]" => links.push(value),
            _ => {}
        }
    }

    let entries = match intake::entries_from_columns(names, links) {
        Ok(entries) => entries,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    generate(&state, entries).await
}

/// POST /api/generate - JSON body `{"entries": [{"label", "target"}]}`.
pub async fn json(State(state): State<Arc<AppState>>, Json(req): Json<GenerateRequest>) -> Response {
    if req.entries.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No entries provided");
    }
    generate(&state, req.entries).await
}

/// Run the batch off the async runtime and answer with the archive.
async fn generate(state: &AppState, entries: Vec<Entry>) -> Response {
    let pipeline = state.pipeline.clone();
    let count = entries.len();
    let result = tokio::task::spawn_blocking(move || pipeline.run(&entries)).await;

    match result {
        Ok(Ok(bundle)) => {
            tracing::info!(
                entries = count,
                images = bundle.images.len(),
                skipped = bundle.skipped.len(),
                "generated archive"
            );
            zip_response(bundle.archive)
        }
        Ok(Err(BatchError::NoValidEntries)) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "No valid entries: every link was rejected or could not be encoded",
        ),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("Error: {}", e)),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("Task error: {}", e)),
    }
}

fn zip_response(archive: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ARCHIVE_NAME),
            ),
        ],
        archive,
    )
        .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    tracing::warn!(status = status.as_u16(), error = message, "generate request failed");
    (status, message.to_string()).into_response()
}
