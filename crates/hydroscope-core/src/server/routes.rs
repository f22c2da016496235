//! Route handlers.

use super::error::ApiError;
use super::upload::MultipartUpload;
use super::AppState;
use crate::analysis::AnalysisReport;
use crate::error::AnalysisError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

pub const WELCOME_MESSAGE: &str = "Welcome to the Water Sample Analysis API. \
     Use the /analyze-image/ endpoint to submit an image.";

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub model_available: bool,
}

/// `GET /`
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.analyzer.model();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        model: model.name().to_string(),
        model_available: model.is_available().await,
    })
}

/// `POST /analyze-image/`
///
/// Analyzes the first `file` field of the form; other fields are ignored.
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| ApiError::BadMultipart(rejection.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AnalysisError::UnreadableUpload {
            message: e.to_string(),
        })?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let report = state.analyzer.analyze(MultipartUpload::new(field)).await?;
        return Ok(Json(report));
    }

    Err(ApiError::MissingFile)
}
