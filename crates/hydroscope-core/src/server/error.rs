//! HTTP error responses.
//!
//! Every error body is `{"detail": "<message>"}`.

use crate::error::{AnalysisError, ErrorKind};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// The analysis itself failed
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The form carried no `file` field
    #[error("Missing required form field 'file'.")]
    MissingFile,

    /// The request body is not a multipart form
    #[error("{0}")]
    BadMultipart(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Analysis(e) => match e.kind() {
                ErrorKind::ClientInput => StatusCode::BAD_REQUEST,
                ErrorKind::ExternalService => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::MissingFile => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadMultipart(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Internal service error: {}", self);
        } else {
            match &self {
                ApiError::Analysis(AnalysisError::UnreadableUpload { message }) => {
                    tracing::debug!("Client error: {} ({message})", self);
                }
                _ => tracing::debug!("Client error: {}", self),
            }
        }

        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
