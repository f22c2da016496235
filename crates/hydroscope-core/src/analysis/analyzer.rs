//! The per-request analysis flow: validate, read, call the model, report.

use super::model::{GenerativeModel, ImagePart, MultimodalRequest};
use super::upload::ImageUpload;
use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Required prefix of an acceptable upload content type.
const IMAGE_MEDIA_PREFIX: &str = "image/";

/// The generated report, returned to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report: String,
}

/// Check the declared content type of an upload.
///
/// Returns the content type when it names an image media type.
pub fn validate_content_type(content_type: Option<&str>) -> AnalysisResult<&str> {
    match content_type {
        Some(ct) if ct.starts_with(IMAGE_MEDIA_PREFIX) => Ok(ct),
        _ => Err(AnalysisError::InvalidContentType),
    }
}

/// Runs uploads through a generative model.
///
/// Holds no per-request state; one instance serves every request
/// concurrently.
#[derive(Clone)]
pub struct Analyzer {
    model: Arc<dyn GenerativeModel>,
}

impl Analyzer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &dyn GenerativeModel {
        self.model.as_ref()
    }

    /// Analyze one uploaded image.
    ///
    /// The content type is checked before the body is read, and nothing is
    /// sent to the model unless both succeed. The model is called exactly
    /// once; failures are returned immediately without retrying.
    pub async fn analyze<U: ImageUpload>(&self, mut upload: U) -> AnalysisResult<AnalysisReport> {
        let content_type = validate_content_type(upload.content_type())?.to_string();

        let data = upload
            .read_all()
            .await
            .map_err(|e| AnalysisError::UnreadableUpload {
                message: e.to_string(),
            })?;

        tracing::debug!(
            content_type = %content_type,
            bytes = data.len(),
            provider = self.model.name(),
            "Analyzing sample image"
        );

        let request = MultimodalRequest::analyze_sample(ImagePart::new(data, content_type));
        match self.model.generate(&request).await {
            Ok(response) => {
                tracing::info!(
                    model = %response.model,
                    latency_ms = response.latency_ms,
                    tokens_used = response.tokens_used,
                    "Sample analysis complete"
                );
                Ok(AnalysisReport {
                    report: response.text,
                })
            }
            Err(e) => {
                tracing::error!(provider = self.model.name(), "Sample analysis failed: {e}");
                Err(e)
            }
        }
    }
}
