//! Generative model trait and multimodal request/response types.

use super::prompt::ANALYSIS_PROMPT;
use crate::error::{AnalysisError, AnalysisResult};
use async_trait::async_trait;
use base64::Engine;

/// Raw image bytes tagged with their declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    /// Image bytes exactly as uploaded
    pub data: Vec<u8>,
    /// MIME type as declared by the uploader (e.g., "image/jpeg")
    pub mime_type: String,
}

impl ImagePart {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Base64 encoding of the bytes, as inline JSON APIs expect.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// A single inference request combining an image and a text prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct MultimodalRequest {
    /// The image to analyze
    pub image: ImagePart,
    /// Text instruction for the model
    pub prompt: String,
}

impl MultimodalRequest {
    /// Build the water sample analysis request for an image.
    pub fn analyze_sample(image: ImagePart) -> Self {
        Self {
            image,
            prompt: ANALYSIS_PROMPT.to_string(),
        }
    }
}

/// The response from a model call.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    /// Generated text, unmodified
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// A hosted model that turns a multimodal request into text.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the router holds an `Arc<dyn GenerativeModel>`).
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Provider name for logging (e.g., "vertex-ai").
    fn name(&self) -> &str;

    /// Whether the client was configured successfully.
    async fn is_available(&self) -> bool;

    /// Run one inference call.
    async fn generate(&self, request: &MultimodalRequest) -> AnalysisResult<ModelResponse>;
}

/// Stand-in for a client that failed to initialize at startup.
///
/// Every call fails with the initialization error, so the failure reaches
/// callers as a per-request model error.
#[derive(Debug, Clone)]
pub struct UnavailableModel {
    name: String,
    reason: String,
}

impl UnavailableModel {
    pub fn new(name: &str, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl GenerativeModel for UnavailableModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        false
    }

    async fn generate(&self, _request: &MultimodalRequest) -> AnalysisResult<ModelResponse> {
        Err(AnalysisError::model(format!(
            "Vertex AI client is not initialized: {}",
            self.reason
        )))
    }
}
