//! Water sample image analysis.
//!
//! Validates an uploaded image, packages it with the fixed laboratory prompt
//! into a multimodal request, and hands it to a [`GenerativeModel`]. The
//! only model implementation shipped is Vertex AI; tests substitute their own.

pub(crate) mod analyzer;
pub(crate) mod auth;
pub(crate) mod model;
pub mod prompt;
pub(crate) mod upload;
pub(crate) mod vertex;

#[cfg(test)]
pub(crate) mod testing;

pub use analyzer::{validate_content_type, AnalysisReport, Analyzer};
pub use auth::TokenSource;
pub use model::{
    GenerativeModel, ImagePart, ModelResponse, MultimodalRequest, UnavailableModel,
};
pub use prompt::ANALYSIS_PROMPT;
pub use upload::{BufferedUpload, ImageUpload};
pub use vertex::VertexClient;
