//! Startup initialization of the model client.

use crate::analysis::{GenerativeModel, UnavailableModel, VertexClient};
use crate::config::Config;
use crate::error::ConfigError;
use std::sync::Arc;

/// Build the Vertex AI client from config.
///
/// When `server.require_model_client` is false, an initialization failure is
/// logged and replaced by an [`UnavailableModel`], so the server still starts
/// and each analysis reports the failure. Otherwise the error is returned.
pub fn init_model_client(config: &Config) -> Result<Arc<dyn GenerativeModel>, ConfigError> {
    match VertexClient::from_config(&config.vertex) {
        Ok(client) => {
            tracing::info!(
                project = %config.vertex.project_id,
                region = %config.vertex.region,
                model = %config.vertex.model,
                token_source = ?client.token_source(),
                "Vertex AI client initialized"
            );
            Ok(Arc::new(client))
        }
        Err(e) if config.server.require_model_client => Err(e),
        Err(e) => {
            tracing::error!("Error initializing Vertex AI client: {e}");
            tracing::warn!("Continuing without a model client; analysis requests will fail");
            Ok(Arc::new(UnavailableModel::new("vertex-ai", e.to_string())))
        }
    }
}
