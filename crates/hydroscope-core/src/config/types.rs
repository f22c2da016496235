//! Configuration section types.

use serde::{Deserialize, Serialize};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// TCP port to listen on
    pub port: u16,

    /// Maximum request body size in megabytes
    pub max_upload_mb: usize,

    /// Allow cross-origin requests from any origin
    pub cors: bool,

    /// Refuse to start when the model client cannot be initialized.
    /// When false, startup continues and every analysis fails until restart.
    pub require_model_client: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_mb: 10,
            cors: true,
            require_model_client: false,
        }
    }
}

impl ServerConfig {
    /// Body limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Vertex AI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexConfig {
    /// Google Cloud project identifier
    pub project_id: String,

    /// Vertex AI region (e.g., "asia-south1", "us-central1", "global")
    pub region: String,

    /// Publisher model name
    pub model: String,

    /// Bearer token (supports ${ENV_VAR} syntax).
    /// Empty means "ask the gcloud CLI on every call".
    pub access_token: String,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,

    /// Override for the API base URL (defaults to the regional endpoint)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,

    /// Sampling temperature, model default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Output token cap, model default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            project_id: "water-sample-analyzer".to_string(),
            region: "asia-south1".to_string(),
            model: "gemini-1.5-pro".to_string(),
            access_token: "${VERTEX_ACCESS_TOKEN}".to_string(),
            timeout_secs: 120,
            api_endpoint: None,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
