//! Vertex AI client using the `generateContent` API.
//!
//! Sends the image as an inline base64 part followed by the prompt text, and
//! concatenates the text parts of the first candidate.

use super::auth::TokenSource;
use super::model::{GenerativeModel, ModelResponse, MultimodalRequest};
use crate::config::VertexConfig;
use crate::error::{AnalysisError, AnalysisResult, ConfigError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Vertex AI client, configured once at startup.
pub struct VertexClient {
    model: String,
    url: String,
    token: TokenSource,
    generation_config: Option<GenerationConfig>,
    timeout: Duration,
    client: reqwest::Client,
}

impl VertexClient {
    /// Configure the client from project, region and model settings.
    ///
    /// Makes no network calls; an invalid identifier or endpoint is the only
    /// way this fails.
    pub fn from_config(config: &VertexConfig) -> Result<Self, ConfigError> {
        check_identifier("vertex.project_id", &config.project_id)?;
        check_identifier("vertex.region", &config.region)?;
        check_model_name(&config.model)?;

        let base = match &config.api_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => default_base_url(&config.region),
        };
        let url = format!(
            "{base}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            config.project_id, config.region, config.model
        );
        reqwest::Url::parse(&url).map_err(|e| {
            ConfigError::ValidationError(format!("invalid Vertex AI endpoint {url}: {e}"))
        })?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("failed to build HTTP client: {e}")))?;

        let generation_config = (config.temperature.is_some()
            || config.max_output_tokens.is_some())
        .then(|| GenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        });

        Ok(Self {
            model: config.model.clone(),
            url,
            token: TokenSource::from_config(&config.access_token),
            generation_config,
            timeout,
            client,
        })
    }

    /// Full `generateContent` URL this client posts to.
    pub fn endpoint_url(&self) -> &str {
        &self.url
    }

    pub fn token_source(&self) -> &TokenSource {
        &self.token
    }

    fn timed_out(&self) -> AnalysisError {
        AnalysisError::model(format!(
            "request timed out after {}s",
            self.timeout.as_secs()
        ))
    }
}

fn default_base_url(region: &str) -> String {
    if region == "global" {
        "https://aiplatform.googleapis.com".to_string()
    } else {
        format!("https://{region}-aiplatform.googleapis.com")
    }
}

/// Project ids and regions are lowercase letters, digits and hyphens.
fn check_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::ValidationError(format!("{field} must not be empty")));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::ValidationError(format!(
            "{field} \"{value}\" may only contain lowercase letters, digits and hyphens"
        )));
    }
    Ok(())
}

/// Model ids are a single path segment such as `gemini-1.5-pro-002`.
fn check_model_name(value: &str) -> Result<(), ConfigError> {
    let valid = !value.is_empty()
        && !value.contains("..")
        && value.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_')
        });
    if !valid {
        return Err(ConfigError::ValidationError(format!(
            "vertex.model \"{value}\" must be a model id made of lowercase letters, digits, '-', '_' and '.'"
        )));
    }
    Ok(())
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-2xx response into a readable message, preferring Google's
/// `error.message` over the raw body.
fn describe_http_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("{status}: {}", envelope.error.message),
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{status}: {}", body.trim()),
    }
}

/// Text of the first candidate, or an error naming why there is none.
///
/// Any text part counts, whitespace included; only a candidate without text
/// parts is an error.
fn extract_text(response: GenerateContentResponse) -> AnalysisResult<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {r}"))
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(AnalysisError::model(format!(
            "Vertex AI returned no response ({reason})"
        )));
    };

    let parts: Vec<String> = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if parts.is_empty() {
        let finish = candidate
            .finish_reason
            .unwrap_or_else(|| "unknown".to_string());
        return Err(AnalysisError::model(format!(
            "Vertex AI returned no text content (finish reason: {finish})"
        )));
    }
    Ok(parts.concat())
}

#[async_trait]
impl GenerativeModel for VertexClient {
    fn name(&self) -> &str {
        "vertex-ai"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, request: &MultimodalRequest) -> AnalysisResult<ModelResponse> {
        let start = Instant::now();
        let token = self.token.token(self.timeout).await?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.mime_type.clone(),
                            data: request.image.to_base64(),
                        },
                    },
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
            generation_config: self.generation_config.clone(),
        };

        tracing::debug!(
            model = %self.model,
            mime_type = %request.image.mime_type,
            bytes = request.image.data.len(),
            "Sending generateContent request"
        );

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.timed_out()
                } else {
                    AnalysisError::model(format!("request failed: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AnalysisError::Model {
                message: describe_http_error(status, &text),
                status_code: Some(status.as_u16()),
            });
        }

        let parsed: GenerateContentResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.timed_out()
            } else {
                AnalysisError::model(format!("failed to parse Vertex AI response: {e}"))
            }
        })?;

        let tokens_used = parsed
            .usage_metadata
            .as_ref()
            .and_then(|u| u.total_token_count);
        let model = parsed
            .model_version
            .clone()
            .unwrap_or_else(|| self.model.clone());
        let text = extract_text(parsed)?;

        Ok(ModelResponse {
            text,
            model,
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::ImagePart;
    use base64::Engine;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str =
        "/v1/projects/water-sample-analyzer/locations/asia-south1/publishers/google/models/gemini-1.5-pro:generateContent";

    fn mock_config(server: &MockServer) -> VertexConfig {
        VertexConfig {
            api_endpoint: Some(server.uri()),
            access_token: "test-token".to_string(),
            ..VertexConfig::default()
        }
    }

    fn sample_request() -> MultimodalRequest {
        MultimodalRequest::analyze_sample(ImagePart::new(vec![0x89, 0x50, 0x4E, 0x47], "image/png"))
    }

    #[test]
    fn test_default_endpoint_is_regional() {
        let client = VertexClient::from_config(&VertexConfig::default()).unwrap();
        assert_eq!(
            client.endpoint_url(),
            format!("https://asia-south1-aiplatform.googleapis.com{GENERATE_PATH}")
        );
    }

    #[test]
    fn test_global_region_endpoint() {
        let config = VertexConfig {
            region: "global".to_string(),
            ..VertexConfig::default()
        };
        let client = VertexClient::from_config(&config).unwrap();
        assert!(client
            .endpoint_url()
            .starts_with("https://aiplatform.googleapis.com/v1/projects/"));
    }

    #[test]
    fn test_rejects_empty_project() {
        let config = VertexConfig {
            project_id: String::new(),
            ..VertexConfig::default()
        };
        let err = VertexClient::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("vertex.project_id"));
    }

    #[test]
    fn test_rejects_malformed_region() {
        let config = VertexConfig {
            region: "Asia South/1".to_string(),
            ..VertexConfig::default()
        };
        let err = VertexClient::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("vertex.region"));
    }

    #[test]
    fn test_model_name_is_a_single_path_segment() {
        for model in ["../../evil", "gemini/x", "gemini-1.5-pro:predict?", "", ".."] {
            let config = VertexConfig {
                model: model.to_string(),
                ..VertexConfig::default()
            };
            let err = VertexClient::from_config(&config).err().unwrap();
            assert!(err.to_string().contains("vertex.model"), "accepted {model:?}");
        }

        let config = VertexConfig {
            model: "gemini-1.5-pro-002".to_string(),
            ..VertexConfig::default()
        };
        let client = VertexClient::from_config(&config).unwrap();
        assert!(client
            .endpoint_url()
            .ends_with("/models/gemini-1.5-pro-002:generateContent"));
    }

    #[test]
    fn test_describe_http_error_prefers_google_message() {
        let body = r#"{"error":{"code":403,"message":"Permission denied on resource project","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            describe_http_error(StatusCode::FORBIDDEN, body),
            "403 Forbidden: Permission denied on resource project"
        );
        assert_eq!(
            describe_http_error(StatusCode::BAD_GATEWAY, "upstream down"),
            "502 Bad Gateway: upstream down"
        );
        assert_eq!(
            describe_http_error(StatusCode::SERVICE_UNAVAILABLE, ""),
            "503 Service Unavailable"
        );
    }

    #[tokio::test]
    async fn test_generate_sends_image_then_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [
                            { "text": "- Identification: Giardia cysts\n" },
                            { "text": "- Risk Assessment: High" }
                        ]
                    },
                    "finishReason": "STOP"
                }],
                "usageMetadata": { "totalTokenCount": 321 },
                "modelVersion": "gemini-1.5-pro-002"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = VertexClient::from_config(&mock_config(&server)).unwrap();
        let response = client.generate(&sample_request()).await.unwrap();

        assert_eq!(
            response.text,
            "- Identification: Giardia cysts\n- Risk Assessment: High"
        );
        assert_eq!(response.tokens_used, Some(321));
        assert_eq!(response.model, "gemini-1.5-pro-002");

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(
            parts[0]["inlineData"]["data"],
            base64::engine::general_purpose::STANDARD.encode([0x89, 0x50, 0x4E, 0x47])
        );
        assert_eq!(parts[1]["text"], crate::analysis::ANALYSIS_PROMPT);
        assert!(body.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn test_generation_config_only_when_set() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
            })))
            .mount(&server)
            .await;

        let config = VertexConfig {
            max_output_tokens: Some(512),
            ..mock_config(&server)
        };
        let client = VertexClient::from_config(&config).unwrap();
        client.generate(&sample_request()).await.unwrap();

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 512);
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_http_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "code": 429,
                    "message": "Quota exceeded for aiplatform.googleapis.com",
                    "status": "RESOURCE_EXHAUSTED"
                }
            })))
            .mount(&server)
            .await;

        let client = VertexClient::from_config(&mock_config(&server)).unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();

        match err {
            AnalysisError::Model {
                message,
                status_code,
            } => {
                assert_eq!(status_code, Some(429));
                assert!(message.contains("Quota exceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let client = VertexClient::from_config(&mock_config(&server)).unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("prompt blocked: SAFETY"));
    }

    #[tokio::test]
    async fn test_candidate_without_text_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "finishReason": "RECITATION" }]
            })))
            .mount(&server)
            .await;

        let client = VertexClient::from_config(&mock_config(&server)).unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("finish reason: RECITATION"));
    }

    #[tokio::test]
    async fn test_candidate_with_empty_parts_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [] }, "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let client = VertexClient::from_config(&mock_config(&server)).unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("finish reason: SAFETY"));
    }

    #[tokio::test]
    async fn test_whitespace_text_is_returned_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "\n" }] },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let client = VertexClient::from_config(&mock_config(&server)).unwrap();
        let response = client.generate(&sample_request()).await.unwrap();
        assert_eq!(response.text, "\n");
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = VertexClient::from_config(&mock_config(&server)).unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("failed to parse Vertex AI response"));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "candidates": [] }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = VertexConfig {
            timeout_secs: 1,
            ..mock_config(&server)
        };
        let client = VertexClient::from_config(&config).unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("timed out after 1s"));
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Headers arrive at once, the body never completes.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64 * 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"candidates\"",
                )
                .await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let config = VertexConfig {
            api_endpoint: Some(format!("http://{addr}")),
            access_token: "test-token".to_string(),
            timeout_secs: 1,
            ..VertexConfig::default()
        };
        let client = VertexClient::from_config(&config).unwrap();
        let err = client.generate(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("timed out after 1s"), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_gcloud_token_is_bounded_by_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
            })))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = VertexConfig {
            access_token: String::new(),
            timeout_secs: 1,
            ..mock_config(&server)
        };
        let mut client = VertexClient::from_config(&config).unwrap();
        assert_eq!(client.token_source(), &TokenSource::gcloud());
        client.token = TokenSource::GcloudCli(crate::analysis::testing::fake_gcloud(
            dir.path(),
            "sleep 6; echo ya29.late",
        ));

        let start = Instant::now();
        let err = client.generate(&sample_request()).await.unwrap_err();

        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(err.to_string().contains("request timed out after 1s"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_gcloud_token_is_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer ya29.from-gcloud"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut client = VertexClient::from_config(&mock_config(&server)).unwrap();
        client.token = TokenSource::GcloudCli(crate::analysis::testing::fake_gcloud(
            dir.path(),
            "echo ya29.from-gcloud",
        ));

        assert_eq!(client.generate(&sample_request()).await.unwrap().text, "ok");
    }
}
