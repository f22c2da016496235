//! Test doubles for the model seam and the gcloud token command.

use super::model::{GenerativeModel, ModelResponse, MultimodalRequest};
use crate::error::{AnalysisError, AnalysisResult};
use async_trait::async_trait;
use std::sync::Mutex;

/// Records every request and answers with a canned result.
pub(crate) struct RecordingModel {
    reply: AnalysisResult<String>,
    calls: Mutex<Vec<MultimodalRequest>>,
}

impl RecordingModel {
    pub(crate) fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            reply: Err(AnalysisError::model(message)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<MultimodalRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for RecordingModel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, request: &MultimodalRequest) -> AnalysisResult<ModelResponse> {
        self.calls.lock().unwrap().push(request.clone());
        self.reply.clone().map(|text| ModelResponse {
            text,
            model: "recording".to_string(),
            tokens_used: None,
            latency_ms: 0,
        })
    }
}

/// Fails the test if the analysis ever reaches the model.
pub(crate) struct UnreachableModel;

#[async_trait]
impl GenerativeModel for UnreachableModel {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, request: &MultimodalRequest) -> AnalysisResult<ModelResponse> {
        panic!(
            "model must not be called (got {} bytes of {})",
            request.image.data.len(),
            request.image.mime_type
        );
    }
}

/// Write an executable shell script standing in for `gcloud`.
#[cfg(unix)]
pub(crate) fn fake_gcloud(dir: &std::path::Path, script: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("gcloud");
    std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
