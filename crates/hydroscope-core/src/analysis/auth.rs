//! Access tokens for Vertex AI calls.

use crate::error::{AnalysisError, AnalysisResult};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

const GCLOUD_PROGRAM: &str = "gcloud";

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Where bearer tokens come from.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A fixed token from config or the environment.
    Static(String),
    /// `<program> auth print-access-token`, run on every call.
    GcloudCli(PathBuf),
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static(<redacted>)"),
            Self::GcloudCli(program) => write!(f, "GcloudCli({})", program.display()),
        }
    }
}

impl TokenSource {
    /// The `gcloud` found on `PATH`.
    pub fn gcloud() -> Self {
        Self::GcloudCli(PathBuf::from(GCLOUD_PROGRAM))
    }

    /// Pick a token source from the `vertex.access_token` setting.
    ///
    /// An empty value, or an `${ENV_VAR}` reference to an unset variable,
    /// falls back to the locally authenticated gcloud account.
    pub fn from_config(value: &str) -> Self {
        let value = value.trim();
        match resolve_env_var(value) {
            Some(token) => Self::Static(token),
            None => {
                if !value.is_empty() {
                    tracing::debug!("{value} is not set, using gcloud for access tokens");
                }
                Self::gcloud()
            }
        }
    }

    /// Produce a bearer token for one call.
    ///
    /// The gcloud subprocess is killed once `timeout` elapses.
    pub async fn token(&self, timeout: Duration) -> AnalysisResult<String> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::GcloudCli(program) => {
                let mut command = Command::new(program);
                command.args(["auth", "print-access-token"]).kill_on_drop(true);
                let output = tokio::time::timeout(timeout, command.output())
                    .await
                    .map_err(|_| {
                        AnalysisError::model(format!(
                            "request timed out after {}s",
                            timeout.as_secs()
                        ))
                    })?
                    .map_err(|e| {
                        AnalysisError::model(format!("failed to run gcloud for an access token: {e}"))
                    })?;

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(AnalysisError::model(format!(
                        "gcloud auth print-access-token failed ({}): {}",
                        output.status,
                        stderr.trim()
                    )));
                }

                let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if token.is_empty() {
                    return Err(AnalysisError::model(
                        "gcloud returned an empty access token",
                    ));
                }
                Ok(token)
            }
        }
    }
}
