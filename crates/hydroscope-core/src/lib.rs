//! Hydroscope Core - water sample image analysis over HTTP.
//!
//! Hydroscope accepts a microscope image of a water sample, sends it to a
//! hosted multimodal model together with a fixed laboratory-assistant prompt,
//! and returns the model's text report.
//!
//! # Architecture
//!
//! There is no pipeline and no storage; each request is independent:
//!
//! ```text
//! multipart upload → content-type check → read bytes → Vertex AI → {"report": ...}
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use hydroscope_core::{init_model_client, server, Analyzer, Config};
//!
//! #[tokio::main]
//! async fn main() -> hydroscope_core::Result<()> {
//!     let config = Config::load_or_default(&Config::default_path())?;
//!     let model = init_model_client(&config)?;
//!     let state = server::AppState::new(Analyzer::new(model));
//!     server::serve(&config.server, state).await
//! }
//! ```

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod init;
pub mod server;

// Re-exports for convenient access
pub use analysis::{AnalysisReport, Analyzer, GenerativeModel, ImageUpload};
pub use config::Config;
pub use error::{AnalysisError, AnalysisResult, ConfigError, ErrorKind, HydroscopeError, Result};
pub use init::init_model_client;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
