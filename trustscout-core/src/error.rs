//! Error types for the TrustScout core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering text generation, configuration, and pipeline input.

use std::path::PathBuf;

/// Top-level error type for the TrustScout core library.
#[derive(Debug, thiserror::Error)]
pub enum TrustScoutError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the external text-generation capability.
///
/// The literature stage absorbs every variant; none of them cross a stage
/// boundary.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// Errors raised at the pipeline entry point.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("biological_focus must not be empty")]
    InvalidFocus,
}

/// A type alias for results using the top-level `TrustScoutError`.
pub type Result<T> = std::result::Result<T, TrustScoutError>;
